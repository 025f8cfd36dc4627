//! Encoder output stream handling
//!
//! `lines` turns raw diagnostic bytes into lines; `parser` pulls facts out of them.

pub mod lines;
pub mod parser;

pub use lines::{read_all_text, DiagnosticLines, DiagnosticTail};
pub use parser::{
    parse_codec, parse_current_time, parse_duration, parse_frame_counter, parse_frame_rate,
    parse_resolution, parse_speed_multiplier, reports_missing_audio,
};
