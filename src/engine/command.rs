//! Encoder invocation for merge jobs
//!
//! Every clip becomes its own input with trim bounds applied as input options,
//! then one concat filter joins the decoded video and audio streams in order.

use std::path::Path;

use super::EncoderSettings;
use crate::domain::model::{ClipRequest, OutputFormat};

/// Seconds formatted for `-ss` / `-to`
fn position_arg(seconds: f64) -> String {
    format!("{:.3}", seconds.max(0.0))
}

/// `[0:v][0:a][1:v][1:a]...concat=n=N:v=1:a=1[outv][outa]`
pub fn concat_filter(clip_count: usize) -> String {
    let mut filter = String::new();
    for index in 0..clip_count {
        filter.push_str(&format!("[{index}:v][{index}:a]"));
    }
    filter.push_str(&format!("concat=n={clip_count}:v=1:a=1[outv][outa]"));
    filter
}

/// Input options for one clip: trim bounds precede `-i` so they seek the input
fn input_args(clip: &ClipRequest) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(start) = clip.trim_start {
        args.push("-ss".to_string());
        args.push(position_arg(start));
    }
    if let Some(end) = clip.trim_end {
        args.push("-to".to_string());
        args.push(position_arg(end));
    }
    args.push("-i".to_string());
    args.push(clip.source_path.to_string_lossy().into_owned());
    args
}

/// Full argument list for concatenating `clips` into `output`
pub fn merge_args(
    clips: &[ClipRequest],
    format: OutputFormat,
    settings: &EncoderSettings,
    output: &Path,
) -> Vec<String> {
    let (video_codec, audio_codec) = settings.codecs_for(format);

    let mut args = vec!["-hide_banner".to_string()];
    for clip in clips {
        args.extend(input_args(clip));
    }

    args.extend([
        "-filter_complex".to_string(),
        concat_filter(clips.len()),
        "-map".to_string(),
        "[outv]".to_string(),
        "-map".to_string(),
        "[outa]".to_string(),
        "-c:v".to_string(),
        video_codec.clone(),
    ]);

    // Preset and CRF are x264/x265 vocabulary; vp9 takes neither in this form
    if video_codec.starts_with("libx26") {
        args.extend([
            "-preset".to_string(),
            settings.preset.clone(),
            "-crf".to_string(),
            settings.crf.to_string(),
        ]);
    }

    args.extend([
        "-c:a".to_string(),
        audio_codec,
        "-b:a".to_string(),
        settings.audio_bitrate.clone(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}
