//! Extractors for facts embedded in encoder diagnostic text
//!
//! Every function is total: a missing or malformed marker yields `None`,
//! never zero and never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid duration regex")
});

static VIDEO_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Stream\s+#.*?Video:\s*(.*)").expect("valid video stream regex"));

static RESOLUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3,5})x(\d{3,5})\b").expect("valid resolution regex"));

static CODEC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Video:\s*([A-Za-z0-9_\-]+)").expect("valid codec regex"));

static FPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*fps\b").expect("valid fps regex"));

static CURRENT_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=\s*(-)?(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid time regex")
});

static SPEED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x").expect("valid speed regex"));

static FRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"frame=\s*(\d+)").expect("valid frame regex"));

static MISSING_AUDIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(matches no streams|does not contain any stream|no audio stream)")
        .expect("valid missing-audio regex")
});

fn timestamp_seconds(hours: &str, minutes: &str, seconds: &str) -> Option<f64> {
    let h: f64 = hours.parse().ok()?;
    let m: f64 = minutes.parse().ok()?;
    let s: f64 = seconds.parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s)
}

/// Total duration from a `Duration: HH:MM:SS.ff` marker
pub fn parse_duration(text: &str) -> Option<f64> {
    let caps = DURATION_RE.captures(text)?;
    timestamp_seconds(&caps[1], &caps[2], &caps[3])
}

/// Body of the first video stream description
fn video_stream_details(text: &str) -> Option<&str> {
    VIDEO_LINE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `(width, height)` from the first video stream; each side 3-5 digits
pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let details = video_stream_details(text)?;
    let caps = RESOLUTION_RE.captures(details)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Frame rate from the number preceding `fps`
pub fn parse_frame_rate(text: &str) -> Option<f64> {
    let scope = video_stream_details(text).unwrap_or(text);
    let caps = FPS_RE.captures(scope)?;
    caps[1].parse().ok()
}

/// Codec token following the video stream marker
pub fn parse_codec(text: &str) -> Option<String> {
    let caps = CODEC_RE.captures(text)?;
    Some(caps[1].to_string())
}

/// Current encode position from a `time=HH:MM:SS.ff` marker
pub fn parse_current_time(text: &str) -> Option<f64> {
    let caps = CURRENT_TIME_RE.captures(text)?;
    let seconds = timestamp_seconds(&caps[2], &caps[3], &caps[4])?;
    // Early status lines can report a small negative position
    if caps.get(1).is_some() {
        return Some(0.0);
    }
    Some(seconds)
}

/// Speed multiplier from a `speed=1.5x` marker
pub fn parse_speed_multiplier(text: &str) -> Option<f64> {
    let caps = SPEED_RE.captures(text)?;
    caps[1].parse().ok()
}

/// Frames written so far from a `frame=N` marker
pub fn parse_frame_counter(text: &str) -> Option<u64> {
    let caps = FRAME_RE.captures(text)?;
    caps[1].parse().ok()
}

/// Whether the encoder complained that the input has no audio to map
pub fn reports_missing_audio(text: &str) -> bool {
    MISSING_AUDIO_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_OUTPUT: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:30.50, start: 0.000000, bitrate: 1205 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 1071 kb/s, 29.97 fps, 29.97 tbr, 30k tbn (default)
  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s (default)
At least one output file must be specified";

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(PROBE_OUTPUT), Some(90.5));
        assert_eq!(parse_duration("Duration: 01:00:00.00,"), Some(3600.0));
        assert_eq!(parse_duration("Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution(PROBE_OUTPUT), Some((1920, 1080)));
        assert_eq!(
            parse_resolution("Stream #0:0: Video: vp9, yuv420p, 640x360, 30 fps"),
            Some((640, 360))
        );
    }

    #[test]
    fn test_parse_resolution_ignores_unrelated_numbers() {
        // Hex tags and audio lines must not be mistaken for a resolution
        assert_eq!(parse_resolution("Stream #0:1: Audio: aac (mp4a / 0x6134706D), 48000 Hz"), None);
        assert_eq!(parse_resolution("Stream #0:0: Video: h264, 12x34567890"), None);
        assert_eq!(parse_resolution("no streams here 1920x1080"), None);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(PROBE_OUTPUT), Some(29.97));
        assert_eq!(parse_frame_rate("Stream #0:0: Video: h264, 1280x720, 25 fps, 25 tbr"), Some(25.0));
        assert_eq!(parse_frame_rate("Stream #0:0: Video: h264, 1280x720"), None);
    }

    #[test]
    fn test_parse_codec() {
        assert_eq!(parse_codec(PROBE_OUTPUT).as_deref(), Some("h264"));
        assert_eq!(parse_codec("Stream #0:0: Video: prores_ks (HQ)").as_deref(), Some("prores_ks"));
        assert_eq!(parse_codec("Stream #0:0: Audio: mp3"), None);
    }

    #[test]
    fn test_parse_current_time() {
        let line = "frame=  240 fps=120 q=28.0 size=    512kB time=00:00:08.01 bitrate= 523.6kbits/s speed=4.02x";
        assert_eq!(parse_current_time(line), Some(8.01));
        assert_eq!(parse_current_time("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(parse_current_time("time=-00:00:00.05"), Some(0.0));
    }

    #[test]
    fn test_parse_speed_multiplier() {
        assert_eq!(parse_speed_multiplier("time=00:00:01.00 speed=4.02x"), Some(4.02));
        assert_eq!(parse_speed_multiplier("speed= 1x"), Some(1.0));
        assert_eq!(parse_speed_multiplier("speed=N/A"), None);
    }

    #[test]
    fn test_parse_frame_counter() {
        assert_eq!(parse_frame_counter("frame=    7 fps=0.0 q=-0.0 size=N/A"), Some(7));
        assert_eq!(parse_frame_counter("frame=123"), Some(123));
        assert_eq!(parse_frame_counter("no counter"), None);
    }

    #[test]
    fn test_reports_missing_audio() {
        assert!(reports_missing_audio("Stream map '0:a:0' matches no streams."));
        assert!(reports_missing_audio("Output file #0 does not contain any stream"));
        assert!(!reports_missing_audio("Conversion failed!"));
    }
}
