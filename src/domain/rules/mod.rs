// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Fewest frames a filmstrip ever contains
pub const FILMSTRIP_MIN_FRAMES: u32 = 5;
/// Most frames a filmstrip ever contains
pub const FILMSTRIP_MAX_FRAMES: u32 = 20;

/// Rules for merge inputs and the progress denominator
pub struct MergeRules;

impl MergeRules {
    /// Reject trim bounds that cannot describe a segment
    pub fn validate_trim(clip: &ClipRequest) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidTrim {
            path: clip.source_path.clone(),
            reason,
        };

        for (label, value) in [("trim start", clip.trim_start), ("trim end", clip.trim_end)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(invalid(format!("{} must be a non-negative number, got {}", label, v)));
                }
            }
        }

        if let (Some(start), Some(end)) = (clip.trim_start, clip.trim_end) {
            if end <= start {
                return Err(invalid(format!(
                    "trim end ({}) must be greater than trim start ({})",
                    end, start
                )));
            }
        }

        Ok(())
    }

    /// Seconds of output one clip contributes: `(trim_end ?? full) - (trim_start ?? 0)`,
    /// with both bounds held inside the source duration when it is known
    pub fn segment_duration(clip: &ClipRequest, full_duration: f64) -> f64 {
        let full = full_duration.max(0.0);
        let known = full > 0.0;

        let start = clip.trim_start.unwrap_or(0.0).max(0.0);
        let end = clip.trim_end.unwrap_or(full);

        let (start, end) = if known {
            (start.min(full), end.min(full))
        } else {
            (start, end)
        };

        (end - start).max(0.0)
    }

    /// Sum of segment durations; clips and descriptors are paired by position
    pub fn total_duration(clips: &[ClipRequest], descriptors: &[MediaDescriptor]) -> f64 {
        clips
            .iter()
            .zip(descriptors)
            .map(|(clip, descriptor)| Self::segment_duration(clip, descriptor.duration_seconds))
            .sum()
    }

    /// `min(current / total * 100, 100)`; zero when the total is unknown
    pub fn progress_percent(current_seconds: f64, total_seconds: f64) -> f64 {
        if total_seconds <= 0.0 || !current_seconds.is_finite() {
            return 0.0;
        }
        (current_seconds / total_seconds * 100.0).clamp(0.0, 100.0)
    }
}

/// Rules for preview asset sizing
pub struct PreviewRules;

impl PreviewRules {
    /// Frames a filmstrip will hold: `clamp(min(requested, floor(duration)), 5, 20)`
    pub fn filmstrip_frame_count(requested: u32, duration_seconds: f64) -> u32 {
        let whole_seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds.floor().min(u32::MAX as f64) as u32
        } else {
            0
        };
        requested
            .min(whole_seconds)
            .clamp(FILMSTRIP_MIN_FRAMES, FILMSTRIP_MAX_FRAMES)
    }

    /// Uniform sampling rate spreading `frame_count` frames over the clip
    pub fn filmstrip_sample_rate(frame_count: u32, duration_seconds: f64) -> f64 {
        frame_count as f64 / duration_seconds.max(1.0)
    }

    /// Thumbnail position: 10% into the clip, held to [0.5s, 5s] and inside the clip
    pub fn thumbnail_offset(duration_seconds: f64) -> f64 {
        if duration_seconds <= 0.0 {
            return 0.0;
        }
        (duration_seconds * 0.1).clamp(0.5, 5.0).min(duration_seconds)
    }
}
