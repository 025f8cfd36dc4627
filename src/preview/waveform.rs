//! Peak-amplitude waveform envelopes
//!
//! The first audio stream is decoded to mono 16-bit little-endian PCM at a
//! fixed rate and streamed over stdout. Each window of samples becomes one
//! normalized peak in `[0, 1]`.

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::{failure_reason, PreviewGenerator};
use crate::domain::errors::DomainError;
use crate::streams::{self, read_all_text, DiagnosticTail};

/// Decode rate for envelope extraction
pub const SAMPLE_RATE_HZ: u32 = 8000;
/// Samples folded into one envelope value (100 values per second)
pub const WINDOW_SAMPLES: usize = 80;

const FULL_SCALE: f32 = 32768.0;

/// Normalized peak per window of signed 16-bit little-endian samples.
///
/// A trailing partial window still yields a value; a dangling odd byte is ignored.
pub fn peak_envelope(bytes: &[u8]) -> Vec<f32> {
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    samples
        .chunks(WINDOW_SAMPLES)
        .map(|window| {
            let peak = window
                .iter()
                .map(|s| i32::from(*s).unsigned_abs())
                .max()
                .unwrap_or(0);
            (peak as f32 / FULL_SCALE).min(1.0)
        })
        .collect()
}

impl PreviewGenerator {
    pub fn waveform_args(source: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-map".to_string(),
            "0:a:0".to_string(),
            "-vn".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            SAMPLE_RATE_HZ.to_string(),
            "-f".to_string(),
            "s16le".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "pipe:1".to_string(),
        ]
    }

    /// Envelope of the first audio stream; empty when the file has no audio
    pub async fn waveform(&self, source: &Path) -> Result<Vec<f32>, DomainError> {
        let mut handle = self
            .process
            .spawn(&self.settings.ffmpeg_path, &Self::waveform_args(source))
            .await?;

        let stdout = handle.take_stdout();
        let stderr = handle.take_stderr();

        // Both pipes are drained together so neither can fill and stall the child
        let (pcm, diagnostics) = tokio::join!(
            async move {
                let mut bytes = Vec::new();
                if let Some(mut out) = stdout {
                    out.read_to_end(&mut bytes).await?;
                }
                Ok::<_, std::io::Error>(bytes)
            },
            async move {
                match stderr {
                    Some(err) => read_all_text(err).await,
                    None => Ok(String::new()),
                }
            }
        );
        let exit = handle.wait().await?;

        let pcm = pcm.map_err(|e| DomainError::io("Failed to read decoded audio", e))?;
        let diagnostics = diagnostics.unwrap_or_else(|e| {
            warn!(error = %e, "Stopped reading encoder diagnostics");
            String::new()
        });
        debug!(code = ?exit.code, bytes = pcm.len(), "Waveform decode finished");

        if !exit.success() {
            if streams::reports_missing_audio(&diagnostics) {
                info!(source = %source.display(), "No audio stream, empty waveform");
                return Ok(Vec::new());
            }
            if pcm.is_empty() {
                let mut tail = DiagnosticTail::default();
                for line in diagnostics.lines() {
                    tail.push(line);
                }
                return Err(DomainError::PreviewUnavailable {
                    operation: "waveform",
                    reason: failure_reason(&exit, &tail),
                });
            }
            warn!(
                source = %source.display(),
                code = ?exit.code,
                bytes = pcm.len(),
                "Audio decode exited abnormally, using partial samples"
            );
        }

        let envelope = peak_envelope(&pcm);
        info!(source = %source.display(), values = envelope.len(), "Waveform generated");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_peak_envelope_windows() {
        let mut samples = vec![0i16; WINDOW_SAMPLES * 2 + 10];
        samples[5] = 16384;
        samples[WINDOW_SAMPLES + 3] = -32768;
        samples[WINDOW_SAMPLES * 2 + 1] = 100;

        let envelope = peak_envelope(&pcm(&samples));
        assert_eq!(envelope.len(), 3);
        assert_eq!(envelope[0], 0.5);
        assert_eq!(envelope[1], 1.0);
        assert!(envelope[2] > 0.0 && envelope[2] < 0.01);
    }

    #[test]
    fn test_peak_envelope_one_second_is_100_values() {
        let bytes = pcm(&vec![1000i16; SAMPLE_RATE_HZ as usize]);
        let envelope = peak_envelope(&bytes);
        assert_eq!(envelope.len(), 100);
        assert!(envelope.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_peak_envelope_empty_and_odd_byte() {
        assert!(peak_envelope(&[]).is_empty());
        assert!(peak_envelope(&[0x7f]).is_empty());
    }

    #[test]
    fn test_waveform_args_pipe_mono_pcm() {
        let args = PreviewGenerator::waveform_args(Path::new("in.mp4"));
        assert!(args.windows(2).any(|w| w == ["-ar", "8000"]));
        assert!(args.windows(2).any(|w| w == ["-f", "s16le"]));
        assert_eq!(args.last().unwrap(), "pipe:1");
    }
}
