//! Single-frame thumbnails

use std::path::Path;

use tracing::info;

use super::{data_uri, discard_scratch, seconds_arg, PreviewGenerator};
use crate::domain::errors::DomainError;

/// Thumbnail size in pixels
pub const THUMBNAIL_WIDTH: u32 = 160;
pub const THUMBNAIL_HEIGHT: u32 = 90;

const THUMBNAIL_FILE: &str = "thumbnail.jpg";

impl PreviewGenerator {
    /// Arguments decoding exactly one frame at `at_seconds`, scaled down
    pub fn thumbnail_args(source: &Path, at_seconds: f64, target: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-ss".to_string(),
            seconds_arg(at_seconds),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT),
            "-q:v".to_string(),
            "3".to_string(),
            "-y".to_string(),
            target.to_string_lossy().into_owned(),
        ]
    }

    /// One frame at `at_seconds` as a JPEG data URI
    pub async fn thumbnail(&self, source: &Path, at_seconds: f64) -> Result<String, DomainError> {
        let scratch = self.scratch_dir("thumb_").await?;
        let target = scratch.path().join(THUMBNAIL_FILE);

        self.run_to_exit(
            "thumbnail",
            &Self::thumbnail_args(source, at_seconds, &target),
            None,
        )
        .await?;

        let read = tokio::fs::read(&target).await;
        discard_scratch(scratch, "thumbnail");

        let bytes = read.map_err(|e| DomainError::PreviewUnavailable {
            operation: "thumbnail",
            reason: format!("no frame written: {}", e),
        })?;
        if bytes.is_empty() {
            return Err(DomainError::PreviewUnavailable {
                operation: "thumbnail",
                reason: "encoder wrote an empty frame".to_string(),
            });
        }

        info!(source = %source.display(), at = at_seconds, bytes = bytes.len(), "Thumbnail generated");
        Ok(data_uri(&bytes, "image/jpeg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_args_seek_before_input() {
        let args = PreviewGenerator::thumbnail_args(
            Path::new("in.mp4"),
            2.5,
            Path::new("/scratch/thumbnail.jpg"),
        );
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "2.500");
        assert!(args.contains(&"scale=160:90".to_string()));
        assert_eq!(args.last().unwrap(), "/scratch/thumbnail.jpg");
    }
}
