use tracing::debug;

use crate::error::{Result, VideoError};
use crate::imaging::ProcessedImage;
use crate::scratch::Scratch;
use crate::video::encoder::FfmpegEncoder;
use crate::video::types::{VideoClip, VideoParams};

/// Holds one processed still on screen for a whole number of seconds
pub struct ClipSynthesizer {
    params: VideoParams,
}

impl ClipSynthesizer {
    pub fn new(params: VideoParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    /// Number of frames a clip of `duration_secs` seconds holds
    pub fn frame_count(&self, duration_secs: u32) -> u64 {
        (self.params.fps as f64 * duration_secs as f64).round() as u64
    }

    /// Encode `image` as a clip of `duration_secs` seconds.
    ///
    /// The intermediate MP4 lives in `scratch` under a generated name and is
    /// gone by the time this returns, whether encoding succeeded or not.
    pub fn synthesize(
        &self,
        image: &ProcessedImage,
        duration_secs: u32,
        scratch: &Scratch,
    ) -> Result<VideoClip> {
        if duration_secs == 0 {
            return Err(VideoError::InvalidParameters {
                details: format!("clip duration for '{}' must be positive", image.source_name()),
            }.into());
        }

        let frame_count = self.frame_count(duration_secs);
        let file = scratch.artifact("mp4");

        debug!(
            "Synthesizing {}s clip for '{}' ({} frames at {} fps)",
            duration_secs, image.source_name(), frame_count, self.params.fps
        );

        let mut encoder = FfmpegEncoder::new(image.width(), image.height(), &self.params, file.path())?;
        let resolution = encoder.encoded_dimensions();
        encoder.encode_still(image.as_image(), frame_count)?;
        encoder.finish()?;

        let bytes = file.take_bytes()?;

        Ok(VideoClip {
            source_name: image.source_name().to_string(),
            duration_secs,
            fps: self.params.fps,
            frame_count,
            resolution,
            bytes,
        })
    }
}
