use serde::{Deserialize, Serialize};

/// Video encoding parameters shared by clip synthesis and concatenation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Output frame rate
    pub fps: u32,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,

    /// Bitrate of the attached AAC track, in kbit/s
    pub audio_bitrate_kbps: u32,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 30,
            quality: 85,
            audio_bitrate_kbps: 192,
        }
    }
}

impl VideoParams {
    /// Map the 0-100 quality scale onto x264's CRF (0 best, 51 worst)
    pub fn crf(&self) -> u8 {
        (51 - ((self.quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }
}

/// A still image held for a whole number of seconds, encoded as MP4
#[derive(Debug, Clone)]
pub struct VideoClip {
    /// Name of the upload the still was made from
    pub source_name: String,

    /// Length in whole seconds
    pub duration_secs: u32,

    /// Frame rate the clip was encoded at
    pub fps: u32,

    /// Number of encoded frames, always `fps * duration_secs`
    pub frame_count: u64,

    /// Encoded frame size (width, height), padded to even values
    pub resolution: (u32, u32),

    /// Encoded MP4 bytes
    pub bytes: Vec<u8>,
}

impl VideoClip {
    /// File name offered for download
    pub fn download_name(&self) -> String {
        format!("processed_{}.mp4", self.source_name)
    }

    /// Duration recomputed from the frame count
    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.fps as f64
    }
}

/// All clips joined in order, with the optional background track attached
#[derive(Debug, Clone)]
pub struct CombinedVideo {
    /// Encoded MP4 bytes
    pub bytes: Vec<u8>,

    /// Output frame rate
    pub fps: u32,

    /// Number of video frames in the output
    pub frame_count: u64,

    /// Canvas size (width, height) every clip was composed onto
    pub resolution: (u32, u32),

    /// Number of clips joined
    pub clip_count: usize,

    /// Whether a background audio stream is attached
    pub has_audio: bool,
}

impl CombinedVideo {
    /// File name offered for download
    pub const DOWNLOAD_NAME: &'static str = "combined_video.mp4";

    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.fps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_to_crf() {
        let mut params = VideoParams::default();
        params.quality = 100;
        assert_eq!(params.crf(), 0);
        params.quality = 0;
        assert_eq!(params.crf(), 51);
        params.quality = 85;
        assert_eq!(params.crf(), 8);
    }

    #[test]
    fn test_clip_duration_from_frames() {
        let clip = VideoClip {
            source_name: "a.png".to_string(),
            duration_secs: 3,
            fps: 30,
            frame_count: 90,
            resolution: (564, 1000),
            bytes: Vec::new(),
        };
        assert_eq!(clip.duration(), 3.0);
        assert_eq!(clip.download_name(), "processed_a.png.mp4");
    }
}
