use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::VideoParams,
};

/// Accepted range for the backdrop canvas edge, in pixels
pub const TARGET_SIZE_RANGE: RangeInclusive<u32> = 100..=3000;

/// Accepted range for the backdrop blur radius
pub const BLUR_RADIUS_RANGE: RangeInclusive<u32> = 0..=50;

/// Accepted range for either side of the aspect ratio
pub const ASPECT_RATIO_RANGE: RangeInclusive<u32> = 1..=20;

/// Accepted range for per-image clip durations, in seconds
pub const CLIP_DURATION_RANGE: RangeInclusive<u32> = 1..=7;

/// Main configuration for SquareMotion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Still image transform settings
    pub image: ImageConfig,

    /// Clip and encoder settings
    pub video: VideoConfig,

    /// Background audio settings
    pub audio: AudioConfig,

    /// Run-level settings
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.image.validate()?;
        self.video.validate()?;
        Ok(())
    }
}

fn check_range(key: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string()
        }.into());
    }
    Ok(())
}

/// Still image transform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Edge of the square backdrop canvas in pixels
    pub target_size: u32,

    /// Gaussian blur radius applied to the backdrop
    pub blur_radius: u32,

    /// Output aspect ratio, horizontal part
    pub aspect_ratio_w: u32,

    /// Output aspect ratio, vertical part
    pub aspect_ratio_h: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            target_size: 2000,
            blur_radius: 10,
            aspect_ratio_w: 9,
            aspect_ratio_h: 16,
        }
    }
}

impl ImageConfig {
    /// Canvas dimensions handed to the transformer
    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.target_size, self.target_size)
    }

    fn validate(&self) -> Result<()> {
        check_range("image.target_size", self.target_size, &TARGET_SIZE_RANGE)?;
        check_range("image.blur_radius", self.blur_radius, &BLUR_RADIUS_RANGE)?;
        check_range("image.aspect_ratio_w", self.aspect_ratio_w, &ASPECT_RATIO_RANGE)?;
        check_range("image.aspect_ratio_h", self.aspect_ratio_h, &ASPECT_RATIO_RANGE)?;
        Ok(())
    }
}

/// Clip synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Encoder parameters
    pub params: VideoParams,

    /// Shortest clip duration in seconds
    pub min_duration: u32,

    /// Longest clip duration in seconds
    pub max_duration: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            params: VideoParams::default(),
            min_duration: 1,
            max_duration: 3,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        check_range("video.min_duration", self.min_duration, &CLIP_DURATION_RANGE)?;
        check_range("video.max_duration", self.max_duration, &CLIP_DURATION_RANGE)?;

        if self.max_duration < self.min_duration {
            return Err(ConfigError::InvalidValue {
                key: "video.duration_range".to_string(),
                value: format!("{}-{}", self.min_duration, self.max_duration)
            }.into());
        }

        if self.params.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.fps".to_string(),
                value: self.params.fps.to_string()
            }.into());
        }

        if self.params.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.quality".to_string(),
                value: self.params.quality.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Background audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory holding the bundled audio library
    pub library_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            library_dir: PathBuf::from("audio_library"),
        }
    }
}

/// Run-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Parent directory for per-run scratch directories (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,

    /// Seed for clip duration sampling; entropy-seeded if unset
    pub seed: Option<u64>,
}
