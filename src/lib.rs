//! # Square-Motion
//!
//! Turn a batch of still images into uniformly framed clips and one combined
//! video, optionally scored with a background track.
//!
//! Each image is placed centered over a blurred, enlarged copy of itself,
//! cropped to the configured aspect ratio, held on screen for a few seconds,
//! and the resulting clips are joined in upload order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use square_motion::{
//!     composition::{AudioChoice, CompositionEngine},
//!     config::Config,
//!     export::write_artifacts,
//!     imaging::SourceImage,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = CompositionEngine::new(Config::default())?;
//! let audio = engine.load_audio(&AudioChoice::Library("calm".to_string()))?;
//!
//! let images = vec![SourceImage::open("beach.jpg")?, SourceImage::open("city.png")?];
//! let output = engine.compose(&images, audio.as_ref())?;
//!
//! write_artifacts(&output, "out/")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`imaging`] - Still transform (blur backdrop, center paste, aspect crop)
//! - [`video`] - Clip synthesis and concatenation through ffmpeg
//! - [`audio`] - Background track loading and fitting
//! - [`composition`] - Main composition engine
//! - [`export`] - ZIP bundle and artifact writing
//! - [`config`] - Configuration management

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod export;
pub mod imaging;
pub mod scratch;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{AudioChoice, CompositionEngine, CompositionOutput},
    config::Config,
    error::{MotionError, Result},
    imaging::{ImageTransformer, ProcessedImage, SourceImage},
    video::{ClipSynthesizer, CombinedVideo, VideoClip, VideoConcatenator},
};
