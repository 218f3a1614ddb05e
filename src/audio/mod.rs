//! # Background Audio Module
//!
//! Loads the optional background track, either from the bundled library or
//! from an uploaded file (plain audio, or the audio stream of a video
//! container), and fits it to the length of the combined video.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use square_motion::audio::{AudioFitter, AudioLoader};
//!
//! # fn main() -> anyhow::Result<()> {
//! let track = AudioLoader::load("song.mp3")?;
//! let fitted = AudioFitter::new().fit(&track, 12.0)?;
//! assert!((fitted.duration() - 12.0).abs() < 1e-3);
//! # Ok(())
//! # }
//! ```

pub mod fitter;
pub mod library;
pub mod loader;
pub mod types;

pub use fitter::{write_wav, AudioFitter};
pub use library::AudioLibrary;
pub use loader::AudioLoader;
pub use types::AudioTrack;
