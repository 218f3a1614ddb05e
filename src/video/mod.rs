//! # Video Module
//!
//! Encodes processed stills into fixed-length clips and joins clips into the
//! combined video. Encoding goes through the system `ffmpeg` binary with a
//! single fixed codec (H.264 in MP4); `ffprobe` is used to read results back.

pub mod concatenator;
pub mod encoder;
pub mod probe;
pub mod synthesizer;
pub mod types;

pub use concatenator::VideoConcatenator;
pub use encoder::FfmpegEncoder;
pub use probe::{probe_video, VideoProbe};
pub use synthesizer::ClipSynthesizer;
pub use types::{CombinedVideo, VideoClip, VideoParams};
