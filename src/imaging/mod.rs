//! # Still Image Module
//!
//! Decodes uploaded images and turns each square source into a vertical still:
//! a blurred, resized copy of the source fills the canvas, the untouched source
//! is pasted in the middle, and the canvas is cropped to the requested aspect
//! ratio.

pub mod transform;
pub mod types;

pub use transform::{ImageTransformer, TransformParams};
pub use types::{ProcessedImage, SourceImage};
