//! # Composition Engine
//!
//! The composition engine runs uploaded images through still transform, clip
//! synthesis and concatenation, and hands every artifact back in memory.

pub mod duration;
pub mod engine;

// Re-exports for convenience
pub use duration::{DurationRange, DurationSource, FixedDuration, ScriptedDurations, UniformDuration};
pub use engine::{AudioChoice, CompositionEngine, CompositionOutput};
