use thiserror::Error;

/// Main error type for the SquareMotion library
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image-specific errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {name}")]
    DecodeFailed { name: String },

    #[error("Failed to encode image: {name} - {reason}")]
    EncodeFailed { name: String, reason: String },

    #[error("Invalid transform parameters: {details}")]
    InvalidParameters { details: String },
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("No decodable audio stream in: {path}")]
    NoAudioStream { path: String },

    #[error("Track not found in audio library: {name}")]
    NotInLibrary { name: String },

    #[error("Failed to write audio file: {path} - {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("FFmpeg not found. Please install FFmpeg and make sure `{tool}` is on PATH.")]
    ToolMissing { tool: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Video probing failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Composition-specific errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("No images supplied")]
    NoImages,

    #[error("Cannot concatenate an empty clip list")]
    EmptyClipList,

    #[error("Invalid duration range: min={min}, max={max}")]
    InvalidDurationRange { min: u32, max: u32 },

    #[error("Output generation failed: {reason}")]
    OutputFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using MotionError
pub type Result<T> = std::result::Result<T, MotionError>;

impl MotionError {
    /// Whether the error was caused by the caller's input rather than by the
    /// filesystem or the encoder
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Image(ImageError::DecodeFailed { .. })
            | Self::Image(ImageError::InvalidParameters { .. }) => true,
            Self::Audio(AudioError::LoadFailed { .. })
            | Self::Audio(AudioError::UnsupportedFormat { .. })
            | Self::Audio(AudioError::NoAudioStream { .. })
            | Self::Audio(AudioError::NotInLibrary { .. })
            | Self::Audio(AudioError::InvalidParameters { .. }) => true,
            Self::Video(VideoError::InvalidParameters { .. }) => true,
            Self::Composition(CompositionError::NoImages)
            | Self::Composition(CompositionError::EmptyClipList)
            | Self::Composition(CompositionError::InvalidDurationRange { .. }) => true,
            Self::Config(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Image(ImageError::DecodeFailed { name }) => {
                format!("Could not read image '{}'. Please upload a PNG or JPEG file.", name)
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Audio(AudioError::NoAudioStream { path }) => {
                format!("'{}' does not contain an audio track.", path)
            }
            Self::Composition(CompositionError::InvalidDurationRange { min, max }) => {
                format!("The maximum clip duration ({}s) must not be smaller than the minimum ({}s).", max, min)
            }
            Self::Video(VideoError::ToolMissing { tool }) => {
                format!("'{}' is required to build videos but was not found on PATH.", tool)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let err: MotionError = CompositionError::EmptyClipList.into();
        assert!(err.is_validation());

        let err: MotionError = VideoError::EncodingFailed { reason: "boom".to_string() }.into();
        assert!(!err.is_validation());

        let err: MotionError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(!err.is_validation());
    }

    #[test]
    fn test_user_message_names_the_range() {
        let err: MotionError = CompositionError::InvalidDurationRange { min: 5, max: 2 }.into();
        let message = err.user_message();
        assert!(message.contains("2s"));
        assert!(message.contains("5s"));
    }
}
