/// Decoded audio, interleaved f32 samples in -1.0..=1.0
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Where the track came from (file path, library name or upload name)
    pub source: String,
}

impl AudioTrack {
    pub fn new<S: Into<String>>(samples: Vec<f32>, sample_rate: u32, channels: u16, source: S) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            source: source.into(),
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Number of sample frames closest to `seconds`
    pub fn frames_for(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64).round() as usize
    }
}
