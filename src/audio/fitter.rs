use std::path::Path;

use tracing::debug;

use crate::audio::types::AudioTrack;
use crate::error::{AudioError, Result};

/// Trims or loops a background track to an exact length
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioFitter;

impl AudioFitter {
    pub fn new() -> Self {
        Self
    }

    /// Return a track exactly `target_secs` long, to the nearest sample frame.
    ///
    /// Longer input is cut to `[0, target)`. Shorter input is repeated from its
    /// first frame, back to back, and the last repetition is cut short. Input of
    /// the right length is returned as is.
    pub fn fit(&self, track: &AudioTrack, target_secs: f64) -> Result<AudioTrack> {
        if !target_secs.is_finite() || target_secs < 0.0 {
            return Err(AudioError::InvalidParameters {
                details: format!("target duration must be a non-negative number, got {}", target_secs),
            }.into());
        }
        if track.channels == 0 || track.sample_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: format!(
                    "'{}' has {} channels at {} Hz",
                    track.source, track.channels, track.sample_rate
                ),
            }.into());
        }

        let channels = track.channels as usize;
        let source_frames = track.frames();
        let target_frames = track.frames_for(target_secs);

        if source_frames == 0 && target_frames > 0 {
            return Err(AudioError::InvalidParameters {
                details: format!("'{}' has no samples to loop", track.source),
            }.into());
        }

        // Only whole frames take part; a dangling partial frame is dropped
        let source = &track.samples[..source_frames * channels];
        let target_len = target_frames * channels;

        if source_frames == target_frames {
            debug!("Audio '{}' already {:.3}s long", track.source, target_secs);
            return Ok(AudioTrack {
                samples: source.to_vec(),
                sample_rate: track.sample_rate,
                channels: track.channels,
                source: track.source.clone(),
            });
        }

        let samples: Vec<f32> = if source_frames > target_frames {
            debug!(
                "Trimming audio '{}' from {:.3}s to {:.3}s",
                track.source, track.duration(), target_secs
            );
            source[..target_len].to_vec()
        } else {
            debug!(
                "Looping audio '{}' ({:.3}s) to {:.3}s",
                track.source, track.duration(), target_secs
            );
            source.iter().copied().cycle().take(target_len).collect()
        };

        Ok(AudioTrack {
            samples,
            sample_rate: track.sample_rate,
            channels: track.channels,
            source: track.source.clone(),
        })
    }
}

/// Write a track as 16-bit PCM WAV, the form it is muxed from
pub fn write_wav<P: AsRef<Path>>(track: &AudioTrack, path: P) -> Result<()> {
    let path = path.as_ref();
    let write_failed = |e: hound::Error| AudioError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let spec = hound::WavSpec {
        channels: track.channels,
        sample_rate: track.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(write_failed)?;
    for &sample in &track.samples {
        writer
            .write_sample(float_to_i16(sample))
            .map_err(write_failed)?;
    }
    writer.finalize().map_err(write_failed)?;

    Ok(())
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(frames: usize, channels: u16, sample_rate: u32) -> AudioTrack {
        let samples = (0..frames * channels as usize)
            .map(|i| (i / channels as usize) as f32 / frames as f32)
            .collect();
        AudioTrack::new(samples, sample_rate, channels, "ramp")
    }

    #[test]
    fn test_longer_track_is_truncated() {
        let track = ramp(1000, 2, 100); // 10s
        let fitted = AudioFitter::new().fit(&track, 4.0).unwrap();
        assert_eq!(fitted.duration(), 4.0);
        assert_eq!(fitted.samples[..], track.samples[..800]);
    }

    #[test]
    fn test_shorter_track_is_looped() {
        let track = ramp(300, 1, 100); // 3s
        let fitted = AudioFitter::new().fit(&track, 7.5).unwrap();
        assert_eq!(fitted.frames(), 750);
        assert_eq!(fitted.duration(), 7.5);

        // Each repetition starts at the beginning of the source
        assert_eq!(fitted.samples[0..300], track.samples[..]);
        assert_eq!(fitted.samples[300..600], track.samples[..]);
        assert_eq!(fitted.samples[600..750], track.samples[..150]);
    }

    #[test]
    fn test_looping_keeps_channels_aligned() {
        // Left channel positive, right channel negative
        let samples: Vec<f32> = (0..10).flat_map(|i| [i as f32, -(i as f32)]).collect();
        let track = AudioTrack::new(samples, 10, 2, "lr");
        let fitted = AudioFitter::new().fit(&track, 2.5).unwrap();
        assert_eq!(fitted.frames(), 25);
        for frame in fitted.samples.chunks(2) {
            assert_eq!(frame[0], -frame[1]);
        }
    }

    #[test]
    fn test_equal_track_passes_through() {
        let track = ramp(441, 2, 441);
        let fitted = AudioFitter::new().fit(&track, 1.0).unwrap();
        assert_eq!(fitted.samples, track.samples);
        assert_eq!(fitted.duration(), track.duration());
    }

    #[test]
    fn test_partial_frame_dropped_at_exact_length() {
        let dir = tempdir().unwrap();
        // Two whole stereo frames plus one stray sample
        let track = AudioTrack::new(vec![0.1, 0.2, 0.3, 0.4, 0.5], 2, 2, "odd");
        let fitted = AudioFitter::new().fit(&track, 1.0).unwrap();
        assert_eq!(fitted.samples, vec![0.1, 0.2, 0.3, 0.4]);
        write_wav(&fitted, dir.path().join("odd.wav")).unwrap();
    }

    #[test]
    fn test_duration_exact_for_all_cases() {
        let fitter = AudioFitter::new();
        for &source_secs in &[0.5, 2.0, 3.0, 9.25] {
            let track = ramp((source_secs * 48000.0) as usize, 2, 48000);
            for &target in &[1.0, 2.0, 3.0, 4.0 + 1.0 / 30.0] {
                let fitted = fitter.fit(&track, target).unwrap();
                assert!(
                    (fitted.duration() - target).abs() <= 1.0 / 48000.0,
                    "{}s -> {}s gave {}s",
                    source_secs, target, fitted.duration()
                );
            }
        }
    }

    #[test]
    fn test_empty_track_cannot_be_looped() {
        let track = AudioTrack::new(Vec::new(), 44100, 2, "empty");
        let err = AudioFitter::new().fit(&track, 1.0).unwrap_err();
        assert!(err.is_validation());
        // Zero target on an empty track is already the right length
        assert!(AudioFitter::new().fit(&track, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_target_rejected() {
        let track = ramp(10, 1, 10);
        assert!(AudioFitter::new().fit(&track, -1.0).is_err());
        assert!(AudioFitter::new().fit(&track, f64::NAN).is_err());
    }

    #[test]
    fn test_write_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fitted.wav");
        let track = AudioTrack::new(vec![0.0, 1.0, -1.0, 0.5], 8000, 2, "tiny");
        write_wav(&track, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8000);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, i16::MAX, -i16::MAX, 16384]);
    }
}
