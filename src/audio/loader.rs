use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::audio::types::AudioTrack;
use crate::error::{AudioError, Result};

/// Plain audio formats
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// Video containers whose audio stream can be extracted
const CONTAINER_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm"];

/// Audio loader supporting plain audio files and the audio stream of video containers
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file, or the first audio stream of a video container
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioTrack> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let extension = Self::detect_format(path).unwrap_or_default();

        match extension.as_str() {
            "wav" => {
                let reader = hound::WavReader::open(path)
                    .map_err(|_| AudioError::LoadFailed { path: label.clone() })?;
                Self::decode_wav(reader, label)
            }
            ext if Self::is_format_supported(ext) => {
                let file = File::open(path)
                    .map_err(|_| AudioError::LoadFailed { path: label.clone() })?;
                Self::decode_with_symphonia(Box::new(file), &extension, label)
            }
            _ => Err(AudioError::UnsupportedFormat { format: extension.clone() }.into()),
        }
    }

    /// Decode an uploaded media file held in memory. `extension` is the
    /// upload's file extension and selects the decoder.
    pub fn load_bytes(bytes: Vec<u8>, extension: &str, name: &str) -> Result<AudioTrack> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        let label = name.to_string();

        match extension.as_str() {
            "wav" => {
                let reader = hound::WavReader::new(Cursor::new(bytes))
                    .map_err(|_| AudioError::LoadFailed { path: label.clone() })?;
                Self::decode_wav(reader, label)
            }
            ext if Self::is_format_supported(ext) => {
                Self::decode_with_symphonia(Box::new(Cursor::new(bytes)), &extension, label)
            }
            _ => Err(AudioError::UnsupportedFormat { format: extension.clone() }.into()),
        }
    }

    /// WAV goes through hound, which handles every PCM layout WAV allows
    fn decode_wav<R: std::io::Read>(reader: hound::WavReader<R>, label: String) -> Result<AudioTrack> {
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| AudioError::LoadFailed { path: label.clone() })?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| Self::int_to_float(s, bit_depth)))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| AudioError::LoadFailed { path: label.clone() })?
            }
        };

        debug!("Decoded WAV '{}': {} Hz, {} channels", label, spec.sample_rate, spec.channels);
        Ok(AudioTrack::new(samples, spec.sample_rate, spec.channels, label))
    }

    /// Everything else goes through Symphonia; the first track carrying a
    /// decodable audio codec is used, so video streams in containers are skipped
    fn decode_with_symphonia(
        source: Box<dyn MediaSource>,
        extension: &str,
        label: String,
    ) -> Result<AudioTrack> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if !extension.is_empty() {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|_| AudioError::LoadFailed { path: label.clone() })?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
            .ok_or_else(|| AudioError::NoAudioStream { path: label.clone() })?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|_| AudioError::UnsupportedFormat {
                format: format!("{} ({})", extension, label),
            })?;

        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => {
                    warn!("Stopped reading '{}' early: {}", label, e);
                    break;
                }
            };

            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;

                    let needed = decoded.capacity() as u64;
                    let fits = sample_buf.as_ref().map_or(false, |buf| {
                        buf.capacity() as u64 >= needed * channels as u64
                    });
                    if !fits {
                        sample_buf = Some(SampleBuffer::new(needed, spec));
                    }
                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        samples.extend_from_slice(buf.samples());
                    }
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!("Skipping undecodable packet in '{}': {}", label, e);
                    continue;
                }
                Err(e) => {
                    warn!("Stopped decoding '{}' early: {}", label, e);
                    break;
                }
            }
        }

        if sample_rate == 0 || channels == 0 {
            return Err(AudioError::InvalidParameters {
                details: format!("no sample rate or channel layout found in '{}'", label),
            }.into());
        }

        debug!(
            "Decoded '{}': {} Hz, {} channels, {} samples",
            label, sample_rate, channels, samples.len()
        );
        Ok(AudioTrack::new(samples, sample_rate, channels, label))
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => sample as f32 / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0, // Default to 16-bit
        }
    }

    /// Detect media format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        let extension = extension.to_lowercase();
        AUDIO_EXTENSIONS.contains(&extension.as_str()) || Self::is_video_container(&extension)
    }

    /// Whether the extension names a video container rather than a plain audio file
    pub fn is_video_container(extension: &str) -> bool {
        CONTAINER_EXTENSIONS.contains(&extension.to_lowercase().as_str())
    }
}
