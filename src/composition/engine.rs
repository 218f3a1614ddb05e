use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    audio::{AudioLibrary, AudioLoader, AudioTrack},
    composition::duration::{DurationRange, DurationSource, UniformDuration},
    config::Config,
    error::{CompositionError, Result},
    imaging::{ImageTransformer, ProcessedImage, SourceImage},
    scratch::Scratch,
    video::{ClipSynthesizer, CombinedVideo, VideoClip, VideoConcatenator},
};

/// Where the background track comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioChoice {
    /// No background audio
    None,

    /// A bundled library track, by name
    Library(String),

    /// An uploaded audio file or video container
    File(PathBuf),
}

/// Everything one run produces, in upload order
#[derive(Debug, Clone)]
pub struct CompositionOutput {
    /// Token naming this run's scratch space
    pub run_id: Uuid,

    /// One processed still per uploaded image
    pub images: Vec<ProcessedImage>,

    /// One clip per processed still
    pub clips: Vec<VideoClip>,

    /// All clips joined, with the background track if one was given
    pub combined: CombinedVideo,
}

/// Runs uploads through the whole pipeline
///
/// 1. Still transform - blur backdrop, centered original, aspect crop
/// 2. Clip synthesis - one clip per still, duration drawn per image
/// 3. Concatenation - clips joined in upload order, background track fitted and attached
pub struct CompositionEngine {
    config: Config,
    durations: Box<dyn DurationSource>,
}

impl CompositionEngine {
    /// Create an engine; durations are drawn uniformly, seeded from the config if set
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let durations: Box<dyn DurationSource> = match config.pipeline.seed {
            Some(seed) => Box::new(UniformDuration::seeded(seed)),
            None => Box::new(UniformDuration::from_entropy()),
        };

        Ok(Self { config, durations })
    }

    /// Replace the duration source, e.g. to pin durations
    pub fn with_duration_source<D: DurationSource + 'static>(mut self, source: D) -> Self {
        self.durations = Box::new(source);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the background track for a run
    pub fn load_audio(&self, choice: &AudioChoice) -> Result<Option<AudioTrack>> {
        match choice {
            AudioChoice::None => Ok(None),
            AudioChoice::Library(name) => {
                let library = AudioLibrary::new(&self.config.audio.library_dir);
                library.load(name).map(Some)
            }
            AudioChoice::File(path) => AudioLoader::load(path).map(Some),
        }
    }

    /// Main composition method - orchestrates the entire pipeline
    pub fn compose(
        &mut self,
        images: &[SourceImage],
        audio: Option<&AudioTrack>,
    ) -> Result<CompositionOutput> {
        if images.is_empty() {
            return Err(CompositionError::NoImages.into());
        }

        let range = DurationRange::new(self.config.video.min_duration, self.config.video.max_duration)?;
        let scratch = Scratch::create(self.config.pipeline.scratch_dir.as_deref())?;

        info!("Starting run {} with {} images", scratch.run_id(), images.len());

        let processed = self.transform_images(images)?;
        let clips = self.synthesize_clips(&processed, range, &scratch)?;
        let combined = self.concatenate_clips(&clips, audio, &scratch)?;

        info!(
            "Run {} complete: {} clips, {:.1}s combined{}",
            scratch.run_id(),
            clips.len(),
            combined.duration(),
            if combined.has_audio { " with audio" } else { "" }
        );

        Ok(CompositionOutput {
            run_id: scratch.run_id(),
            images: processed,
            clips,
            combined,
        })
    }

    // ==========================================
    // STEP 1: STILL TRANSFORM
    // ==========================================

    fn transform_images(&self, images: &[SourceImage]) -> Result<Vec<ProcessedImage>> {
        info!("Step 1: Transforming {} images...", images.len());

        let transformer = ImageTransformer::from_config(&self.config.image)?;
        let processed = images
            .iter()
            .map(|image| transformer.transform(image))
            .collect::<Result<Vec<_>>>()?;

        if let Some(first) = processed.first() {
            info!("   Stills are {}x{}", first.width(), first.height());
        }
        Ok(processed)
    }

    // ==========================================
    // STEP 2: CLIP SYNTHESIS
    // ==========================================

    fn synthesize_clips(
        &mut self,
        images: &[ProcessedImage],
        range: DurationRange,
        scratch: &Scratch,
    ) -> Result<Vec<VideoClip>> {
        info!("Step 2: Synthesizing {} clips...", images.len());

        let synthesizer = ClipSynthesizer::new(self.config.video.params.clone());
        let mut clips = Vec::with_capacity(images.len());

        for image in images {
            let secs = self.durations.next_duration(range);
            let clip = synthesizer.synthesize(image, secs, scratch)?;
            debug!(
                "   {} -> {}s, {} frames, {} bytes",
                clip.download_name(), clip.duration_secs, clip.frame_count, clip.bytes.len()
            );
            clips.push(clip);
        }

        Ok(clips)
    }

    // ==========================================
    // STEP 3: CONCATENATION
    // ==========================================

    fn concatenate_clips(
        &self,
        clips: &[VideoClip],
        audio: Option<&AudioTrack>,
        scratch: &Scratch,
    ) -> Result<CombinedVideo> {
        info!("Step 3: Concatenating clips...");

        if let Some(track) = audio {
            info!("   Background: '{}' ({:.1}s)", track.source, track.duration());
        }

        let concatenator = VideoConcatenator::new(self.config.video.params.clone());
        concatenator.concatenate(clips, audio, scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::duration::FixedDuration;
    use crate::error::MotionError;
    use image::RgbImage;

    #[test]
    fn test_no_images_rejected() {
        let mut engine = CompositionEngine::new(Config::default()).unwrap();
        let result = engine.compose(&[], None);
        assert!(matches!(
            result,
            Err(MotionError::Composition(CompositionError::NoImages))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.video.min_duration = 4;
        config.video.max_duration = 2;
        assert!(CompositionEngine::new(config).is_err());
    }

    #[test]
    fn test_transform_step_uses_image_config() {
        let mut config = Config::default();
        config.image.target_size = 200;
        let engine = CompositionEngine::new(config)
            .unwrap()
            .with_duration_source(FixedDuration(1));

        let images = vec![SourceImage::new("a.png", RgbImage::new(100, 100))];
        let processed = engine.transform_images(&images).unwrap();
        assert_eq!(processed[0].dimensions(), (113, 200));
    }

    #[test]
    fn test_no_audio_choice() {
        let engine = CompositionEngine::new(Config::default()).unwrap();
        assert!(engine.load_audio(&AudioChoice::None).unwrap().is_none());
    }

    #[test]
    fn test_unknown_library_track() {
        let mut config = Config::default();
        config.audio.library_dir = PathBuf::from("/definitely/not/a/library");
        let engine = CompositionEngine::new(config).unwrap();
        assert!(engine.load_audio(&AudioChoice::Library("calm".to_string())).is_err());
    }
}
