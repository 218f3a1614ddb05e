use std::process::Command;

use tracing::{debug, info};

use crate::audio::{write_wav, AudioFitter, AudioTrack};
use crate::error::{CompositionError, Result};
use crate::scratch::{Scratch, ScratchFile};
use crate::video::encoder::{
    ensure_tool, even_dimensions, run_tool, OUTPUT_PIXEL_FORMAT, VIDEO_CODEC,
};
use crate::video::types::{CombinedVideo, VideoClip, VideoParams};

/// Joins clips in order into one video and attaches the background track
pub struct VideoConcatenator {
    params: VideoParams,
    fitter: AudioFitter,
}

impl VideoConcatenator {
    pub fn new(params: VideoParams) -> Self {
        Self {
            params,
            fitter: AudioFitter::new(),
        }
    }

    /// Length of the joined clips, in seconds
    pub fn total_duration(clips: &[VideoClip]) -> f64 {
        clips.iter().map(VideoClip::duration).sum()
    }

    /// Canvas every clip is composed onto: the largest width and height among
    /// the clips, kept even for yuv420p
    pub fn canvas_size(clips: &[VideoClip]) -> (u32, u32) {
        let width = clips.iter().map(|c| c.resolution.0).max().unwrap_or(0);
        let height = clips.iter().map(|c| c.resolution.1).max().unwrap_or(0);
        even_dimensions(width, height)
    }

    /// Join `clips` in order. Clips of a different size are centered on a
    /// black canvas and clips of a different frame rate are resampled, so
    /// mismatches never fail the join. When `audio` is given it is fitted to
    /// the joined length first and becomes the only audio stream.
    pub fn concatenate(
        &self,
        clips: &[VideoClip],
        audio: Option<&AudioTrack>,
        scratch: &Scratch,
    ) -> Result<CombinedVideo> {
        if clips.is_empty() {
            return Err(CompositionError::EmptyClipList.into());
        }

        ensure_tool("ffmpeg")?;

        let total_duration = Self::total_duration(clips);
        let frame_count = (total_duration * self.params.fps as f64).round() as u64;
        let (width, height) = Self::canvas_size(clips);

        info!(
            "Concatenating {} clips into {:.2}s ({} frames) on a {}x{} canvas",
            clips.len(), total_duration, frame_count, width, height
        );

        // Keep every staged input alive until ffmpeg has finished with it
        let mut inputs: Vec<ScratchFile> = Vec::with_capacity(clips.len() + 1);
        for clip in clips {
            let file = scratch.artifact("mp4");
            std::fs::write(file.path(), &clip.bytes)?;
            inputs.push(file);
        }

        let fitted_audio = match audio {
            Some(track) => {
                let fitted = self.fitter.fit(track, total_duration)?;
                let file = scratch.artifact("wav");
                write_wav(&fitted, file.path())?;
                debug!(
                    "Attaching '{}' fitted from {:.2}s to {:.2}s",
                    track.source, track.duration(), fitted.duration()
                );
                Some(file)
            }
            None => None,
        };

        let output = scratch.artifact("mp4");

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"]);
        for input in &inputs {
            cmd.arg("-i").arg(input.path());
        }
        if let Some(wav) = &fitted_audio {
            cmd.arg("-i").arg(wav.path());
        }

        cmd.args(["-filter_complex", &self.filter_graph(clips.len(), width, height)]);
        cmd.args(["-map", "[outv]"]);

        if fitted_audio.is_some() {
            cmd.args([
                "-map", &format!("{}:a", inputs.len()),
                "-c:a", "aac",
                "-b:a", &format!("{}k", self.params.audio_bitrate_kbps),
            ]);
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v", VIDEO_CODEC,
            "-pix_fmt", OUTPUT_PIXEL_FORMAT,
            "-crf", &self.params.crf().to_string(),
            "-r", &self.params.fps.to_string(),
            "-frames:v", &frame_count.to_string(),
            "-movflags", "+faststart",
        ])
        .arg(output.path());

        run_tool(cmd, "FFmpeg concatenation")?;
        let bytes = output.take_bytes()?;

        Ok(CombinedVideo {
            bytes,
            fps: self.params.fps,
            frame_count,
            resolution: (width, height),
            clip_count: clips.len(),
            has_audio: fitted_audio.is_some(),
        })
    }

    /// Center each input on the canvas, normalize sample aspect and frame
    /// rate, then concatenate the normalized streams in input order
    fn filter_graph(&self, clip_count: usize, width: u32, height: u32) -> String {
        let mut graph = String::new();
        for i in 0..clip_count {
            graph.push_str(&format!(
                "[{i}:v]pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps},format={fmt}[v{i}];",
                i = i,
                w = width,
                h = height,
                fps = self.params.fps,
                fmt = OUTPUT_PIXEL_FORMAT,
            ));
        }
        for i in 0..clip_count {
            graph.push_str(&format!("[v{}]", i));
        }
        graph.push_str(&format!("concat=n={}:v=1:a=0[outv]", clip_count));
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;
    use crate::imaging::ProcessedImage;
    use crate::video::encoder::is_tool_on_path;
    use crate::video::probe::probe_bytes;
    use crate::video::synthesizer::ClipSynthesizer;
    use image::{Rgb, RgbImage};

    fn ffmpeg_tools_available() -> bool {
        is_tool_on_path("ffmpeg") && is_tool_on_path("ffprobe")
    }

    fn clip_stub(resolution: (u32, u32), duration_secs: u32) -> VideoClip {
        VideoClip {
            source_name: "stub.png".to_string(),
            duration_secs,
            fps: 30,
            frame_count: 30 * duration_secs as u64,
            resolution,
            bytes: Vec::new(),
        }
    }

    fn synthesize(name: &str, size: (u32, u32), secs: u32, scratch: &Scratch) -> VideoClip {
        let image = ProcessedImage::new(name, RgbImage::from_pixel(size.0, size.1, Rgb([90, 160, 30])));
        ClipSynthesizer::new(VideoParams::default())
            .synthesize(&image, secs, scratch)
            .unwrap()
    }

    #[test]
    fn test_empty_clip_list_is_rejected() {
        let scratch = Scratch::new().unwrap();
        let concatenator = VideoConcatenator::new(VideoParams::default());
        let result = concatenator.concatenate(&[], None, &scratch);
        assert!(matches!(
            result,
            Err(MotionError::Composition(CompositionError::EmptyClipList))
        ));
    }

    #[test]
    fn test_canvas_and_duration() {
        let clips = vec![clip_stub((564, 1000), 1), clip_stub((100, 1200), 3)];
        assert_eq!(VideoConcatenator::canvas_size(&clips), (564, 1200));
        assert_eq!(VideoConcatenator::total_duration(&clips), 4.0);
    }

    #[test]
    fn test_filter_graph_orders_inputs() {
        let concatenator = VideoConcatenator::new(VideoParams::default());
        let graph = concatenator.filter_graph(2, 64, 48);
        assert!(graph.starts_with("[0:v]pad=64:48:"));
        assert!(graph.contains("[1:v]pad=64:48:"));
        assert!(graph.ends_with("[v0][v1]concat=n=2:v=1:a=0[outv]"));
    }

    #[test]
    fn test_two_clips_add_up() {
        if !ffmpeg_tools_available() {
            eprintln!("skipping: ffmpeg/ffprobe not on PATH");
            return;
        }

        let scratch = Scratch::new().unwrap();
        let a = synthesize("a.png", (64, 64), 1, &scratch);
        let b = synthesize("b.png", (48, 96), 2, &scratch);

        let concatenator = VideoConcatenator::new(VideoParams::default());
        let combined = concatenator.concatenate(&[a.clone(), b.clone()], None, &scratch).unwrap();
        assert_eq!(combined.frame_count, 90);
        assert_eq!(combined.resolution, (64, 96));
        assert!(!combined.has_audio);

        let probe = probe_bytes(&combined.bytes, &scratch).unwrap();
        assert!((probe.frame_count as i64 - 90).abs() <= 1);
        assert!((probe.duration - (a.duration() + b.duration())).abs() <= 1.0 / 30.0 + 1e-6);
        assert_eq!((probe.width, probe.height), (64, 96));
        assert!(!probe.has_audio);
    }

    #[test]
    fn test_audio_is_fitted_and_attached() {
        if !ffmpeg_tools_available() {
            eprintln!("skipping: ffmpeg/ffprobe not on PATH");
            return;
        }

        let scratch = Scratch::new().unwrap();
        let clip = synthesize("a.png", (64, 64), 2, &scratch);

        // Half a second of a 440 Hz tone has to be looped to two seconds
        let samples: Vec<f32> = (0..22050)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 44100.0).sin() * 0.3)
            .collect();
        let tone = AudioTrack::new(samples, 44100, 1, "tone");

        let concatenator = VideoConcatenator::new(VideoParams::default());
        let combined = concatenator.concatenate(&[clip], Some(&tone), &scratch).unwrap();
        assert!(combined.has_audio);
        assert_eq!(combined.frame_count, 60);

        let probe = probe_bytes(&combined.bytes, &scratch).unwrap();
        assert!(probe.has_audio);
        let audio_duration = probe.audio_duration.unwrap_or(probe.duration);
        assert!((audio_duration - 2.0).abs() < 0.1, "audio lasted {}s", audio_duration);
    }
}
