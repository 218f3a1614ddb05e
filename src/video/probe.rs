//! Read-back of encoded video through `ffprobe` and `ffmpeg`.

use std::path::Path;
use std::process::Command;

use image::RgbImage;
use serde::Deserialize;

use crate::error::{Result, VideoError};
use crate::scratch::Scratch;
use crate::video::encoder::{ensure_tool, run_tool, INPUT_PIXEL_FORMAT};

/// Stream facts of an encoded video file
#[derive(Debug, Clone)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Decoded frame count of the first video stream
    pub frame_count: u64,
    /// Container duration in seconds
    pub duration: f64,
    pub has_audio: bool,
    /// Duration of the first audio stream, if any
    pub audio_duration: Option<f64>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_read_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe a video file, decoding it fully to count frames
pub fn probe_video<P: AsRef<Path>>(path: P) -> Result<VideoProbe> {
    let path = path.as_ref();
    ensure_tool("ffprobe")?;

    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v", "error",
        "-count_frames",
        "-print_format", "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(path);

    let output = run_tool(cmd, "ffprobe")?;
    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| VideoError::ProbeFailed {
            reason: format!("ffprobe json parse failed: {}", e),
        })?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VideoError::ProbeFailed {
            reason: format!("no video stream in {}", path.display()),
        })?;

    let width = video.width.ok_or_else(|| VideoError::ProbeFailed {
        reason: "missing video width".to_string(),
    })?;
    let height = video.height.ok_or_else(|| VideoError::ProbeFailed {
        reason: "missing video height".to_string(),
    })?;

    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(parse_ratio)
        .unwrap_or(0.0);
    let frame_count = video
        .nb_read_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);
    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoProbe {
        width,
        height,
        fps,
        frame_count,
        duration,
        has_audio: audio.is_some(),
        audio_duration: audio
            .and_then(|s| s.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok()),
    })
}

/// Probe in-memory MP4 bytes by staging them in the scratch directory
pub fn probe_bytes(bytes: &[u8], scratch: &Scratch) -> Result<VideoProbe> {
    let file = scratch.artifact("mp4");
    std::fs::write(file.path(), bytes)?;
    probe_video(file.path())
}

/// Decode the first frame of a video as RGB
pub fn first_frame<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let probe = probe_video(path)?;
    ensure_tool("ffmpeg")?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-frames:v", "1",
            "-f", "rawvideo",
            "-pix_fmt", INPUT_PIXEL_FORMAT,
            "pipe:1",
        ]);

    let output = run_tool(cmd, "ffmpeg frame decode")?;
    RgbImage::from_raw(probe.width, probe.height, output.stdout).ok_or_else(|| {
        VideoError::DecodingFailed {
            reason: format!("decoded frame of {} does not match {}x{}", path.display(), probe.width, probe.height),
        }.into()
    })
}

fn parse_ratio(ratio: &str) -> Option<f64> {
    let (num, den) = ratio.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("30/1"), Some(30.0));
        assert_eq!(parse_ratio("30000/1001").map(|f| (f * 100.0).round()), Some(2997.0));
        assert_eq!(parse_ratio("0/0"), None);
        assert_eq!(parse_ratio("thirty"), None);
    }
}
