use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Output, Stdio};

use image::RgbImage;
use tracing::{debug, warn};

use crate::error::{MotionError, Result, VideoError};
use crate::video::types::VideoParams;

/// The one codec every clip and combined video is written with
pub const VIDEO_CODEC: &str = "libx264";

/// Pixel format handed to ffmpeg on stdin. Frames are written as RGB, so no
/// channel swap happens on our side.
pub const INPUT_PIXEL_FORMAT: &str = "rgb24";

/// Pixel format of the encoded stream
pub const OUTPUT_PIXEL_FORMAT: &str = "yuv420p";

pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn ensure_tool(tool: &str) -> Result<()> {
    if !is_tool_on_path(tool) {
        return Err(VideoError::ToolMissing { tool: tool.to_string() }.into());
    }
    Ok(())
}

/// yuv420p needs even dimensions; odd sides grow by one
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width + (width & 1), height + (height & 1))
}

/// Run a prepared ffmpeg/ffprobe command to completion and fail with its stderr
/// when it exits unsuccessfully
pub fn run_tool(mut cmd: Command, what: &str) -> Result<Output> {
    debug!("Running {:?}", cmd);

    let output = cmd.output().map_err(|e| VideoError::EncodingFailed {
        reason: format!("Failed to spawn {}: {}", what, e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::EncodingFailed {
            reason: format!("{} failed ({}): {}", what, output.status, stderr.trim()),
        }.into());
    }

    Ok(output)
}

/// Streams raw RGB frames into a system `ffmpeg` process that writes an H.264 MP4
pub struct FfmpegEncoder {
    width: u32,
    height: u32,
    out_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new<P: AsRef<Path>>(
        width: u32,
        height: u32,
        params: &VideoParams,
        out_path: P,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VideoError::InvalidParameters {
                details: format!("frame size must be non-zero, got {}x{}", width, height),
            }.into());
        }
        if params.fps == 0 {
            return Err(VideoError::InvalidParameters {
                details: "fps must be non-zero".to_string(),
            }.into());
        }

        ensure_tool("ffmpeg")?;

        let out_path = out_path.as_ref().to_path_buf();
        let (even_w, even_h) = even_dimensions(width, height);

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pix_fmt", INPUT_PIXEL_FORMAT,
            "-s", &format!("{}x{}", width, height),
            "-r", &params.fps.to_string(),
            "-i", "pipe:0",
            "-an",
        ]);

        if (even_w, even_h) != (width, height) {
            cmd.args(["-vf", &format!("pad={}:{}:0:0:color=black", even_w, even_h)]);
        }

        cmd.args([
            "-c:v", VIDEO_CODEC,
            "-pix_fmt", OUTPUT_PIXEL_FORMAT,
            "-crf", &params.crf().to_string(),
            "-r", &params.fps.to_string(),
            "-movflags", "+faststart",
        ])
        .arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| VideoError::EncodingFailed {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "Failed to open FFmpeg stdin".to_string(),
        })?;

        Ok(Self {
            width,
            height,
            out_path,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    /// Size of the frames in the encoded stream
    pub fn encoded_dimensions(&self) -> (u32, u32) {
        even_dimensions(self.width, self.height)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn encode_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(VideoError::InvalidParameters {
                details: format!(
                    "frame size mismatch: got {}x{}, expected {}x{}",
                    frame.width(), frame.height(), self.width, self.height
                ),
            }.into());
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VideoError::EncodingFailed {
                reason: "FFmpeg encoder is already finalized".to_string(),
            }.into());
        };

        if let Err(e) = stdin.write_all(frame.as_raw()) {
            return Err(self.collect_failure(format!("Failed to write frame to FFmpeg: {}", e)));
        }

        self.frames_written += 1;
        Ok(())
    }

    /// Write the same frame `count` times
    pub fn encode_still(&mut self, frame: &RgbImage, count: u64) -> Result<()> {
        for _ in 0..count {
            self.encode_frame(frame)?;
        }
        Ok(())
    }

    /// Close stdin and wait for ffmpeg to flush the file
    pub fn finish(mut self) -> Result<PathBuf> {
        drop(self.stdin.take());

        let child = self.child.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "FFmpeg process already reaped".to_string(),
        })?;

        let output = child.wait_with_output().map_err(|e| VideoError::EncodingFailed {
            reason: format!("Failed to wait for FFmpeg to finish: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg failed ({}): {}", output.status, stderr.trim()),
            }.into());
        }

        debug!("Encoded {} frames to {:?}", self.frames_written, self.out_path);
        Ok(self.out_path.clone())
    }

    fn collect_failure(&mut self, context: String) -> MotionError {
        drop(self.stdin.take());

        let stderr = self
            .child
            .take()
            .and_then(|child| child.wait_with_output().ok())
            .map(|output| String::from_utf8_lossy(&output.stderr).trim().to_string())
            .unwrap_or_default();

        VideoError::EncodingFailed {
            reason: format!("{}: {}", context, stderr),
        }.into()
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("FFmpeg already exited: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap FFmpeg process: {}", e);
            }
        }
    }
}
