use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use image::RgbImage;
use log::debug;

use crate::error::FaceSwapError;
use crate::video::{FrameSink, FrameSource};

/// Parameters of a video stream as reported by ffprobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub frame_rate: f64,
}

fn open_err(path: &Path, reason: impl Into<String>) -> FaceSwapError {
    FaceSwapError::VideoOpen {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn create_err(path: &Path, reason: impl Into<String>) -> FaceSwapError {
    FaceSwapError::VideoCreate {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Probe the first video stream of `path` for its dimensions and frame rate.
pub fn probe(ffprobe_bin: &str, path: &Path) -> Result<StreamInfo, FaceSwapError> {
    let output = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| open_err(path, e.to_string()))?;

    if !output.status.success() {
        return Err(open_err(
            path,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_probe_line(String::from_utf8_lossy(&output.stdout).trim())
        .ok_or_else(|| open_err(path, "unparseable ffprobe output"))
}

/// Parse one `width,height,r_frame_rate` csv line, e.g. `640,480,30000/1001`.
fn parse_probe_line(line: &str) -> Option<StreamInfo> {
    let mut parts = line.split(',');
    let width: u32 = parts.next()?.trim().parse().ok()?;
    let height: u32 = parts.next()?.trim().parse().ok()?;
    let rate = parts.next()?.trim();

    let frame_rate = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.parse().ok()?,
    };

    if width == 0 || height == 0 || frame_rate <= 0.0 {
        return None;
    }

    Some(StreamInfo {
        width,
        height,
        frame_rate,
    })
}

/// [`FrameSource`] that decodes a video file by streaming rgb24 rawvideo out
/// of an ffmpeg child process.
#[derive(Debug)]
pub struct FfmpegFrameSource {
    child: Child,
    stdout: ChildStdout,
    info: StreamInfo,
    done: bool,
}

impl FfmpegFrameSource {
    /// Probe `path` and start decoding it.
    pub fn open(ffmpeg_bin: &str, ffprobe_bin: &str, path: &Path) -> Result<Self, FaceSwapError> {
        let info = probe(ffprobe_bin, path)?;
        debug!(
            "opening {} as {}x{} @ {:.3} fps",
            path.display(),
            info.width,
            info.height,
            info.frame_rate
        );

        let mut child = Command::new(ffmpeg_bin)
            .args(["-v", "error"])
            .arg("-i")
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| open_err(path, e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| open_err(path, "decoder stdout unavailable"))?;

        Ok(Self {
            child,
            stdout,
            info,
            done: false,
        })
    }
}

impl FrameSource for FfmpegFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn frame_rate(&self) -> f64 {
        self.info.frame_rate
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, FaceSwapError> {
        if self.done {
            return Ok(None);
        }

        let frame_len = self.info.width as usize * self.info.height as usize * 3;
        let mut buf = vec![0u8; frame_len];
        let mut filled = 0;
        while filled < frame_len {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FaceSwapError::Stream(e.to_string())),
            }
        }

        if filled == 0 {
            // clean end of stream
            self.done = true;
            let _ = self.child.wait();
            return Ok(None);
        }
        if filled < frame_len {
            return Err(FaceSwapError::TruncatedFrame {
                expected: frame_len,
                got: filled,
            });
        }

        let frame = RgbImage::from_raw(self.info.width, self.info.height, buf)
            .ok_or_else(|| FaceSwapError::Stream("frame buffer size mismatch".to_string()))?;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        // reap the decoder on every exit path, including early abort
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// [`FrameSink`] that encodes rgb24 rawvideo frames into a video file via an
/// ffmpeg child process (H.264 in whatever container the extension implies).
#[derive(Debug)]
pub struct FfmpegFrameSink {
    child: Child,
    stdin: Option<ChildStdin>,
    finished: bool,
}

impl FfmpegFrameSink {
    /// Start an encoder writing to `path` with the given stream parameters.
    ///
    /// The output file comes into existence here — callers who need
    /// "no partial output on failure" must create the sink only after every
    /// other input has been validated.
    pub fn create(ffmpeg_bin: &str, path: &Path, info: StreamInfo) -> Result<Self, FaceSwapError> {
        let size = format!("{}x{}", info.width, info.height);
        let rate = format!("{}", info.frame_rate);

        let mut child = Command::new(ffmpeg_bin)
            .args(["-v", "error", "-y"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &size, "-r", &rate])
            .args(["-i", "pipe:0"])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| create_err(path, e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| create_err(path, "encoder stdin unavailable"))?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            finished: false,
        })
    }
}

impl FrameSink for FfmpegFrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), FaceSwapError> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin
                .write_all(frame.as_raw())
                .map_err(|e| FaceSwapError::Stream(e.to_string())),
            None => Err(FaceSwapError::Stream("sink already finished".to_string())),
        }
    }

    fn finish(&mut self) -> Result<(), FaceSwapError> {
        self.finished = true;
        // closing stdin lets the encoder drain and exit
        drop(self.stdin.take());

        let mut stderr_text = String::new();
        if let Some(mut stderr) = self.child.stderr.take() {
            let _ = stderr.read_to_string(&mut stderr_text);
        }
        let status = self
            .child
            .wait()
            .map_err(|e| FaceSwapError::Stream(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(FaceSwapError::Stream(format!(
                "encoder exited with {status}: {}",
                stderr_text.trim()
            )))
        }
    }
}

impl Drop for FfmpegFrameSink {
    fn drop(&mut self) {
        if !self.finished {
            drop(self.stdin.take());
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
