use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Process-wide configuration, built once at startup and passed to
/// [`crate::FaceSwapper::new`].
///
/// Nothing in this crate reads environment variables or other ambient
/// state; every external dependency is named here explicitly.
#[derive(Debug, Clone)]
pub struct SwapConfig {
    /// Path to the cascade detector model. `None` disables face detection:
    /// the swapper still works, but every swap is a pass-through.
    pub model_path: Option<PathBuf>,

    /// Name or path of the ffmpeg binary used for video decode/encode/mux.
    pub ffmpeg_bin: String,

    /// Name or path of the ffprobe binary used to inspect video streams.
    pub ffprobe_bin: String,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}

/// Which optional features are usable with a given configuration.
///
/// Probed once at startup and handed to whatever layer decides which
/// operations to offer, instead of each call site testing availability on
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The cascade model file exists and can plausibly be loaded.
    pub face_detection: bool,

    /// Both ffmpeg and ffprobe respond, so video swap and muxing can run.
    pub video: bool,
}

impl Capabilities {
    /// Probe feature availability for `config`.
    pub fn probe(config: &SwapConfig) -> Self {
        let face_detection = config
            .model_path
            .as_deref()
            .map(|p| p.is_file())
            .unwrap_or(false);
        let video = binary_responds(&config.ffmpeg_bin) && binary_responds(&config.ffprobe_bin);
        Self {
            face_detection,
            video,
        }
    }
}

fn binary_responds(bin: &str) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
