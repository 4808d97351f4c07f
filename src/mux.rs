//! Thin wrappers over the external muxer (ffmpeg) for pairing video with
//! generated speech audio. No container or codec logic lives here — each
//! helper is a single muxer invocation.

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::config::SwapConfig;
use crate::error::FaceSwapError;

/// Frame rate used when expanding a still image into a talking-head video.
const STILL_VIDEO_FPS: u32 = 24;

fn run_muxer(cmd: &mut Command) -> Result<(), FaceSwapError> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| FaceSwapError::Mux(e.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(FaceSwapError::Mux(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Replace the audio track of `video` with `audio`, writing to `output`.
///
/// Audio shorter than the video is looped to cover its full length; audio
/// longer than the video is truncated at the video's end. The video stream
/// is copied, not re-encoded. This is the whole of "lip sync" here — no
/// mouth-movement synthesis takes place.
pub fn replace_audio(
    config: &SwapConfig,
    video: &Path,
    audio: &Path,
    output: &Path,
) -> Result<(), FaceSwapError> {
    debug!(
        "muxing audio {} onto {}",
        audio.display(),
        video.display()
    );
    run_muxer(
        Command::new(&config.ffmpeg_bin)
            .args(["-v", "error", "-y"])
            .arg("-i")
            .arg(video)
            .args(["-stream_loop", "-1"])
            .arg("-i")
            .arg(audio)
            .args(["-map", "0:v", "-map", "1:a"])
            .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
            .arg(output),
    )
}

/// Build a talking-head video: hold `image` on screen for the full duration
/// of `audio`, at a fixed frame rate.
pub fn still_to_video(
    config: &SwapConfig,
    image: &Path,
    audio: &Path,
    output: &Path,
) -> Result<(), FaceSwapError> {
    debug!(
        "building talking head from {} and {}",
        image.display(),
        audio.display()
    );
    run_muxer(
        Command::new(&config.ffmpeg_bin)
            .args(["-v", "error", "-y"])
            .args(["-loop", "1"])
            .arg("-i")
            .arg(image)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "libx264", "-tune", "stillimage"])
            .args(["-c:a", "aac", "-pix_fmt", "yuv420p"])
            .args(["-r", &STILL_VIDEO_FPS.to_string()])
            .arg("-shortest")
            .arg(output),
    )
}

/// Demux the audio track of `video` into `output` (format implied by the
/// output extension).
pub fn extract_audio(
    config: &SwapConfig,
    video: &Path,
    output: &Path,
) -> Result<(), FaceSwapError> {
    run_muxer(
        Command::new(&config.ffmpeg_bin)
            .args(["-v", "error", "-y"])
            .arg("-i")
            .arg(video)
            .arg("-vn")
            .arg(output),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bogus_config() -> SwapConfig {
        SwapConfig {
            ffmpeg_bin: "ffmpeg-that-does-not-exist".to_string(),
            ..SwapConfig::default()
        }
    }

    #[test]
    fn replace_audio_with_missing_muxer_fails() {
        let err = replace_audio(
            &bogus_config(),
            Path::new("v.mp4"),
            Path::new("a.wav"),
            Path::new("out.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, FaceSwapError::Mux(_)));
    }

    #[test]
    fn still_to_video_with_missing_muxer_fails() {
        let err = still_to_video(
            &bogus_config(),
            Path::new("face.png"),
            Path::new("a.wav"),
            Path::new("out.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, FaceSwapError::Mux(_)));
    }

    #[test]
    fn extract_audio_with_missing_muxer_fails() {
        let err = extract_audio(&bogus_config(), Path::new("v.mp4"), Path::new("a.aac"))
            .unwrap_err();
        assert!(matches!(err, FaceSwapError::Mux(_)));
    }
}
