//! Face-region compositing: detect faces with a classical cascade, build a
//! soft elliptical mask, and alpha-blend a source face onto a target image —
//! or frame-by-frame across a video.
//!
//! # Example
//!
//! ```no_run
//! use faceswap::{FaceSwapper, SwapConfig};
//!
//! let config = SwapConfig {
//!     model_path: Some("models/seeta_fd_frontal_v1.0.bin".into()),
//!     ..SwapConfig::default()
//! };
//! let swapper = FaceSwapper::new(&config);
//!
//! let source = image::open("face.jpg").unwrap().to_rgb8();
//! let target = image::open("scene.jpg").unwrap().to_rgb8();
//! let result = swapper.swap_face(&source, &target, 0.8).unwrap();
//! result.save("swapped.png").unwrap();
//! ```
#![warn(missing_docs)]

mod blend;
mod cascade;
mod config;
mod detector;
mod error;
mod ffmpeg;
mod mask;
mod mux;
mod video;

use std::path::Path;

use image::{imageops, RgbImage};
use log::{debug, info};

/// Region extraction, blending, and mask-weighted compositing primitives.
pub use blend::{blend_regions, composite_region, extract_region};
/// Built-in classical cascade detector backend.
pub use cascade::CascadeDetector;
/// Explicit configuration and startup capability probing.
pub use config::{Capabilities, SwapConfig};
/// Face detection trait and bounding-box type.
pub use detector::{FaceBox, FaceDetector};
/// Error type returned by faceswap operations.
pub use error::FaceSwapError;
/// ffmpeg-backed video stream implementations.
pub use ffmpeg::{probe, FfmpegFrameSink, FfmpegFrameSource, StreamInfo};
/// Soft elliptical mask builder.
pub use mask::build_mask;
/// External-muxer helpers for audio replacement and talking-head videos.
pub use mux::{extract_audio, replace_audio, still_to_video};
/// Video stream traits and the per-run frame report.
pub use video::{FrameSink, FrameSource, SwapReport};

/// Progress is logged once per this many processed frames.
const PROGRESS_INTERVAL: u64 = 30;

/// Orchestrates face swapping over single images and video streams.
///
/// Construction loads the cascade model once; a missing model degrades to a
/// swapper whose detections are always empty, which makes every swap a
/// pass-through rather than an error.
pub struct FaceSwapper {
    detector: Box<dyn FaceDetector>,
    config: SwapConfig,
}

impl FaceSwapper {
    /// Build a swapper from explicit configuration.
    pub fn new(config: &SwapConfig) -> Self {
        let detector: Box<dyn FaceDetector> = match &config.model_path {
            Some(path) => Box::new(CascadeDetector::new(path)),
            None => {
                log::warn!("no cascade model configured, face detection disabled");
                Box::new(CascadeDetector::disabled())
            }
        };
        Self {
            detector,
            config: config.clone(),
        }
    }

    /// Replace the detection backend with a custom implementation.
    pub fn detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Detect faces in an image, in the backend's scan order.
    pub fn detect_faces(&self, image: &RgbImage) -> Vec<FaceBox> {
        let gray = imageops::grayscale(image);
        self.detector.detect(&gray)
    }

    /// The swap core. `None` means no face in one of the inputs: the caller
    /// decides whether that is a pass-through or a skipped frame.
    fn swap_into(&self, source: &RgbImage, target: &RgbImage, ratio: f32) -> Option<RgbImage> {
        let source_faces = self.detect_faces(source);
        let target_faces = self.detect_faces(target);

        // First box from each image in scan order — deliberately no
        // best-face selection when multiple faces are present.
        let (&source_box, &target_box) = match (source_faces.first(), target_faces.first()) {
            (Some(s), Some(t)) => (s, t),
            _ => {
                debug!("no face detected in source and/or target, passing target through");
                return None;
            }
        };

        let source_region = extract_region(source, source_box);
        let target_region = extract_region(target, target_box);
        let blended = blend_regions(&source_region, &target_region, ratio);
        let mask = build_mask(target_box.width, target_box.height);
        Some(composite_region(target, target_box, &blended, &mask))
    }

    /// Swap the first detected face of `source` onto the first detected face
    /// of `target` at the given blend ratio.
    ///
    /// When either image has no detectable face the result is an unmodified
    /// copy of the target — a silent no-op, not an error. Compositing only
    /// ever rewrites the target's face rectangle; the output always has the
    /// target's dimensions and neither input is mutated.
    pub fn swap_face(
        &self,
        source: &RgbImage,
        target: &RgbImage,
        ratio: f32,
    ) -> Result<RgbImage, FaceSwapError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(FaceSwapError::InvalidBlendRatio(ratio));
        }
        Ok(self
            .swap_into(source, target, ratio)
            .unwrap_or_else(|| target.clone()))
    }

    /// Run the per-frame swap over an arbitrary source/sink pair.
    ///
    /// Each frame is processed independently with `reference` re-detected
    /// fresh — no tracking or caching across frames. Frames without a
    /// detection pass through unchanged; any read or write error aborts the
    /// whole stream.
    pub fn swap_frames(
        &self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        reference: &RgbImage,
        ratio: f32,
    ) -> Result<SwapReport, FaceSwapError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(FaceSwapError::InvalidBlendRatio(ratio));
        }

        let mut report = SwapReport {
            frames: 0,
            swapped: 0,
        };
        while let Some(frame) = source.next_frame()? {
            match self.swap_into(reference, &frame, ratio) {
                Some(swapped) => {
                    sink.write_frame(&swapped)?;
                    report.swapped += 1;
                }
                None => sink.write_frame(&frame)?,
            }
            report.frames += 1;
            if report.frames % PROGRESS_INTERVAL == 0 {
                info!("processed {} frames...", report.frames);
            }
        }
        sink.finish()?;

        info!(
            "face swap complete: {} of {} frames swapped",
            report.swapped, report.frames
        );
        Ok(report)
    }

    /// Swap the reference face onto every frame of the video at `input`,
    /// writing the result to `output` at the source's frame rate and size.
    ///
    /// The reference image is decoded and the input stream opened before the
    /// output writer is created, so a bad reference or unopenable input never
    /// leaves an output file behind. A run where every frame silently no-ops
    /// still succeeds; the returned [`SwapReport`] says how many frames were
    /// actually composited.
    pub fn swap_video(
        &self,
        input: &Path,
        reference: &Path,
        output: &Path,
        ratio: f32,
    ) -> Result<SwapReport, FaceSwapError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(FaceSwapError::InvalidBlendRatio(ratio));
        }

        let reference = image::open(reference)
            .map_err(|e| FaceSwapError::Decode(e.to_string()))?
            .to_rgb8();

        let mut source =
            FfmpegFrameSource::open(&self.config.ffmpeg_bin, &self.config.ffprobe_bin, input)?;
        let (width, height) = source.dimensions();
        let info = StreamInfo {
            width,
            height,
            frame_rate: source.frame_rate(),
        };
        let mut sink = FfmpegFrameSink::create(&self.config.ffmpeg_bin, output, info)?;

        self.swap_frames(&mut source, &mut sink, &reference, ratio)
    }
}
