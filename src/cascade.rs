use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::GrayImage;
use log::{debug, warn};

use crate::detector::{FaceBox, FaceDetector};

/// Minimum detectable face size in pixels, per side.
const MIN_FACE_SIZE: u32 = 30;

/// Detector score threshold for a window to count as a face.
const SCORE_THRESH: f64 = 2.0;

/// Pyramid scale factor between search scales (0.8 ≈ a 1.25x scale step).
const PYRAMID_SCALE_FACTOR: f32 = 0.8;

/// Sliding-window step in pixels, both axes.
const SLIDE_WINDOW_STEP: u32 = 4;

/// Classical cascade face detector backed by the `rustface` crate
/// (SeetaFace funnel cascade).
///
/// The model is read from disk once, at construction. A missing or
/// unreadable model does not fail construction: the condition is logged
/// once and the detector degrades to reporting zero faces on every call,
/// so "no model" and "no face found" look identical to callers.
pub struct CascadeDetector {
    model: Option<rustface::Model>,
}

impl CascadeDetector {
    /// Load the cascade model from `path`.
    pub fn new(path: &Path) -> Self {
        let model = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|f| rustface::read_model(BufReader::new(f)).map_err(|e| e.to_string()));

        match model {
            Ok(model) => Self { model: Some(model) },
            Err(reason) => {
                warn!(
                    "cascade model {} unavailable, face detection disabled: {reason}",
                    path.display()
                );
                Self { model: None }
            }
        }
    }

    /// A detector with no model loaded; every call reports zero faces.
    pub fn disabled() -> Self {
        Self { model: None }
    }
}

impl FaceDetector for CascadeDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<FaceBox> {
        let Some(model) = &self.model else {
            return Vec::new();
        };

        // rustface's detect requires &mut, so a fresh detector is built from
        // the shared model on each call, keeping this usable through &self.
        let mut detector = rustface::create_detector_with_model(model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let (width, height) = gray.dimensions();
        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        debug!("cascade found {} candidate face(s) in {width}x{height} image", faces.len());

        faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                FaceBox::clamped(bbox.x(), bbox.y(), bbox.width(), bbox.height(), width, height)
            })
            .collect()
    }
}
