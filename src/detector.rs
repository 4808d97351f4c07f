use image::GrayImage;

/// Bounding box of a detected face within an image.
///
/// Always fully contained in the image it was detected on:
/// `x + width <= image width` and `y + height <= image height`, with both
/// extents nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width of the bounding box (pixels).
    pub width: u32,
    /// Height of the bounding box (pixels).
    pub height: u32,
}

impl FaceBox {
    /// Clamp raw detector output to the image bounds.
    ///
    /// Cascade backends can report boxes that overhang the image edges near
    /// the border of the search pyramid. The containment invariant is
    /// established here: the box is intersected with the image rectangle,
    /// and `None` is returned when nothing remains.
    pub(crate) fn clamped(
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    ) -> Option<FaceBox> {
        let x0 = (x as i64).clamp(0, image_width as i64);
        let y0 = (y as i64).clamp(0, image_height as i64);
        let x1 = (x as i64 + width as i64).clamp(0, image_width as i64);
        let y1 = (y as i64 + height as i64).clamp(0, image_height as i64);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(FaceBox {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom detector (ONNX, dlib, etc.) and
/// pass it to [`crate::FaceSwapper::detector`]. Results are returned in the
/// backend's own scan order — no ordering by size or confidence is implied.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a grayscale image.
    ///
    /// Every returned box must satisfy the containment invariant documented
    /// on [`FaceBox`].
    fn detect(&self, gray: &GrayImage) -> Vec<FaceBox>;
}
