use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use crate::detector::FaceBox;
use crate::mask::SMOOTHING_SIGMA;

/// Copy out the exact sub-rectangle of `face_box` from `image`.
///
/// No padding and no bounds adjustment happen here — `face_box` must satisfy
/// the containment invariant for this image, which every box produced by a
/// [`crate::FaceDetector`] on the same image does.
pub fn extract_region(image: &RgbImage, face_box: FaceBox) -> RgbImage {
    imageops::crop_imm(image, face_box.x, face_box.y, face_box.width, face_box.height).to_image()
}

/// Alpha-blend `source` into `target` at `ratio`.
///
/// The source is resized (bilinear) to the target's dimensions and blurred
/// to knock down high-frequency mismatch artifacts, then each pixel becomes
/// `target·(1−ratio) + source·ratio`. ratio 0.0 reproduces the target
/// exactly; 1.0 fully replaces it with the blurred, resized source. No
/// illumination or skin-tone correction is attempted.
pub fn blend_regions(source: &RgbImage, target: &RgbImage, ratio: f32) -> RgbImage {
    let (width, height) = target.dimensions();
    let resized = imageops::resize(source, width, height, FilterType::Triangle);
    let blurred = imageops::blur(&resized, SMOOTHING_SIGMA);

    let mut blended = RgbImage::new(width, height);
    for (x, y, out) in blended.enumerate_pixels_mut() {
        let t = target.get_pixel(x, y).0;
        let s = blurred.get_pixel(x, y).0;
        for c in 0..3 {
            out.0[c] = (t[c] as f32 * (1.0 - ratio) + s[c] as f32 * ratio).round() as u8;
        }
    }
    blended
}

/// Paste `region` into a copy of `target` at `face_box`, weighted per pixel
/// by `mask` normalized to [0, 1]: `mask·region + (1−mask)·original`.
///
/// Pixels outside the box are never touched and the output always has the
/// target's dimensions. `mask` and `region` must both match the box extent.
pub fn composite_region(
    target: &RgbImage,
    face_box: FaceBox,
    region: &RgbImage,
    mask: &GrayImage,
) -> RgbImage {
    debug_assert_eq!(region.dimensions(), (face_box.width, face_box.height));
    debug_assert_eq!(mask.dimensions(), (face_box.width, face_box.height));

    let mut out = target.clone();
    for dy in 0..face_box.height {
        for dx in 0..face_box.width {
            let m = mask.get_pixel(dx, dy).0[0] as f32 / 255.0;
            let new = region.get_pixel(dx, dy).0;
            let px = out.get_pixel_mut(face_box.x + dx, face_box.y + dy);
            for c in 0..3 {
                px.0[c] = (new[c] as f32 * m + px.0[c] as f32 * (1.0 - m)).round() as u8;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        img
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    #[test]
    fn extract_copies_the_exact_rectangle() {
        let img = gradient(100, 80);
        let b = FaceBox {
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        };
        let region = extract_region(&img, b);
        assert_eq!(region.dimensions(), (30, 40));
        for dy in 0..40 {
            for dx in 0..30 {
                assert_eq!(region.get_pixel(dx, dy), img.get_pixel(10 + dx, 20 + dy));
            }
        }
    }

    #[test]
    fn blend_output_has_target_dimensions() {
        let source = gradient(50, 50);
        let target = gradient(80, 120);
        let blended = blend_regions(&source, &target, 0.8);
        assert_eq!(blended.dimensions(), (80, 120));
    }

    #[test]
    fn blend_ratio_zero_reproduces_target_exactly() {
        let source = solid(30, 30, [200, 10, 10]);
        let target = gradient(64, 64);
        let blended = blend_regions(&source, &target, 0.0);
        assert_eq!(blended.as_raw(), target.as_raw());
    }

    #[test]
    fn blend_ratio_one_discards_target() {
        // At ratio 1.0 the result is the blurred resized source; with a
        // uniform source the blur is a no-op away from borders.
        let source = solid(30, 30, [200, 10, 10]);
        let target = solid(60, 60, [0, 255, 0]);
        let blended = blend_regions(&source, &target, 1.0);
        assert_eq!(blended.get_pixel(30, 30), &Rgb([200, 10, 10]));
    }

    #[test]
    fn composite_leaves_pixels_outside_the_box_untouched() {
        let target = gradient(100, 100);
        let b = FaceBox {
            x: 20,
            y: 20,
            width: 40,
            height: 40,
        };
        let region = solid(40, 40, [255, 255, 255]);
        let mask = crate::mask::build_mask(40, 40);
        let out = composite_region(&target, b, &region, &mask);

        assert_eq!(out.dimensions(), target.dimensions());
        for (x, y, pixel) in out.enumerate_pixels() {
            let inside = (20..60).contains(&x) && (20..60).contains(&y);
            if !inside {
                assert_eq!(pixel, target.get_pixel(x, y), "pixel ({x},{y}) changed");
            }
        }
    }

    #[test]
    fn composite_with_opaque_mask_replaces_the_box() {
        let target = solid(50, 50, [0, 0, 0]);
        let b = FaceBox {
            x: 10,
            y: 10,
            width: 20,
            height: 20,
        };
        let region = solid(20, 20, [255, 0, 0]);
        let mask = GrayImage::from_pixel(20, 20, image::Luma([255]));
        let out = composite_region(&target, b, &region, &mask);
        assert_eq!(out.get_pixel(20, 20), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn composite_with_transparent_mask_is_identity() {
        let target = gradient(50, 50);
        let b = FaceBox {
            x: 10,
            y: 10,
            width: 20,
            height: 20,
        };
        let region = solid(20, 20, [255, 0, 0]);
        let mask = GrayImage::new(20, 20);
        let out = composite_region(&target, b, &region, &mask);
        assert_eq!(out.as_raw(), target.as_raw());
    }
}
