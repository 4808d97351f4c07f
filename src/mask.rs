use image::{imageops, GrayImage, Luma};
use imageproc::drawing::draw_filled_ellipse_mut;

/// Gaussian sigma used to soften mask edges and smooth blended faces,
/// the equivalent of a 15x15 kernel.
pub(crate) const SMOOTHING_SIGMA: f32 = 2.6;

/// Build a soft elliptical blend mask for a face region of the given size.
///
/// The mask is a filled ellipse centered at (width/2, height/2) with
/// semi-axes (width/3, height/2) — 255 inside, 0 outside — then
/// Gaussian-softened so opacity falls off smoothly at the boundary instead
/// of as a hard edge. Pure function of the dimensions.
pub fn build_mask(width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    draw_filled_ellipse_mut(
        &mut mask,
        ((width / 2) as i32, (height / 2) as i32),
        (width / 3) as i32,
        (height / 2) as i32,
        Luma([255u8]),
    );
    imageops::blur(&mask, SMOOTHING_SIGMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_dimensions_match_request() {
        let mask = build_mask(60, 80);
        assert_eq!(mask.dimensions(), (60, 80));
    }

    #[test]
    fn center_is_opaque_corners_are_transparent() {
        let mask = build_mask(90, 120);
        assert!(mask.get_pixel(45, 60).0[0] >= 250);
        assert!(mask.get_pixel(0, 0).0[0] <= 5);
        assert!(mask.get_pixel(89, 0).0[0] <= 5);
        assert!(mask.get_pixel(0, 119).0[0] <= 5);
        assert!(mask.get_pixel(89, 119).0[0] <= 5);
    }

    #[test]
    fn mask_is_deterministic() {
        let a = build_mask(47, 53);
        let b = build_mask(47, 53);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn tiny_regions_do_not_panic() {
        for (w, h) in [(1, 1), (2, 2), (3, 5), (5, 3)] {
            let mask = build_mask(w, h);
            assert_eq!(mask.dimensions(), (w, h));
        }
    }

    #[test]
    fn opacity_falls_off_horizontally() {
        // The ellipse's horizontal semi-axis is width/3, so a pixel just
        // inside the edge should be dimmer than the center after softening.
        let mask = build_mask(90, 120);
        let center = mask.get_pixel(45, 60).0[0];
        let edge = mask.get_pixel(45 + 29, 60).0[0];
        let outside = mask.get_pixel(45 + 40, 60).0[0];
        assert!(center >= edge);
        assert!(edge > outside);
    }
}
