use image::{Rgb, RgbImage};
use preprocess::resize_mask_nearest;
use schema::SegmentationMask;

pub const DEFAULT_OVERLAY_ALPHA: f32 = 0.5;
pub const DEFAULT_OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Lighter tint used when the overlay backs an off-road check.
pub const VIOLATION_OVERLAY_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Weight of the colour layer in the blend, in `[0, 1]`.
    pub alpha: f32,
    pub color: Rgb<u8>,
}

impl OverlayStyle {
    /// Same colour, blended at [`VIOLATION_OVERLAY_ALPHA`].
    pub fn for_violations(&self) -> Self {
        Self {
            alpha: VIOLATION_OVERLAY_ALPHA,
            ..*self
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_OVERLAY_ALPHA,
            color: DEFAULT_OVERLAY_COLOR,
        }
    }
}

/// Blend a colour layer over `image`: `style.color` on road pixels, black
/// elsewhere, `out = image * (1 - alpha) + layer * alpha`.
///
/// The whole frame is blended, so non-road pixels are darkened by the same
/// factor. The mask is resized (nearest-neighbour) to the image first.
pub fn apply_mask_to_image(
    image: &RgbImage,
    mask: &SegmentationMask,
    style: &OverlayStyle,
) -> anyhow::Result<RgbImage> {
    if !(0.0..=1.0).contains(&style.alpha) {
        anyhow::bail!("Overlay alpha must be within [0, 1], got {}", style.alpha);
    }

    let mask = resize_mask_nearest(mask, image.width(), image.height())?;

    let alpha = style.alpha;
    let black = Rgb([0u8, 0, 0]);
    let mut out = image.clone();

    for ((_, _, pixel), &label) in out.enumerate_pixels_mut().zip(mask.as_raw()) {
        let layer = if label == SegmentationMask::ROAD {
            style.color
        } else {
            black
        };
        for (channel, &tint) in pixel.0.iter_mut().zip(layer.0.iter()) {
            let blended = *channel as f32 * (1.0 - alpha) + tint as f32 * alpha;
            *channel = blended.round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_road_mask() -> SegmentationMask {
        // Left column road, right column not
        SegmentationMask::new(2, 2, vec![1, 0, 1, 0]).unwrap()
    }

    #[test]
    fn test_road_pixels_tinted() {
        let image = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));

        let out = apply_mask_to_image(&image, &half_road_mask(), &OverlayStyle::default()).unwrap();

        // 100 * 0.5 + 255 * 0.5 = 177.5, rounds to 178
        assert_eq!(out.get_pixel(0, 0), &Rgb([50, 178, 50]));
        assert_eq!(out.get_pixel(0, 1), &Rgb([50, 178, 50]));
    }

    #[test]
    fn test_non_road_pixels_darkened() {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));

        let out = apply_mask_to_image(&image, &half_road_mask(), &OverlayStyle::default()).unwrap();

        assert_eq!(out.get_pixel(1, 0), &Rgb([5, 10, 15]));
        assert_eq!(out.get_pixel(1, 1), &Rgb([5, 10, 15]));
    }

    #[test]
    fn test_alpha_extremes() {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));

        let style = OverlayStyle {
            alpha: 0.0,
            ..Default::default()
        };
        assert_eq!(
            apply_mask_to_image(&image, &half_road_mask(), &style).unwrap(),
            image
        );

        let style = OverlayStyle {
            alpha: 1.0,
            color: Rgb([255, 0, 0]),
        };
        let out = apply_mask_to_image(&image, &half_road_mask(), &style).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_mask_resized_to_image() {
        let image = RgbImage::from_pixel(40, 20, Rgb([100, 100, 100]));

        let out = apply_mask_to_image(&image, &half_road_mask(), &OverlayStyle::default()).unwrap();

        assert_eq!(out.dimensions(), (40, 20));
        assert_eq!(out.get_pixel(0, 0), &Rgb([50, 178, 50]));
        assert_eq!(out.get_pixel(39, 19), &Rgb([50, 50, 50]));
    }

    #[test]
    fn test_violation_style_keeps_colour() {
        let style = OverlayStyle {
            alpha: 0.8,
            color: Rgb([255, 0, 0]),
        };
        let violations = style.for_violations();
        assert_eq!(violations.alpha, VIOLATION_OVERLAY_ALPHA);
        assert_eq!(violations.color, Rgb([255, 0, 0]));
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        let image = RgbImage::new(2, 2);
        let style = OverlayStyle {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(apply_mask_to_image(&image, &half_road_mask(), &style).is_err());
    }
}
