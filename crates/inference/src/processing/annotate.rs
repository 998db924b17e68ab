use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use schema::Detection;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 250, 0]);

/// Copy of `image` with a one-pixel outline around every detection.
///
/// Boxes are clipped to the frame; malformed detections are not drawn.
#[tracing::instrument(skip_all, fields(detections = detections.len()))]
pub fn annotate_detections(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut out = image.clone();
    let (width, height) = out.dimensions();
    if width == 0 || height == 0 {
        return out;
    }

    for detection in detections.iter().filter(|d| d.is_well_formed()) {
        let b = detection.bbox.clipped(width, height);
        // Corners on the far edge land on the last pixel row/column
        let x1 = (b.x1 as u32).min(width - 1);
        let y1 = (b.y1 as u32).min(height - 1);
        let x2 = (b.x2 as u32).min(width - 1);
        let y2 = (b.y2 as u32).min(height - 1);

        let rect = Rect::at(x1 as i32, y1 as i32).of_size(x2 - x1 + 1, y2 - y1 + 1);
        draw_hollow_rect_mut(&mut out, rect, BOX_COLOR);
    }

    out
}
