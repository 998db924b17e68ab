use common::span_debug;
use fast_image_resize::{
    PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use schema::SegmentationMask;

/// Resize a label mask with nearest-neighbour sampling so no intermediate
/// label values appear at region edges.
pub fn resize_mask_nearest(
    mask: &SegmentationMask,
    width: u32,
    height: u32,
) -> anyhow::Result<SegmentationMask> {
    let _s = span_debug!("resize_mask_nearest");

    if width == 0 || height == 0 || mask.width() == 0 || mask.height() == 0 {
        anyhow::bail!(
            "Cannot resize mask {}x{} to {}x{}",
            mask.width(),
            mask.height(),
            width,
            height
        );
    }

    if mask.width() == width && mask.height() == height {
        return Ok(mask.clone());
    }

    let src = ImageRef::new(mask.width(), mask.height(), mask.as_raw(), PixelType::U8)?;
    let mut dst = Image::new(width, height, PixelType::U8);

    Resizer::new().resize(
        &src,
        &mut dst,
        &ResizeOptions::new().resize_alg(ResizeAlg::Nearest),
    )?;

    Ok(SegmentationMask::new(width, height, dst.buffer().to_vec())?)
}
