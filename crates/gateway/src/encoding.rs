use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// PNG-encode `image` and wrap it in standard base64 for a JSON payload.
pub fn encode_png_base64(image: &RgbImage) -> anyhow::Result<String> {
    let mut png_bytes = Cursor::new(Vec::new());
    image.write_to(&mut png_bytes, ImageFormat::Png)?;

    Ok(STANDARD.encode(png_bytes.into_inner()))
}
