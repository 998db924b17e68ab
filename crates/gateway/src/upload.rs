use crate::errors::AppError;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use image::{ImageFormat, RgbImage};

/// Multipart field that carries the image.
pub const FILE_FIELD: &str = "file";

const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "application/octet-stream"];

/// A decoded upload plus the metadata the client sent with it.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub image: RgbImage,
}

/// Pull the `file` field out of a multipart body and decode it.
///
/// The file is read chunk by chunk and rejected as soon as it grows past
/// `max_bytes`.
pub async fn read_image(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<UploadedImage, AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(ToOwned::to_owned);
        let content_type = field.content_type().map(ToOwned::to_owned);

        if let Some(declared) = content_type.as_deref() {
            check_content_type(declared)?;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        let image = decode_image(&bytes)?;

        tracing::debug!(
            filename = filename.as_deref().unwrap_or(""),
            content_type = content_type.as_deref().unwrap_or(""),
            bytes = bytes.len(),
            width = image.width(),
            height = image.height(),
            "Upload decoded"
        );

        return Ok(UploadedImage {
            filename,
            content_type,
            image,
        });
    }

    Err(AppError::InvalidInput(format!(
        "Missing `{}` field in multipart body",
        FILE_FIELD
    )))
}

/// The body limit surfaces as a multipart error; keep it a size rejection.
fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_bytes)
    } else {
        AppError::InvalidInput(format!("Failed to read upload: {}", err.body_text()))
    }
}

/// Accept only declared types that can hold PNG or JPEG data. Parameters such
/// as `; charset=...` are ignored.
pub fn check_content_type(declared: &str) -> Result<(), AppError> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Unsupported content type `{}`. Upload a PNG or JPEG image.",
            declared
        )))
    }
}

/// Decode PNG or JPEG bytes, going by their signature rather than any
/// declared type.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, AppError> {
    if bytes.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| AppError::InvalidInput("Invalid image file".to_string()))?;

    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported image format {:?}. Upload a PNG or JPEG image.",
            format
        )));
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AppError::InvalidInput(format!("Invalid image file: {}", e)))?
        .to_rgb8();

    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::InvalidInput("Image has no pixels".to_string()));
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let image = RgbImage::from_pixel(8, 6, Rgb([200, 10, 10]));
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_png_and_jpeg_decode() {
        let png = decode_image(&encode(ImageFormat::Png)).unwrap();
        assert_eq!(png.dimensions(), (8, 6));
        assert_eq!(png.get_pixel(0, 0), &Rgb([200, 10, 10]));

        let jpeg = decode_image(&encode(ImageFormat::Jpeg)).unwrap();
        assert_eq!(jpeg.dimensions(), (8, 6));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(decode_image(&[]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let png = encode(ImageFormat::Png);
        let truncated = &png[..png.len() / 2];
        assert!(matches!(
            decode_image(truncated),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_other_formats_rejected() {
        // GIF signature: recognised, but not accepted
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        assert!(matches!(decode_image(gif), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_content_type_check() {
        assert!(check_content_type("image/png").is_ok());
        assert!(check_content_type("IMAGE/JPEG").is_ok());
        assert!(check_content_type("application/octet-stream").is_ok());
        assert!(check_content_type("image/png; charset=binary").is_ok());
        assert!(check_content_type("text/plain").is_err());
        assert!(check_content_type("image/gif").is_err());
    }
}
