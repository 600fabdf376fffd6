//! Gym photo handling: type check, resize, write to the upload directory.

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use image::imageops::FilterType;
use uuid::Uuid;

use crate::forms::gym::PhotoUpload;

pub const TARGET_WIDTH: u32 = 800;

/// Largest resized image we are willing to allocate, in pixels (800 x 4000).
pub const MAX_OUTPUT_PIXELS: u64 = 3_200_000;

#[derive(Debug)]
pub enum PhotoError {
    /// Not an `image/*` upload, or an image type we cannot decode.
    UnsupportedType,
    Decode(String),
    Io(String),
}

impl std::fmt::Display for PhotoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoError::UnsupportedType => write!(f, "That filetype isn't allowed!"),
            PhotoError::Decode(msg) => write!(f, "Could not read that image: {msg}"),
            PhotoError::Io(msg) => write!(f, "Could not save photo: {msg}"),
        }
    }
}

/// Output format and file extension for an uploaded MIME type.
pub fn format_for(content_type: &str) -> Result<(ImageFormat, &'static str), PhotoError> {
    if !content_type.starts_with("image/") {
        return Err(PhotoError::UnsupportedType);
    }
    let format = ImageFormat::from_mime_type(content_type).ok_or(PhotoError::UnsupportedType)?;
    let extension = match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => return Err(PhotoError::UnsupportedType),
    };
    Ok((format, extension))
}

/// Height of a `width` x `height` image scaled to [`TARGET_WIDTH`], if the
/// result stays within [`MAX_OUTPUT_PIXELS`].
fn scaled_height(width: u32, height: u32) -> Result<u32, PhotoError> {
    let scaled = (u64::from(height) * u64::from(TARGET_WIDTH) / u64::from(width.max(1))).max(1);
    if scaled * u64::from(TARGET_WIDTH) > MAX_OUTPUT_PIXELS {
        return Err(PhotoError::Decode(format!(
            "a {width}x{height} image is too tall to resize"
        )));
    }
    u32::try_from(scaled).map_err(|_| PhotoError::Decode("image is too large".to_string()))
}

/// Decode, scale to [`TARGET_WIDTH`] keeping the aspect ratio, re-encode.
pub fn resize(data: &[u8], format: ImageFormat) -> Result<Vec<u8>, PhotoError> {
    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| PhotoError::Decode(e.to_string()))?;

    let new_height = scaled_height(img.width(), img.height())?;
    let resized = img.resize_exact(TARGET_WIDTH, new_height, FilterType::Triangle);

    // JPEG has no alpha channel.
    let resized = match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(|e| PhotoError::Decode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Resize the upload and store it under a fresh name. Returns the file name.
pub async fn save(upload: PhotoUpload, upload_dir: &Path) -> Result<String, PhotoError> {
    let (format, extension) = format_for(&upload.content_type)?;

    let encoded = tokio::task::spawn_blocking(move || resize(&upload.data, format))
        .await
        .map_err(|e| PhotoError::Io(format!("resize task failed: {e}")))??;

    let file_name = format!("{}.{extension}", Uuid::now_v7());

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| PhotoError::Io(e.to_string()))?;
    tokio::fs::write(upload_dir.join(&file_name), encoded)
        .await
        .map_err(|e| PhotoError::Io(e.to_string()))?;

    tracing::debug!("Stored photo {file_name}");
    Ok(file_name)
}

/// Delete a stored photo. Failures are logged, a missing file is ignored.
pub async fn remove(upload_dir: &Path, file_name: &str) {
    match tokio::fs::remove_file(upload_dir.join(file_name)).await {
        Ok(()) => tracing::debug!("Removed photo {file_name}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove photo {file_name}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn only_images_are_allowed() {
        assert!(matches!(
            format_for("application/pdf"),
            Err(PhotoError::UnsupportedType)
        ));
        assert!(matches!(
            format_for("image/svg+xml"),
            Err(PhotoError::UnsupportedType)
        ));
        assert_eq!(format_for("image/png").unwrap().1, "png");
        assert_eq!(format_for("image/jpeg").unwrap().1, "jpeg");
    }

    #[test]
    fn resize_keeps_aspect_ratio() {
        let out = resize(&png(1600, 1200), ImageFormat::Png).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (800, 600));
    }

    #[test]
    fn small_images_are_scaled_up_to_width() {
        let out = resize(&png(100, 50), ImageFormat::Png).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (800, 400));
    }

    #[test]
    fn tall_narrow_images_are_rejected_before_scaling() {
        assert!(matches!(
            resize(&png(1, 20000), ImageFormat::Png),
            Err(PhotoError::Decode(_))
        ));
        assert!(scaled_height(1, u32::MAX).is_err());
        assert_eq!(scaled_height(800, 4000).unwrap(), 4000);
        assert!(scaled_height(800, 4001).is_err());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            resize(b"definitely not a png", ImageFormat::Png),
            Err(PhotoError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn save_writes_file_into_upload_dir() {
        let dir = std::env::temp_dir().join(format!("gymfinder-photo-{}", Uuid::now_v7()));
        let upload = PhotoUpload {
            content_type: "image/png".to_string(),
            data: png(40, 20).into(),
        };

        let name = save(upload, &dir).await.unwrap();
        assert!(name.ends_with(".png"));
        assert!(dir.join(&name).exists());

        remove(&dir, &name).await;
        assert!(!dir.join(&name).exists());
        // Removing twice is quiet.
        remove(&dir, &name).await;

        let _ = std::fs::remove_dir_all(&dir);
    }
}
