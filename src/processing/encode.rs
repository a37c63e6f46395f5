//! JPEG serialization and output writing

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

use crate::error::{BatchScaleError, Result};

/// Serialize a pixel buffer as JPEG and write it to `dest_path`.
///
/// An existing file at the destination is overwritten. Quality stays at the
/// encoder default. Write errors (creating or filling the file) and encode
/// errors (serializing the buffer) are reported separately so the run
/// summary can tell a full disk from a broken buffer.
pub fn write_jpeg(image: &DynamicImage, dest_path: &Path) -> Result<()> {
    debug!("Writing JPEG: {:?}", dest_path);

    let file = File::create(dest_path)
        .map_err(|e| BatchScaleError::write_failed(dest_path, e))?;
    let mut writer = BufWriter::new(file);

    // JPEG has no alpha channel; flatten before encoding so RGBA sources
    // (PNG inputs) don't fail in the encoder.
    let flattened;
    let image = if image.color().has_alpha() {
        flattened = DynamicImage::ImageRgb8(image.to_rgb8());
        &flattened
    } else {
        image
    };

    let encoder = JpegEncoder::new(&mut writer);
    image.write_with_encoder(encoder).map_err(|e| match e {
        image::ImageError::IoError(io) => BatchScaleError::write_failed(dest_path, io),
        other => BatchScaleError::encode_failed(dest_path, other),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use tempfile::TempDir;

    fn rgb_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn rgba_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 128, 200])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_write_jpeg_roundtrip() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.jpg");

        write_jpeg(&rgb_image(32, 16), &dest).unwrap();

        let reloaded = image::open(&dest).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (32, 16));
    }

    #[test]
    fn test_write_jpeg_flattens_alpha() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("alpha.jpg");

        write_jpeg(&rgba_image(8, 8), &dest).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_write_jpeg_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.jpg");

        write_jpeg(&rgb_image(10, 10), &dest).unwrap();
        write_jpeg(&rgb_image(20, 20), &dest).unwrap();

        let reloaded = image::open(&dest).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (20, 20));
    }

    #[test]
    fn test_write_jpeg_missing_parent_is_write_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing").join("out.jpg");

        let err = write_jpeg(&rgb_image(4, 4), &dest).unwrap_err();
        assert!(matches!(err, BatchScaleError::WriteFailed { .. }));
    }
}
