//! Dimension math and resampling

use image::DynamicImage;
use tracing::debug;

/// Compute target dimensions for a uniform scale factor.
///
/// Both axes truncate: `floor(source * scale)`, never rounded. A result of
/// zero on either axis is reported as-is; the caller decides whether that
/// is an error (the pipeline treats it as a per-task failure).
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let target_width = (f64::from(width) * scale).floor() as u32;
    let target_height = (f64::from(height) * scale).floor() as u32;
    (target_width, target_height)
}

/// Resample an image to exactly the given dimensions.
///
/// Uses Lanczos3, which satisfies the "at least bilinear" quality bar with
/// margin. `resize_exact` is deliberate: the target dimensions were already
/// computed by [`scaled_dimensions`] and must not be re-derived from the
/// aspect ratio.
pub fn resample(image: &DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
    debug!(
        "Resampling {}x{} -> {}x{}",
        image.width(),
        image.height(),
        target_width,
        target_height
    );

    image.resize_exact(target_width, target_height, image::imageops::FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 255) as u8;
            Rgb([intensity, intensity, intensity])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_scaled_dimensions_upscale() {
        assert_eq!(scaled_dimensions(100, 50, 2.0), (200, 100));
        assert_eq!(scaled_dimensions(40, 40, 2.0), (80, 80));
    }

    #[test]
    fn test_scaled_dimensions_truncate_not_round() {
        // 5 * 0.5 = 2.5 truncates to 2, and 9 * 0.9 = 8.1 truncates to 8
        assert_eq!(scaled_dimensions(5, 5, 0.5), (2, 2));
        assert_eq!(scaled_dimensions(9, 9, 0.9), (8, 8));
        // 3 * 0.7 = 2.1 -> 2 even though rounding would give 2 as well;
        // 7 * 0.7 = 4.9 -> 4 is where truncation and rounding diverge
        assert_eq!(scaled_dimensions(7, 7, 0.7), (4, 4));
    }

    #[test]
    fn test_scaled_dimensions_degenerate() {
        assert_eq!(scaled_dimensions(1, 1, 0.1), (0, 0));
        assert_eq!(scaled_dimensions(100, 1, 0.5), (50, 0));
    }

    #[test]
    fn test_scaled_dimensions_identity() {
        assert_eq!(scaled_dimensions(640, 480, 1.0), (640, 480));
    }

    #[test]
    fn test_resample_exact_dimensions() {
        let image = create_test_image(100, 50);

        let resized = resample(&image, 200, 100);
        assert_eq!(resized.width(), 200);
        assert_eq!(resized.height(), 100);

        let shrunk = resample(&image, 33, 17);
        assert_eq!(shrunk.width(), 33);
        assert_eq!(shrunk.height(), 17);
    }

    #[test]
    fn test_resample_does_not_preserve_aspect_ratio_for_exact_targets() {
        // Truncation can skew the ratio slightly; the resampler must honor
        // the requested dimensions rather than re-fit them.
        let image = create_test_image(101, 51);
        let resized = resample(&image, 50, 25);
        assert_eq!((resized.width(), resized.height()), (50, 25));
    }
}
