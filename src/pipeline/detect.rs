use image::DynamicImage;

use crate::theme::Mode;

pub const DEFAULT_BRIGHTNESS_THRESHOLD: u8 = 128;

/// Result of wallpaper brightness analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    /// Mean grayscale intensity in `0.0..=255.0`.
    pub brightness: f64,
    pub mode: Mode,
}

/// Average the grayscale intensity of the image and pick light or dark.
pub fn analyze(image: &DynamicImage, threshold: u8) -> Analysis {
    let brightness = mean_brightness(image);
    Analysis {
        brightness,
        mode: detect_mode(brightness, threshold),
    }
}

/// Arithmetic mean over all pixels of the single-channel conversion.
/// An empty image counts as black.
pub fn mean_brightness(image: &DynamicImage) -> f64 {
    let rgb = image.to_rgb8();
    let count = u64::from(rgb.width()) * u64::from(rgb.height());
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = rgb.pixels().map(|p| u64::from(luma(p.0))).sum();
    sum as f64 / count as f64
}

/// ITU-R 601 luma in 16-bit fixed point, rounded.
fn luma([r, g, b]: [u8; 3]) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Dark strictly below the threshold; a mean equal to it is light.
pub fn detect_mode(brightness: f64, threshold: u8) -> Mode {
    if brightness < f64::from(threshold) {
        Mode::Dark
    } else {
        Mode::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn gray(values: [u8; 4]) -> DynamicImage {
        let img = GrayImage::from_fn(2, 2, |x, y| Luma([values[(y * 2 + x) as usize]]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn mostly_dark_image_is_dark() {
        let analysis = analyze(&gray([10, 10, 10, 250]), 128);
        assert!((analysis.brightness - 70.0).abs() < f64::EPSILON);
        assert_eq!(analysis.mode, Mode::Dark);
    }

    #[test]
    fn mean_equal_to_threshold_is_light() {
        let analysis = analyze(&gray([100, 156, 128, 128]), 128);
        assert_eq!(analysis.brightness, 128.0);
        assert_eq!(analysis.mode, Mode::Light);
    }

    #[test]
    fn threshold_is_configurable() {
        let img = gray([60, 60, 60, 60]);
        assert_eq!(analyze(&img, 50).mode, Mode::Light);
        assert_eq!(analyze(&img, 61).mode, Mode::Dark);
    }

    #[test]
    fn zero_threshold_is_always_light() {
        assert_eq!(analyze(&gray([0, 0, 0, 0]), 0).mode, Mode::Light);
    }

    #[test]
    fn white_rgb_image_is_light() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, image::Rgb([255, 255, 255])));
        let analysis = analyze(&img, 128);
        assert_eq!(analysis.brightness, 255.0);
        assert_eq!(analysis.mode, Mode::Light);
    }

    #[test]
    fn saturated_green_uses_601_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([0, 200, 0])));
        let analysis = analyze(&img, 128);
        assert_eq!(analysis.brightness, 117.0);
        assert_eq!(analysis.mode, Mode::Dark);
    }

    #[test]
    fn luma_matches_fixed_point_weights() {
        assert_eq!(luma([255, 0, 0]), 76);
        assert_eq!(luma([0, 0, 255]), 29);
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([77, 77, 77]), 77);
    }

    #[test]
    fn empty_image_is_dark() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert_eq!(analyze(&img, 128).mode, Mode::Dark);
    }

    #[test]
    fn analysis_is_deterministic() {
        let img = gray([1, 2, 3, 4]);
        assert_eq!(analyze(&img, 128), analyze(&img, 128));
    }
}
