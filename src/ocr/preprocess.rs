//! Page image cleanup before recognition.
//!
//! Contrast and sharpness follow the usual enhancement model: blend the image
//! away from a "degenerate" version of itself by a factor, where 1.0 is the
//! identity. Contrast degenerates to flat grey at the mean luminance;
//! sharpness degenerates to a smoothed copy. A median filter then removes
//! speckle noise.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::filter::median_filter;

use super::backend::OcrConfig;

/// Preprocessing factors, taken from [`OcrConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessor {
    pub contrast: f32,
    pub sharpness: f32,
    pub median_radius: u32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_config(&OcrConfig::default())
    }
}

impl Preprocessor {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            contrast: config.contrast,
            sharpness: config.sharpness,
            median_radius: config.median_radius,
        }
    }

    /// Apply contrast, sharpness and median filtering in that order.
    pub fn apply(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let rgb = enhance_contrast(&rgb, self.contrast);
        let rgb = enhance_sharpness(&rgb, self.sharpness);
        if self.median_radius == 0 {
            rgb
        } else {
            median_filter(&rgb, self.median_radius, self.median_radius)
        }
    }
}

fn blend_channel(degenerate: u8, original: u8, factor: f32) -> u8 {
    let d = degenerate as f32;
    let v = d + factor * (original as f32 - d);
    // clip, then truncate toward zero
    v.clamp(0.0, 255.0) as u8
}

fn blend(degenerate: &Rgb<u8>, original: &Rgb<u8>, factor: f32) -> Rgb<u8> {
    Rgb([
        blend_channel(degenerate[0], original[0], factor),
        blend_channel(degenerate[1], original[1], factor),
        blend_channel(degenerate[2], original[2], factor),
    ])
}

/// ITU-R 601-2 luma, as used for greyscale conversion.
fn luma(p: &Rgb<u8>) -> f32 {
    (p[0] as f32 * 299.0 + p[1] as f32 * 587.0 + p[2] as f32 * 114.0) / 1000.0
}

/// Scale distance from mean luminance by `factor`.
pub fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixels = (image.width() as u64 * image.height() as u64).max(1);
    let sum: f64 = image.pixels().map(|p| luma(p).trunc() as f64).sum();
    let mean = (sum / pixels as f64 + 0.5).floor().clamp(0.0, 255.0) as u8;
    let grey = Rgb([mean, mean, mean]);

    let mut out = image.clone();
    for p in out.pixels_mut() {
        *p = blend(&grey, p, factor);
    }
    out
}

/// 3x3 smoothing kernel (center weight 5, total 13); border pixels are kept.
fn smooth(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();
    let mut out = image.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let p = image.get_pixel(x + dx - 1, y + dy - 1);
                    for c in 0..3 {
                        acc[c] += p[c] as u32 * weight;
                    }
                }
            }
            out.put_pixel(
                x,
                y,
                Rgb([
                    ((acc[0] as f32) / 13.0).round() as u8,
                    ((acc[1] as f32) / 13.0).round() as u8,
                    ((acc[2] as f32) / 13.0).round() as u8,
                ]),
            );
        }
    }
    out
}

/// Scale distance from a smoothed copy by `factor`.
pub fn enhance_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = smooth(image);
    let mut out = image.clone();
    for (x, y, p) in out.enumerate_pixels_mut() {
        *p = blend(smoothed.get_pixel(x, y), p, factor);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_truncates_fractional_levels() {
        // 100 + 1.5 * (101 - 100) = 101.5
        assert_eq!(blend_channel(100, 101, 1.5), 101);
        // 100 + 1.5 * (99 - 100) = 98.5
        assert_eq!(blend_channel(100, 99, 1.5), 98);
        assert_eq!(blend_channel(10, 0, 3.0), 0);
        assert_eq!(blend_channel(200, 255, 3.0), 255);
    }

    #[test]
    fn test_contrast_leaves_flat_image_unchanged() {
        let img = RgbImage::from_pixel(8, 8, Rgb([120, 120, 120]));
        let out = enhance_contrast(&img, 1.5);
        assert!(out.pixels().all(|p| *p == Rgb([120, 120, 120])));
    }

    #[test]
    fn test_contrast_pushes_values_apart() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = enhance_contrast(&img, 1.5);
        // mean luminance 150: 150 + 1.5 * (100 - 150) = 75, 150 + 1.5 * 50 = 225
        assert_eq!(*out.get_pixel(0, 0), Rgb([75, 75, 75]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([225, 225, 225]));
    }

    #[test]
    fn test_contrast_clamps() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        let out = enhance_contrast(&img, 3.0);
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_sharpness_identity_factor() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([10, 10, 10]));
        img.put_pixel(2, 2, Rgb([200, 200, 200]));
        let out = enhance_sharpness(&img, 1.0);
        assert_eq!(out, img);
    }

    #[test]
    fn test_sharpness_amplifies_edges() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        img.put_pixel(2, 2, Rgb([130, 130, 130]));
        let out = enhance_sharpness(&img, 2.0);
        // smoothed center = 130 * 5 / 13 = 50; 50 + 2 * (130 - 50) = 210
        assert_eq!(*out.get_pixel(2, 2), Rgb([210, 210, 210]));
        // border untouched by smoothing, so unchanged
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_median_removes_speckle() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([255, 255, 255]));
        img.put_pixel(2, 2, Rgb([0, 0, 0]));
        let pre = Preprocessor {
            contrast: 1.0,
            sharpness: 1.0,
            median_radius: 1,
        };
        let out = pre.apply(&DynamicImage::ImageRgb8(img));
        assert_eq!(*out.get_pixel(2, 2), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_apply_preserves_dimensions() {
        let img = DynamicImage::new_luma8(17, 9);
        let out = Preprocessor::default().apply(&img);
        assert_eq!(out.dimensions(), (17, 9));
    }
}
