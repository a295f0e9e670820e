use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;

/// Convert image to single-channel intensity
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Smoothing extents used ahead of edge detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralParams {
    pub diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl BilateralParams {
    /// Extents derived from the edge thresholds, each scaled by 2
    pub fn from_thresholds(diameter: u32, low_threshold: u32, high_threshold: u32) -> Self {
        Self {
            diameter,
            sigma_color: low_threshold as f32 * 2.0,
            sigma_space: high_threshold as f32 * 2.0,
        }
    }
}

/// Edge-preserving smoothing over a square window of `diameter` pixels
pub fn bilateral_smooth(img: &GrayImage, params: &BilateralParams) -> GrayImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    bilateral_filter(img, params.diameter.max(1), params.sigma_color, params.sigma_space)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
