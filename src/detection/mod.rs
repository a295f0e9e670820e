pub mod contours;
pub mod preprocessing;
pub mod steps;

use std::path::PathBuf;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use rand::Rng;

use crate::error::{ReconError, Result};
use crate::pipeline::Pipeline;
use contours::ContourTree;
use preprocessing::BilateralParams;
use steps::{BilateralSmoothStep, EdgeDetectionStep, GrayscaleStep};

pub const MIN_THRESHOLD: u32 = 1;
pub const MAX_THRESHOLD: u32 = 500;
pub const DEFAULT_SMOOTHING_DIAMETER: u32 = 9;

/// Check a pair of edge thresholds before handing them to the detector
pub fn validate_thresholds(low: u32, high: u32) -> Result<()> {
    for (label, value) in [("low", low), ("high", high)] {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value) {
            return Err(ReconError::InvalidSettings(format!(
                "{} threshold {} outside {}..={}",
                label, value, MIN_THRESHOLD, MAX_THRESHOLD
            )));
        }
    }
    if low > high {
        return Err(ReconError::InvalidSettings(format!(
            "low threshold {} above high threshold {}",
            low, high
        )));
    }
    if low == high {
        log::warn!("edge thresholds are equal ({}); hysteresis has no effect", low);
    }
    Ok(())
}

/// Binary edge mask and its diagnostic contour rendering
#[derive(Debug, Clone)]
pub struct Extraction {
    pub mask: GrayImage,
    pub overlay: RgbImage,
    pub contours: ContourTree,
    pub colors: Vec<Rgb<u8>>,
}

/// Edge/contour extractor: grayscale, bilateral smoothing, Canny, border tracing
#[derive(Debug, Clone)]
pub struct EdgeExtractor {
    low_threshold: u32,
    high_threshold: u32,
    smoothing_diameter: u32,
    debug_dir: Option<PathBuf>,
}

impl EdgeExtractor {
    pub fn new(low_threshold: u32, high_threshold: u32) -> Result<Self> {
        validate_thresholds(low_threshold, high_threshold)?;
        Ok(Self {
            low_threshold,
            high_threshold,
            smoothing_diameter: DEFAULT_SMOOTHING_DIAMETER,
            debug_dir: None,
        })
    }

    pub fn with_smoothing_diameter(mut self, diameter: u32) -> Self {
        self.smoothing_diameter = diameter.max(1);
        self
    }

    /// Save every intermediate raster under `dir` (must be empty or absent)
    pub fn with_debug(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    pub fn smoothing(&self) -> BilateralParams {
        BilateralParams::from_thresholds(
            self.smoothing_diameter,
            self.low_threshold,
            self.high_threshold,
        )
    }

    /// Smoothing must come before detection; raw photographs give fragmentary masks
    fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let mut pipeline = Pipeline::new()
            .add_step(Box::new(GrayscaleStep))
            .add_step(Box::new(BilateralSmoothStep { params: self.smoothing() }))
            .add_step(Box::new(EdgeDetectionStep {
                low_threshold: self.low_threshold as f32,
                high_threshold: self.high_threshold as f32,
            }));
        if let Some(dir) = &self.debug_dir {
            pipeline = pipeline.with_debug(dir.clone())?;
        }
        Ok(pipeline)
    }

    pub fn extract<R: Rng>(&self, img: &DynamicImage, rng: &mut R) -> Result<Extraction> {
        let output = self
            .pipeline()
            .and_then(|p| p.run(img.clone()))
            .map_err(|e| ReconError::Pipeline(format!("{:#}", e)))?;

        let mask = output.image.to_luma8();
        let contours = ContourTree::trace(&mask);
        let colors = contours::contour_colors(contours.len(), rng);
        let overlay = contours::draw_overlay(&contours, mask.width(), mask.height(), &colors);

        log::info!(
            "extracted {} edge pixels ({:.2}% of image), {} contours ({} outer, nested {} deep)",
            output.get_int("edge_pixels").unwrap_or(0),
            output.get_float("edge_fraction").unwrap_or(0.0) * 100.0,
            contours.len(),
            contours.roots().count(),
            contours.max_depth()
        );

        Ok(Extraction {
            mask,
            overlay,
            contours,
            colors,
        })
    }
}
