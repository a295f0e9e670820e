use anyhow::Result;

use crate::detection::preprocessing::{self, BilateralParams};
use crate::pipeline::{MetadataValue, PipelineData, PipelineStep};
use crate::points::ON_THRESHOLD;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(PipelineData {
            image: image::DynamicImage::ImageLuma8(gray),
            metadata: data.metadata,
        })
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Edge-preserving smoothing to suppress photographic noise
pub struct BilateralSmoothStep {
    pub params: BilateralParams,
}

impl PipelineStep for BilateralSmoothStep {
    fn process(&self, data: PipelineData) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let smoothed = preprocessing::bilateral_smooth(&gray, &self.params);
        Ok(PipelineData {
            image: image::DynamicImage::ImageLuma8(smoothed),
            metadata: data.metadata,
        })
    }

    fn name(&self) -> &str {
        "Bilateral Smoothing"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: PipelineData) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
        let edge_pixels = edges.pixels().filter(|p| p[0] >= ON_THRESHOLD).count();
        let total = (edges.width() as usize * edges.height() as usize).max(1);

        let result = PipelineData {
            image: image::DynamicImage::ImageLuma8(edges),
            metadata: data.metadata,
        };
        let fraction = edge_pixels as f32 / total as f32;
        Ok(result
            .with_metadata("edge_pixels", MetadataValue::Int(edge_pixels as i64))
            .with_metadata("edge_fraction", MetadataValue::Float(fraction)))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}
