use anyhow::Result;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;

/// Raster flowing through the pipeline, plus whatever the steps recorded about it
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (color on input, single channel after conversion)
    pub image: DynamicImage,

    /// Metadata recorded by steps (e.g., "edge_pixels")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f32),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }
}

/// A single raster transformation
pub trait PipelineStep: Send + Sync {
    fn process(&self, data: PipelineData) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder; runs its steps in order on one image
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    /// Root directory for per-step debug images
    debug_dir: Option<PathBuf>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            debug_dir: None,
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug_dir = Some(output_dir);
        Ok(self)
    }

    pub fn add_step(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    fn save_debug(&self, dir_name: &str, image: &DynamicImage) -> Result<()> {
        if let Some(debug_dir) = &self.debug_dir {
            let step_dir = debug_dir.join(dir_name);
            std::fs::create_dir_all(&step_dir)?;
            let output_path = step_dir.join("01.png");
            image
                .save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
            log::debug!("saved debug image {}/01.png", dir_name);
        }
        Ok(())
    }

    /// Run every step in order on `input`
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.save_debug("00_input", &input)?;

        let mut data = PipelineData::from_image(input);
        log::debug!("pipeline: {}", self.step_names().join(" -> "));

        for (step_idx, step) in self.steps.iter().enumerate() {
            log::debug!("running step: {}", step.name());
            data = step.process(data)?;

            let dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.save_debug(&dir_name, &data.image)?;
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
