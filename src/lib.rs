pub mod assembly;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod placement;
pub mod points;

pub use config::Settings;
pub use crate::core::{Scene, Workbench};
pub use detection::{EdgeExtractor, Extraction};
pub use error::{ReconError, Result};
pub use models::{EdgePoint, EdgePointSet, PointCloud, ReferenceImage, View, WorldVertex};
pub use pipeline::{MetadataValue, Pipeline, PipelineData, PipelineStep};
pub use placement::{LengthUnit, PlacementTransform, UnitSystem, compute_placement};
