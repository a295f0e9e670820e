use std::path::PathBuf;

use thiserror::Error;

use crate::placement::{LengthUnit, UnitSystem};

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("no reference image selected")]
    NoSelection,

    #[error("expected artifact does not exist: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("malformed coordinate file {} at line {line}: {reason}", path.display())]
    MalformedFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("unsupported unit configuration: {system:?} / {length:?}")]
    UnsupportedUnitConfiguration {
        system: UnitSystem,
        length: LengthUnit,
    },

    #[error("reference image {name} has no usable physical size")]
    DegenerateImage { name: String },

    #[error("image pipeline failed: {0}")]
    Pipeline(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ReconError {
    /// Outcomes that leave everything untouched and are reported, not fatal.
    pub fn is_no_op(&self) -> bool {
        matches!(self, ReconError::NoSelection | ReconError::MissingArtifact { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
