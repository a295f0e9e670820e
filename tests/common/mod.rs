#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from orthocloud for tests
pub use orthocloud::{
    EdgePoint, PlacementTransform, ReconError, ReferenceImage, Scene, Settings, View, Workbench,
    WorldVertex,
};
