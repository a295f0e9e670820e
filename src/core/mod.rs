pub mod scene;
pub mod workbench;

pub use scene::{AssetKind, RasterAsset, Scene};
pub use workbench::{ExtractionReport, Workbench};
