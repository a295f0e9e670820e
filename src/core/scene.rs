use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::models::{PointCloud, ReferenceImage, View};

pub const SCENE_FILE: &str = "scene.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    EdgeMask,
    ContourOverlay,
}

impl AssetKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            AssetKind::EdgeMask => "canny",
            AssetKind::ContourOverlay => "contours",
        }
    }
}

/// Raster imported into the project, e.g. `front-canny`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterAsset {
    pub name: String,
    pub kind: AssetKind,
    /// Reference image the raster was derived from
    pub source: String,
    /// Path relative to the project directory
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Everything the host scene holds that the pipeline reads or creates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub images: Vec<ReferenceImage>,
    pub selected: Option<String>,
    pub assets: Vec<RasterAsset>,
    pub clouds: Vec<PointCloud>,
}

impl Scene {
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(SCENE_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `scene.json` atomically
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(project_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(project_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(project_dir.join(SCENE_FILE))
            .map_err(|e| ReconError::Io(e.error))?;
        Ok(())
    }

    /// Register an image file, reading its pixel size. The name defaults to the file name.
    pub fn import_image(&mut self, path: &Path, name: Option<String>) -> Result<&ReferenceImage> {
        let (width, height) = image::image_dimensions(path)?;
        let name = name.unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });
        if View::from_name(&name).is_none() {
            log::warn!("{} has no view tag in its name; it cannot be assembled", name);
        }
        let idx = self.add_image(ReferenceImage::new(name, path, width, height));
        Ok(&self.images[idx])
    }

    /// Insert or replace (by name); returns the image's index
    pub fn add_image(&mut self, image: ReferenceImage) -> usize {
        match self.images.iter().position(|i| i.name == image.name) {
            Some(idx) => {
                self.images[idx] = image;
                idx
            }
            None => {
                self.images.push(image);
                self.images.len() - 1
            }
        }
    }

    pub fn image(&self, name: &str) -> Option<&ReferenceImage> {
        self.images.iter().find(|i| i.name == name)
    }

    pub fn image_mut(&mut self, name: &str) -> Option<&mut ReferenceImage> {
        self.images.iter_mut().find(|i| i.name == name)
    }

    /// Make `name` the active object; false (selection untouched) when it is unknown
    pub fn select(&mut self, name: &str) -> bool {
        if self.image(name).is_some() {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected_image(&self) -> Result<&ReferenceImage> {
        self.selected
            .as_deref()
            .and_then(|name| self.image(name))
            .ok_or(ReconError::NoSelection)
    }

    pub fn asset(&self, source: &str, kind: AssetKind) -> Option<&RasterAsset> {
        self.assets.iter().find(|a| a.source == source && a.kind == kind)
    }

    pub fn upsert_asset(&mut self, asset: RasterAsset) {
        self.assets.retain(|a| a.name != asset.name);
        self.assets.push(asset);
    }

    pub fn cloud(&self, name: &str) -> Option<&PointCloud> {
        self.clouds.iter().find(|c| c.name == name)
    }

    pub fn upsert_cloud(&mut self, cloud: PointCloud) {
        self.clouds.retain(|c| c.name != cloud.name);
        self.clouds.push(cloud);
    }
}
