use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Orthogonal direction a reference image was photographed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Top,
    Front,
    Right,
    Back,
    Bottom,
    Left,
}

impl View {
    /// Tag lookup order used when a name contains several view words.
    pub const MATCH_ORDER: [View; 6] = [
        View::Top,
        View::Front,
        View::Right,
        View::Bottom,
        View::Back,
        View::Left,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Top => "top",
            View::Front => "front",
            View::Right => "right",
            View::Back => "back",
            View::Bottom => "bottom",
            View::Left => "left",
        }
    }

    /// Derive the view tag from an object or file name (case-insensitive substring match)
    pub fn from_name(name: &str) -> Option<View> {
        let lower = name.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|view| lower.contains(view.as_str()))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_DISPLAY_SIZE: f64 = 5.0;

fn default_display_size() -> f64 {
    DEFAULT_DISPLAY_SIZE
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// A view-tagged reference photograph placed in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub name: String,
    pub path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[serde(default)]
    pub location: [f64; 3],
    /// Euler XYZ, radians
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    /// Physical length of the image's longer edge before scaling
    #[serde(default = "default_display_size")]
    pub display_size: f64,
}

impl ReferenceImage {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            pixel_width,
            pixel_height,
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
            display_size: DEFAULT_DISPLAY_SIZE,
        }
    }

    pub fn with_location(mut self, location: [f64; 3]) -> Self {
        self.location = location;
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: [f64; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_display_size(mut self, display_size: f64) -> Self {
        self.display_size = display_size;
        self
    }

    pub fn view(&self) -> Option<View> {
        View::from_name(&self.name)
    }

    /// File name stem used for every artifact derived from this image
    pub fn artifact_stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.name.as_str())
            .to_string()
    }
}

/// Edge pixel in bottom-left origin pixel space, as stored in a coordinate file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EdgePoint {
    pub const PLACEHOLDER_Z: f64 = 1.0;

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: Self::PLACEHOLDER_Z,
        }
    }
}

pub type EdgePointSet = Vec<EdgePoint>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldVertex {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Vertex-only object; no edges or faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub name: String,
    pub source: String,
    pub view: View,
    pub vertices: Vec<WorldVertex>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Write a Wavefront OBJ holding only `v` records
    pub fn write_obj(&self, path: &Path) -> std::io::Result<()> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        writeln!(out, "o {}", self.name)?;
        for v in &self.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        out.flush()
    }
}
