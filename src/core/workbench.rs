//! Selection-driven commands over a project directory.
//!
//! Every command resolves the active reference image first and returns
//! [`ReconError::NoSelection`] before touching anything when there is none.
//! Scene changes are applied only after all fallible work has succeeded.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tempfile::NamedTempFile;

use crate::assembly;
use crate::config::Settings;
use crate::core::scene::{AssetKind, RasterAsset, Scene};
use crate::detection::{EdgeExtractor, Extraction};
use crate::error::{ReconError, Result};
use crate::models::{EdgePoint, PointCloud, ReferenceImage};
use crate::placement::{self, PlacementTransform};
use crate::points;

pub const ARTIFACT_EXTENSION: &str = "jpg";

/// Fully written scratch file waiting to be moved over `target`
struct StagedFile {
    scratch: NamedTempFile,
    target: PathBuf,
}

/// Move staged files into place. Targets are checked up front so a bad one
/// fails before anything is replaced; unpersisted scratch files delete themselves.
fn commit(files: Vec<StagedFile>) -> Result<()> {
    for file in &files {
        if file.target.is_dir() {
            return Err(ReconError::Io(std::io::Error::new(
                ErrorKind::IsADirectory,
                format!("{} is a directory", file.target.display()),
            )));
        }
        if let Some(parent) = file.target.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    for file in files {
        file.scratch
            .persist(&file.target)
            .map_err(|e| ReconError::Io(e.error))?;
        log::debug!("imported {}", file.target.display());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub image: String,
    pub edge_pixels: usize,
    pub contours: usize,
    pub mask_path: PathBuf,
    pub overlay_path: PathBuf,
    pub points_path: PathBuf,
}

#[derive(Debug)]
pub struct Workbench {
    project_dir: PathBuf,
    settings: Settings,
    scene: Scene,
}

impl Workbench {
    pub fn new(project_dir: impl Into<PathBuf>, settings: Settings, scene: Scene) -> Self {
        Self {
            project_dir: project_dir.into(),
            settings,
            scene,
        }
    }

    /// Load settings and scene from a project directory
    pub fn open(project_dir: impl Into<PathBuf>) -> Result<Self> {
        let project_dir = project_dir.into();
        let settings = Settings::load(&project_dir)?;
        let scene = Scene::load(&project_dir)?;
        Ok(Self::new(project_dir, settings, scene))
    }

    pub fn save(&self) -> Result<()> {
        self.scene.save(&self.project_dir)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    pub fn points_path(&self, image: &ReferenceImage) -> PathBuf {
        self.project_dir
            .join(&self.settings.points_dir)
            .join(format!("{}-pts.txt", image.artifact_stem()))
    }

    fn artifact_relative_path(&self, image: &ReferenceImage, kind: AssetKind) -> PathBuf {
        self.settings.artifacts_dir.join(format!(
            "{}-{}.{}",
            image.artifact_stem(),
            kind.suffix(),
            ARTIFACT_EXTENSION
        ))
    }

    pub fn artifact_path(&self, image: &ReferenceImage, kind: AssetKind) -> PathBuf {
        self.project_dir.join(self.artifact_relative_path(image, kind))
    }

    fn extractor(&self, debug_dir: Option<PathBuf>) -> Result<EdgeExtractor> {
        self.settings.validate()?;
        let extractor = EdgeExtractor::new(self.settings.canny_low, self.settings.canny_high)?
            .with_smoothing_diameter(self.settings.smoothing_diameter);
        Ok(match debug_dir {
            Some(dir) => extractor.with_debug(dir),
            None => extractor,
        })
    }

    /// Edge mask and contour overlay for the selected image, without side effects
    pub fn run_extraction(
        &self,
        debug_dir: Option<PathBuf>,
    ) -> Result<(ReferenceImage, Extraction)> {
        let image = self.scene.selected_image()?.clone();
        let extractor = self.extractor(debug_dir)?;
        let raster = image::open(self.resolve(&image.path))?;
        let mut rng = Pcg32::seed_from_u64(self.settings.contour_seed);
        let extraction = extractor.extract(&raster, &mut rng)?;
        Ok((image, extraction))
    }

    fn scratch_file(&self, prefix: &str, suffix: &str) -> Result<NamedTempFile> {
        Ok(tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.project_dir)?)
    }

    /// Encode `raster` into a scratch file beside the project
    fn stage_raster(
        &self,
        raster: &DynamicImage,
        image: &ReferenceImage,
        kind: AssetKind,
    ) -> Result<(StagedFile, RasterAsset)> {
        let name = format!("{}-{}", image.artifact_stem(), kind.suffix());
        let relative = self.artifact_relative_path(image, kind);

        let scratch = self.scratch_file(&name, &format!(".{}", ARTIFACT_EXTENSION))?;
        raster.save_with_format(scratch.path(), ImageFormat::Jpeg)?;

        let asset = RasterAsset {
            name,
            kind,
            source: image.name.clone(),
            path: relative.clone(),
            width: raster.width(),
            height: raster.height(),
        };
        let staged = StagedFile {
            scratch,
            target: self.project_dir.join(relative),
        };
        Ok((staged, asset))
    }

    fn stage_points(&self, points: &[EdgePoint], image: &ReferenceImage) -> Result<StagedFile> {
        let mut scratch = self.scratch_file(&format!("{}-pts", image.artifact_stem()), ".txt")?;
        scratch.write_all(points::encode_points(points).as_bytes())?;
        scratch.flush()?;
        Ok(StagedFile {
            scratch,
            target: self.points_path(image),
        })
    }

    /// Extract edges from the selected image, import both rasters, and write its coordinate file.
    ///
    /// All three outputs are staged as scratch files first and moved into place
    /// only once every one of them has been written.
    pub fn extract_selected(&mut self, debug_dir: Option<PathBuf>) -> Result<ExtractionReport> {
        let (image, extraction) = self.run_extraction(debug_dir)?;

        let mask = DynamicImage::ImageLuma8(extraction.mask.clone());
        let overlay = DynamicImage::ImageRgb8(extraction.overlay.clone());
        let (mask_file, mask_asset) = self.stage_raster(&mask, &image, AssetKind::EdgeMask)?;
        let (overlay_file, overlay_asset) =
            self.stage_raster(&overlay, &image, AssetKind::ContourOverlay)?;

        let edge_points = points::edge_points(&extraction.mask);
        let points_file = self.stage_points(&edge_points, &image)?;

        let report = ExtractionReport {
            image: image.name.clone(),
            edge_pixels: edge_points.len(),
            contours: extraction.contours.len(),
            mask_path: mask_file.target.clone(),
            overlay_path: overlay_file.target.clone(),
            points_path: points_file.target.clone(),
        };

        commit(vec![points_file, mask_file, overlay_file])?;

        self.scene.upsert_asset(mask_asset);
        self.scene.upsert_asset(overlay_asset);

        log::info!(
            "{}: {} edge points, {} contours",
            report.image,
            report.edge_pixels,
            report.contours
        );
        Ok(report)
    }

    /// Rewrite the selected image's coordinate file from its stored edge mask
    pub fn serialize_selected(&self) -> Result<usize> {
        let image = self.scene.selected_image()?;
        let mask_path = self.artifact_path(image, AssetKind::EdgeMask);
        if !mask_path.is_file() {
            return Err(ReconError::MissingArtifact { path: mask_path });
        }
        let mask = image::open(&mask_path)?.to_luma8();
        let written = points::write_points(&mask, &self.points_path(image))?;
        Ok(written.len())
    }

    pub fn placement_selected(&self) -> Result<PlacementTransform> {
        let image = self.scene.selected_image()?;
        placement::compute_placement(image, self.settings.unit_system, self.settings.length_unit)
    }

    /// Build the selected image's point cloud from its coordinate file and add it to the scene
    pub fn assemble_selected(&mut self) -> Result<PointCloud> {
        let image = self.scene.selected_image()?.clone();
        let view = image.view().ok_or(ReconError::NoSelection)?;

        let edge_points = points::read_points(&self.points_path(&image))?;
        let placement = placement::compute_placement(
            &image,
            self.settings.unit_system,
            self.settings.length_unit,
        )?;

        let cloud = assembly::build_point_cloud(
            format!("{}-points", image.artifact_stem()),
            image.name.clone(),
            &edge_points,
            &placement,
            view,
            image.rotation,
        );

        log::info!("{}: assembled {} vertices on the {} plane", image.name, cloud.len(), view);

        self.scene.upsert_cloud(cloud.clone());
        Ok(cloud)
    }
}
