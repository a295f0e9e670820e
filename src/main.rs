use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use orthocloud::{LengthUnit, ReconError, UnitSystem, Workbench};

#[derive(Parser)]
#[command(name = "orthocloud")]
#[command(about = "Turn orthogonal reference photos into positioned point clouds")]
struct Cli {
    /// Project directory holding scene.json, orthocloud.json and derived files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured unit system
    #[arg(long, value_enum)]
    unit_system: Option<UnitSystem>,

    /// Override the configured length unit
    #[arg(long, value_enum)]
    length_unit: Option<LengthUnit>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a reference image in the scene and select it
    Add {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,
        /// Object name; must contain a view word (top, front, right, back, bottom, left)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        location: Option<Vec<f64>>,
        /// Euler XYZ in degrees
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        rotation: Option<Vec<f64>>,
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
        scale: Option<Vec<f64>>,
        #[arg(long)]
        display_size: Option<f64>,
    },
    /// Make an image the active object
    Select { name: String },
    /// Clear the active object
    Deselect,
    /// Detect edges and contours on the selected image and write its coordinate file
    Extract {
        #[arg(long)]
        low: Option<u32>,
        #[arg(long)]
        high: Option<u32>,
        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
    /// Rewrite the coordinate file from the stored edge mask
    Serialize,
    /// Print the placement transform of the selected image
    Place,
    /// Build the selected image's point cloud from its coordinate file
    Assemble {
        /// Also export the cloud as a vertex-only OBJ
        #[arg(long, value_name = "PATH")]
        obj: Option<PathBuf>,
    },
    /// List images, assets and point clouds
    List,
}

fn triple(values: Option<Vec<f64>>) -> Option<[f64; 3]> {
    values.and_then(|v| <[f64; 3]>::try_from(v).ok())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    pretty_env_logger::formatted_builder()
        .filter_module("orthocloud", level)
        .parse_default_env()
        .init();

    let mut bench = Workbench::open(&args.project)
        .with_context(|| format!("open project {:?}", args.project))?;
    if let Some(system) = args.unit_system {
        bench.settings_mut().unit_system = system;
    }
    if let Some(length) = args.length_unit {
        bench.settings_mut().length_unit = length;
    }

    match run(&mut bench, args.cmd) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<ReconError>() {
            Some(recon) if recon.is_no_op() => {
                log::warn!("{}; nothing changed", recon);
                Ok(())
            }
            _ => Err(err),
        },
    }
}

fn run(bench: &mut Workbench, cmd: Command) -> Result<()> {
    match cmd {
        Command::Add {
            image_path,
            name,
            location,
            rotation,
            scale,
            display_size,
        } => {
            let name = bench.scene_mut().import_image(&image_path, name)?.name.clone();
            if let Some(image) = bench.scene_mut().image_mut(&name) {
                if let Some(location) = triple(location) {
                    image.location = location;
                }
                if let Some(rotation) = triple(rotation) {
                    image.rotation = rotation.map(f64::to_radians);
                }
                if let Some(scale) = triple(scale) {
                    image.scale = scale;
                }
                if let Some(display_size) = display_size {
                    image.display_size = display_size;
                }
            }
            bench.scene_mut().select(&name);
            bench.save()?;
            println!("Added {}", name);
        }
        Command::Select { name } => {
            if !bench.scene_mut().select(&name) {
                bail!("no image named {:?} in the scene", name);
            }
            bench.save()?;
        }
        Command::Deselect => {
            bench.scene_mut().deselect();
            bench.save()?;
        }
        Command::Extract { low, high, debug_out } => {
            if let Some(low) = low {
                bench.settings_mut().canny_low = low;
            }
            if let Some(high) = high {
                bench.settings_mut().canny_high = high;
            }
            let report = bench.extract_selected(debug_out)?;
            bench.save()?;
            println!("Edge mask:   {}", report.mask_path.display());
            println!("Contours:    {} ({})", report.overlay_path.display(), report.contours);
            println!(
                "Coordinates: {} ({} points)",
                report.points_path.display(),
                report.edge_pixels
            );
        }
        Command::Serialize => {
            let count = bench.serialize_selected()?;
            println!("Wrote {} points", count);
        }
        Command::Place => {
            let placement = bench.placement_selected()?;
            let (width, height) = placement.display_dimensions();
            let [cx, cy, cz] = placement.center();
            let unit = bench.settings().length_unit;
            println!("Physical size: {:.4} x {:.4} ({:?})", width, height, unit);
            println!(
                "Scale:         {:.4} px/unit horizontal, {:.4} px/unit vertical",
                placement.horizontal_scale(),
                placement.vertical_scale()
            );
            println!("Center:        ({:.4}, {:.4}, {:.4})", cx, cy, cz);
        }
        Command::Assemble { obj } => {
            let cloud = bench.assemble_selected()?;
            if let Some(path) = obj {
                cloud.write_obj(&path).with_context(|| format!("write obj: {path:?}"))?;
            }
            bench.save()?;
            println!("{}: {} vertices ({} view)", cloud.name, cloud.len(), cloud.view);
        }
        Command::List => {
            let scene = bench.scene();
            let selected = scene.selected.as_deref();
            for image in &scene.images {
                let marker = if Some(image.name.as_str()) == selected { "*" } else { " " };
                let view = image.view().map(|v| v.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{} {} [{}] {}x{}",
                    marker, image.name, view, image.pixel_width, image.pixel_height
                );
            }
            for asset in &scene.assets {
                println!("  asset {} ({})", asset.name, asset.path.display());
            }
            for cloud in &scene.clouds {
                println!("  cloud {} ({} vertices)", cloud.name, cloud.len());
            }
        }
    }

    Ok(())
}
