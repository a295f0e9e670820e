//! Edge-pixel extraction and the flat coordinate file.
//!
//! A coordinate file holds one `x,y,z` row per "on" pixel of an edge mask, in
//! row-major scan order, y flipped to a bottom-left origin and z fixed at 1.0.
//! No header. Floats are written as `%.18e` with a signed two-digit exponent.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::GrayImage;

use crate::error::{ReconError, Result};
use crate::models::{EdgePoint, EdgePointSet};

/// Intensity at or above which a mask pixel counts as an edge
pub const ON_THRESHOLD: u8 = 128;

const COLUMNS: usize = 3;

/// Map a row-major pixel index to bottom-left origin pixel coordinates.
///
/// `y = height - ceil(index / width)`, except index 0 which uses
/// `ceil((index + 1) / width)`. Existing coordinate files depend on this exact
/// formula, including where it lands a row off for column 0.
pub fn pixel_point(index: u64, width: u32, height: u32) -> (f64, f64) {
    let width = width as u64;
    let x = index % width;
    let numerator = if index == 0 { index + 1 } else { index };
    let rows = numerator.div_ceil(width);
    let y = height as i64 - rows as i64;
    (x as f64, y as f64)
}

/// Scan a mask in row-major order and collect every "on" pixel
pub fn edge_points(mask: &GrayImage) -> EdgePointSet {
    let (width, height) = mask.dimensions();
    mask.enumerate_pixels()
        .filter(|(_, _, pixel)| pixel[0] >= ON_THRESHOLD)
        .map(|(x, y, _)| {
            let index = y as u64 * width as u64 + x as u64;
            let (px, py) = pixel_point(index, width, height);
            EdgePoint::new(px, py)
        })
        .collect()
}

/// Format a value as `%.18e`, the layout existing coordinate files use
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{:.18e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => formatted,
    }
}

pub fn encode_points(points: &[EdgePoint]) -> String {
    let mut out = String::with_capacity(points.len() * 76);
    for p in points {
        out.push_str(&format_coordinate(p.x));
        out.push(',');
        out.push_str(&format_coordinate(p.y));
        out.push(',');
        out.push_str(&format_coordinate(p.z));
        out.push('\n');
    }
    out
}

/// Extract the edge points of `mask` and persist them to `path`
pub fn write_points(mask: &GrayImage, path: &Path) -> Result<EdgePointSet> {
    let points = edge_points(mask);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(encode_points(&points).as_bytes())?;
    out.flush()?;

    log::info!("wrote {} edge points to {}", points.len(), path.display());
    Ok(points)
}

pub fn parse_points(text: &str, path: &Path) -> Result<EdgePointSet> {
    let mut points = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = |reason: String| ReconError::MalformedFile {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != COLUMNS {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                COLUMNS,
                fields.len()
            )));
        }

        let mut values = [0.0f64; COLUMNS];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|_| malformed(format!("not a number: {:?}", field)))?;
        }

        points.push(EdgePoint {
            x: values[0],
            y: values[1],
            z: values[2],
        });
    }

    Ok(points)
}

pub fn read_points(path: &Path) -> Result<EdgePointSet> {
    if !path.is_file() {
        return Err(ReconError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let points = parse_points(&text, path)?;
    log::debug!("read {} edge points from {}", points.len(), path.display());
    Ok(points)
}
