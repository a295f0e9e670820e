use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use orthocloud::{Scene, Settings, Workbench};
use std::path::Path;

/// Mask of the given size with exactly the listed row-major indices switched on
pub fn edge_mask(width: u32, height: u32, on: &[u64]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for &index in on {
        let x = (index % width as u64) as u32;
        let y = (index / width as u64) as u32;
        mask.put_pixel(x, y, Luma([255]));
    }
    mask
}

/// 120x80 dark photo with a bright filled rectangle from (30,20) to (89,59)
pub fn rectangle_photo() -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(120, 80, |x, y| {
        if (30..90).contains(&x) && (20..60).contains(&y) {
            Rgb([230u8, 225u8, 220u8])
        } else {
            Rgb([40u8, 45u8, 50u8])
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Soft diagonal gradient with a few hard features; exercises hysteresis
pub fn textured_photo() -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(96, 64, |x, y| {
        let base = ((x * 2 + y * 3) % 256) as u8;
        let bump = if (x / 8 + y / 8) % 3 == 0 { 60 } else { 0 };
        let v = base.saturating_add(bump);
        Rgb([v, v / 2 + 30, 255 - v])
    });
    DynamicImage::ImageRgb8(img)
}

/// Thresholds low enough that the rectangle photo's border always survives smoothing
pub fn test_settings() -> Settings {
    Settings {
        canny_low: 20,
        canny_high: 60,
        ..Settings::default()
    }
}

/// Creates a project directory containing `file_name` (the rectangle photo),
/// registered and selected. Keep the TempDir alive for the duration of the test.
pub fn create_test_project(file_name: &str) -> (Workbench, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let image_path = dir.path().join(file_name);
    rectangle_photo()
        .save(&image_path)
        .expect("Failed to save test image");

    let mut scene = Scene::default();
    scene
        .import_image(&image_path, None)
        .expect("Failed to import test image");
    scene.select(file_name);

    let bench = Workbench::new(dir.path(), test_settings(), scene);
    (bench, dir)
}

/// Sorted relative file listing of a directory tree
pub fn list_files(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).expect("read_dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).expect("under root");
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    out.sort();
    out
}
