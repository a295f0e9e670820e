use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;
use rand::Rng;

/// One border of the edge mask, polyline-approximated
#[derive(Debug, Clone, PartialEq)]
pub struct TracedContour {
    pub points: Vec<Point<i32>>,
    /// Index of the enclosing contour, if any
    pub parent: Option<usize>,
    pub is_hole: bool,
}

/// Full nesting hierarchy of the borders found in an edge mask
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourTree {
    pub contours: Vec<TracedContour>,
}

impl ContourTree {
    /// Trace every border (outer and hole) of the non-zero regions of `mask`
    pub fn trace(mask: &GrayImage) -> Self {
        let contours = find_contours::<i32>(mask)
            .into_iter()
            .map(|c| TracedContour {
                points: simplify_collinear(&c.points),
                parent: c.parent,
                is_hole: c.border_type == BorderType::Hole,
            })
            .collect();
        Self { contours }
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent.is_none())
            .map(|(i, _)| i)
    }


    /// Nesting depth, 0 for top-level borders
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.contours.get(index).and_then(|c| c.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.contours.get(parent).and_then(|c| c.parent);
        }
        depth
    }

    pub fn max_depth(&self) -> usize {
        (0..self.len()).map(|i| self.depth(i)).max().unwrap_or(0)
    }
}

/// Drop points lying on a straight run between their neighbours (closed polyline)
pub fn simplify_collinear(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut points = points.to_vec();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n <= 2 {
        return points;
    }

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let (ax, ay) = (cur.x - prev.x, cur.y - prev.y);
            let (bx, by) = (next.x - cur.x, next.y - cur.y);
            let cross = ax * by - ay * bx;
            let dot = ax * bx + ay * by;
            cross != 0 || dot <= 0
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

/// One pseudo-random colour per contour, drawn in order from `rng`
pub fn contour_colors<R: Rng>(count: usize, rng: &mut R) -> Vec<Rgb<u8>> {
    (0..count)
        .map(|_| {
            Rgb([
                rng.gen_range(0..=255u8),
                rng.gen_range(0..=255u8),
                rng.gen_range(0..=255u8),
            ])
        })
        .collect()
}

/// Render every contour, outer and nested, onto a black canvas
pub fn draw_overlay(tree: &ContourTree, width: u32, height: u32, colors: &[Rgb<u8>]) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);

    for (contour, color) in tree.contours.iter().zip(colors) {
        match contour.points.as_slice() {
            [] => {}
            [p] => {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                    canvas.put_pixel(p.x as u32, p.y as u32, *color);
                }
            }
            pts => {
                for (i, a) in pts.iter().enumerate() {
                    let b = pts[(i + 1) % pts.len()];
                    draw_line_segment_mut(
                        &mut canvas,
                        (a.x as f32, a.y as f32),
                        (b.x as f32, b.y as f32),
                        *color,
                    );
                }
            }
        }
    }

    canvas
}
