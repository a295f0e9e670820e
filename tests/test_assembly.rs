//! Mapping edge points onto view planes and reapplying image rotation.

mod common;

use common::*;
use orthocloud::assembly::{assemble, build_point_cloud, reapply_rotation};
use orthocloud::placement::{LengthUnit, UnitSystem, ViewLayout, compute_placement};
use std::f64::consts::{FRAC_PI_2, PI};

const EPS: f64 = 1e-9;

fn assert_vertex(expected: [f64; 3], actual: WorldVertex) {
    let a = actual.to_array();
    for i in 0..3 {
        assert!(
            (expected[i] - a[i]).abs() < EPS,
            "expected {:?}, got {:?}",
            expected,
            a
        );
    }
}

fn image_for(view: View) -> ReferenceImage {
    ReferenceImage::new(format!("{}.png", view), format!("{}.png", view), 1000, 500)
}

fn placement_for(image: &ReferenceImage) -> PlacementTransform {
    compute_placement(image, UnitSystem::Metric, LengthUnit::Meters).expect("placement")
}

fn grid() -> Vec<EdgePoint> {
    let mut points = Vec::new();
    for x in (0..=1000).step_by(125) {
        for y in (0..=500).step_by(125) {
            points.push(EdgePoint::new(x as f64, y as f64));
        }
    }
    points
}

#[test]
fn test_image_center_maps_to_origin() {
    let image = image_for(View::Front);
    let vertices = assemble(&[EdgePoint::new(500.0, 250.0)], &placement_for(&image), View::Front);
    assert_eq!(vec![WorldVertex::new(0.0, 0.0, 0.0)], vertices);
}

#[test]
fn test_bottom_left_pixel_lands_on_each_views_corner() {
    let corner = [EdgePoint::new(0.0, 0.0)];
    let cases = [
        (View::Top, [-2.5, -1.25, 0.0]),
        (View::Front, [-2.5, 0.0, -1.25]),
        (View::Right, [0.0, -2.5, -1.25]),
        (View::Back, [2.5, 0.0, -1.25]),
        (View::Bottom, [-2.5, 1.25, 0.0]),
        (View::Left, [0.0, 2.5, -1.25]),
    ];

    for (view, expected) in cases {
        let image = image_for(view);
        let vertices = assemble(&corner, &placement_for(&image), view);
        assert_vertex(expected, vertices[0]);
    }
}

#[test]
fn test_plane_axis_is_held_at_signed_zero() {
    let points = grid();
    for view in View::MATCH_ORDER {
        let image = image_for(view).with_location([1.0, 2.0, 3.0]);
        let layout = ViewLayout::of(view);
        let vertices = assemble(&points, &placement_for(&image), view);
        assert_eq!(points.len(), vertices.len());

        let mirrored = matches!(view, View::Back | View::Bottom);
        for v in &vertices {
            let depth = v.to_array()[layout.depth.index()];
            assert_eq!(0.0, depth, "{} view", view);
            assert_eq!(mirrored, depth.is_sign_negative(), "{} view", view);
        }
    }
}

#[test]
fn test_location_offsets_plane_axes() {
    let image = image_for(View::Right).with_location([7.0, 1.0, -2.0]);
    let vertices = assemble(&[EdgePoint::new(500.0, 250.0)], &placement_for(&image), View::Right);
    assert_vertex([0.0, 1.0, -2.0], vertices[0]);
}

#[test]
fn test_display_units_do_not_change_geometry() {
    let image = image_for(View::Left).with_location([0.3, -1.7, 2.2]);
    let points = grid();

    let m = assemble(&points, &placement_for(&image), View::Left);
    for (system, length) in [
        (UnitSystem::Metric, LengthUnit::Centimeters),
        (UnitSystem::Imperial, LengthUnit::Inches),
        (UnitSystem::Imperial, LengthUnit::Feet),
    ] {
        let placement = compute_placement(&image, system, length).unwrap();
        let other = assemble(&points, &placement, View::Left);
        for (a, b) in m.iter().zip(&other) {
            assert_vertex(a.to_array(), *b);
        }
    }
}

#[test]
fn test_front_rotation_turns_about_depth_axis() {
    let image = image_for(View::Front).with_rotation([0.0, -FRAC_PI_2, 0.0]);
    let cloud = build_point_cloud(
        "front-points",
        "front.png",
        &[EdgePoint::new(1000.0, 250.0)],
        &placement_for(&image),
        View::Front,
        image.rotation,
    );

    // right-centre of the image swings to below the centre
    assert_vertex([0.0, 0.0, -2.5], cloud.vertices[0]);
}

#[test]
fn test_rotation_pivots_about_image_center() {
    let image = image_for(View::Front)
        .with_location([10.0, -3.0, 5.0])
        .with_rotation([0.0, -FRAC_PI_2, 0.0]);
    let placement = placement_for(&image);
    let points = [EdgePoint::new(500.0, 250.0), EdgePoint::new(1000.0, 250.0)];

    let mut vertices = assemble(&points, &placement, View::Front);
    reapply_rotation(&mut vertices, View::Front, image.rotation, placement.center());

    assert_vertex([10.0, 0.0, 5.0], vertices[0]);
    assert_vertex([10.0, 0.0, 2.5], vertices[1]);
}

#[test]
fn test_top_rotation_uses_negated_z() {
    let image = image_for(View::Top).with_rotation([0.0, 0.0, FRAC_PI_2]);
    let placement = placement_for(&image);
    let mut vertices = assemble(&[EdgePoint::new(1000.0, 250.0)], &placement, View::Top);
    reapply_rotation(&mut vertices, View::Top, image.rotation, placement.center());

    assert_vertex([0.0, -2.5, 0.0], vertices[0]);
}

fn rotate_right_edge_midpoint(view: View, euler: [f64; 3]) -> WorldVertex {
    let image = image_for(view).with_rotation(euler);
    let placement = placement_for(&image);
    let mut vertices = assemble(&[EdgePoint::new(1000.0, 250.0)], &placement, view);
    reapply_rotation(&mut vertices, view, image.rotation, placement.center());
    vertices[0]
}

#[test]
fn test_right_rotation_follows_positive_y() {
    // unrotated the pixel sits at +2.5 on y; a quarter turn about x lifts it to +z
    let v = rotate_right_edge_midpoint(View::Right, [0.0, FRAC_PI_2, 0.0]);
    assert_vertex([0.0, 0.0, 2.5], v);
}

#[test]
fn test_left_rotation_adds_half_turn() {
    // left starts at -2.5 on y; pi + (-pi/2) is a quarter turn, taking it to -z
    let v = rotate_right_edge_midpoint(View::Left, [0.0, -FRAC_PI_2, 0.0]);
    assert_vertex([0.0, 0.0, -2.5], v);
}

#[test]
fn test_bottom_rotation_uses_negated_z() {
    let v = rotate_right_edge_midpoint(View::Bottom, [0.0, 0.0, FRAC_PI_2]);
    assert_vertex([0.0, -2.5, 0.0], v);
    assert!(v.z.is_sign_negative());
}

#[test]
fn test_back_import_flip_is_undone() {
    let image = image_for(View::Back).with_rotation([0.0, PI, 0.0]);
    let placement = placement_for(&image);
    let points = grid();

    let flat = assemble(&points, &placement, View::Back);
    let mut rotated = flat.clone();
    reapply_rotation(&mut rotated, View::Back, image.rotation, placement.center());

    for (a, b) in flat.iter().zip(&rotated) {
        assert_vertex(a.to_array(), *b);
    }
}

#[test]
fn test_rotation_keeps_points_on_their_plane() {
    let points = grid();
    for view in View::MATCH_ORDER {
        let image = image_for(view)
            .with_location([0.5, -0.25, 1.0])
            .with_rotation([0.3, 1.1, -0.7]);
        let placement = placement_for(&image);
        let cloud =
            build_point_cloud("c", image.name.clone(), &points, &placement, view, image.rotation);
        let depth = ViewLayout::of(view).depth.index();
        assert!(cloud.vertices.iter().all(|v| v.to_array()[depth] == 0.0), "{} view", view);
    }
}

#[test]
fn test_obj_export_has_only_vertices() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let image = image_for(View::Top);
    let cloud = build_point_cloud(
        "top-points",
        "top.png",
        &[EdgePoint::new(0.0, 0.0), EdgePoint::new(500.0, 250.0)],
        &placement_for(&image),
        View::Top,
        [0.0; 3],
    );
    let path = dir.path().join("top.obj");
    cloud.write_obj(&path)?;

    let text = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!("o top-points", lines[0]);
    assert_eq!(3, lines.len());
    assert!(lines[1..].iter().all(|l| l.starts_with("v ")));
    Ok(())
}
