use nalgebra::{Point3, Rotation3, Unit, Vector3};

use crate::models::{EdgePoint, PointCloud, View, WorldVertex};
use crate::placement::{Axis, PlacementTransform, ViewLayout};

/// One on-plane world coordinate: walk `offset` in from the image edge on the `edge_sign` side.
///
/// Scale factors are pixels per scene unit, so the display unit never enters here.
fn plane_coordinate(center: f64, half_extent: f64, edge_sign: f64, offset: f64) -> f64 {
    center + edge_sign * (half_extent - offset)
}

pub fn map_point(
    point: &EdgePoint,
    placement: &PlacementTransform,
    layout: &ViewLayout,
) -> WorldVertex {
    let center = placement.center();
    let mut world = [0.0f64; 3];

    world[layout.horizontal.index()] = plane_coordinate(
        center[layout.horizontal.index()],
        placement.physical_width() / 2.0,
        layout.left_edge_sign,
        point.x / placement.horizontal_scale(),
    );
    world[layout.vertical.index()] = plane_coordinate(
        center[layout.vertical.index()],
        placement.physical_height() / 2.0,
        layout.bottom_edge_sign,
        point.y / placement.vertical_scale(),
    );
    world[layout.depth.index()] = 0.0 * layout.depth_sign;

    WorldVertex::from_array(world)
}

/// Map every edge point onto the view's world plane
pub fn assemble(
    points: &[EdgePoint],
    placement: &PlacementTransform,
    view: View,
) -> Vec<WorldVertex> {
    let layout = ViewLayout::of(view);
    points
        .iter()
        .map(|p| map_point(p, placement, layout))
        .collect()
}

fn axis_vector(axis: Axis) -> Unit<Vector3<f64>> {
    match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    }
}

/// Rotation that carries the image's in-plane spin over to derived geometry
pub fn view_rotation(view: View, euler: [f64; 3]) -> Rotation3<f64> {
    let layout = ViewLayout::of(view);
    Rotation3::from_axis_angle(&axis_vector(layout.depth), layout.rotation.angle(euler))
}

/// Rotate vertices in place about `pivot` by the view's reapplied rotation.
///
/// The rotation axis is the view's depth axis, so the depth coordinate is kept
/// exactly as assembled.
pub fn reapply_rotation(
    vertices: &mut [WorldVertex],
    view: View,
    euler: [f64; 3],
    pivot: [f64; 3],
) {
    let depth = ViewLayout::of(view).depth.index();
    let rotation = view_rotation(view, euler);
    let pivot = Point3::from(pivot);
    for v in vertices.iter_mut() {
        let original = v.to_array();
        let rotated = pivot + rotation * (Point3::from(original) - pivot);
        let mut out = [rotated.x, rotated.y, rotated.z];
        out[depth] = original[depth];
        *v = WorldVertex::from_array(out);
    }
}

/// Full assembly for one reference image: map, then reapply its rotation about its centre
pub fn build_point_cloud(
    name: impl Into<String>,
    source: impl Into<String>,
    points: &[EdgePoint],
    placement: &PlacementTransform,
    view: View,
    euler: [f64; 3],
) -> PointCloud {
    let mut vertices = assemble(points, placement, view);
    reapply_rotation(&mut vertices, view, euler, placement.center());

    PointCloud {
        name: name.into(),
        source: source.into(),
        view,
        vertices,
    }
}
