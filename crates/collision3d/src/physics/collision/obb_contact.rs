//! Contact generation between two oriented boxes
//!
//! Runs after the separating axis test has reported an overlap:
//!
//! 1. Every one of the 15 candidate axes is re-projected to find the axis of
//!    least penetration.
//! 2. Each box contributes the corners lying inside a thin band behind its
//!    face along that axis: one corner, an edge (2) or a face (4).
//! 3. The two corner sets are turned into contact points: face/face pairs are
//!    clipped against each other, edge/edge pairs meet at the midpoint of
//!    their closest points, and an edge against a face is clipped to the
//!    face's edge planes.

use log::debug;

use crate::foundation::math::Vec3;

use super::obb::OrientedBox;
use super::primitives::{Interpenetration, LineSegment};
use super::shape::ColliderShape;
use super::tolerance::ContactTolerances;

/// Corner indices of each face, wound around the face, keyed by outward axis
/// (+X, -X, +Y, -Y, +Z, -Z) in [`OrientedBox::corners`] order
const FACES: [[usize; 4]; 6] = [
    [0, 2, 6, 4],
    [1, 5, 7, 3],
    [0, 4, 5, 1],
    [2, 3, 7, 6],
    [0, 1, 3, 2],
    [4, 6, 7, 5],
];

/// Smallest overlap found along the candidate axes
struct Penetration {
    depth: f32,
    axis: Vec3,
}

/// Corners of one box lying in the contact band
struct HitCorners {
    indices: Vec<usize>,
    points: Vec<Vec3>,
}

/// Full box/box interpenetration; `None` when some axis separates the boxes
pub(crate) fn box_contact(
    box0: &OrientedBox,
    box1: &OrientedBox,
    tolerances: &ContactTolerances,
) -> Option<Interpenetration> {
    let penetration = least_penetration(box0, box1, tolerances)?;
    let points = contact_points(box0, box1, &penetration, tolerances);
    Some(Interpenetration::new(-penetration.depth, penetration.axis, points))
}

fn least_penetration(box0: &OrientedBox, box1: &OrientedBox, tolerances: &ContactTolerances) -> Option<Penetration> {
    let a = box0.axes();
    let b = box1.axes();
    let corners0 = box0.corners();
    let corners1 = box1.corners();

    let candidates = a
        .iter()
        .chain(b.iter())
        .copied()
        .chain(a.iter().flat_map(|ai| b.iter().map(move |bj| ai.cross(bj))));

    let mut best: Option<Penetration> = None;
    for axis in candidates {
        // Near-parallel edges: never separating, never the contact normal
        if axis.norm_squared() <= tolerances.degenerate_axis_length_squared {
            continue;
        }
        let axis = axis.normalize();

        let (min0, max0) = span(&corners0, &axis);
        let (min1, max1) = span(&corners1, &axis);
        let combined = (max0 - min0) + (max1 - min1);
        let covered = max0.max(max1) - min0.min(min1);
        if covered > combined {
            return None;
        }

        let depth = combined - covered;
        if best.as_ref().map_or(true, |current| depth < current.depth) {
            // Point from box0 toward box1
            let axis = if min1 < min0 { -axis } else { axis };
            best = Some(Penetration { depth, axis });
        }
    }
    best
}

fn span(corners: &[Vec3; 8], axis: &Vec3) -> (f32, f32) {
    corners.iter().map(|c| c.dot(axis)).fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), d| {
        (min.min(d), max.max(d))
    })
}

/// Corners of `obb` within `depth + slack` of its extreme corner along `normal`
fn hit_corners(obb: &OrientedBox, normal: &Vec3, depth: f32, slack: f32) -> HitCorners {
    let corners = obb.corners();
    let extreme = corners.iter().map(|c| c.dot(normal)).fold(f32::NEG_INFINITY, f32::max);
    let band = extreme - (depth + slack);

    let indices: Vec<usize> = (0..corners.len()).filter(|&i| corners[i].dot(normal) - band > 0.0).collect();
    let points = indices.iter().map(|&i| corners[i]).collect();
    HitCorners { indices, points }
}

fn contact_points(
    box0: &OrientedBox,
    box1: &OrientedBox,
    penetration: &Penetration,
    tolerances: &ContactTolerances,
) -> Vec<Vec3> {
    let normal = penetration.axis;
    let hits0 = hit_corners(box0, &normal, penetration.depth, tolerances.hit_band_slack);
    let hits1 = hit_corners(box1, &-normal, penetration.depth, tolerances.hit_band_slack);

    if hits0.points.is_empty() || hits1.points.is_empty() {
        debug!(
            "box contact found no corners in the contact band ({} vs {})",
            hits0.points.len(),
            hits1.points.len()
        );
        return Vec::new();
    }

    let smaller = || {
        if hits1.points.len() < hits0.points.len() {
            hits1.points.clone()
        } else {
            hits0.points.clone()
        }
    };

    match (hits0.points.len(), hits1.points.len()) {
        (n0, n1) if n0 >= 4 && n1 >= 4 => {
            let faces = (
                ordered_face(box0, &hits0, &normal),
                ordered_face(box1, &hits1, &-normal),
            );
            let (Some(face0), Some(face1)) = faces else {
                debug!("box contact band holds no complete face, using raw corners");
                return smaller();
            };
            let clipped = clip_face_face(&face0, &face1, tolerances);
            if clipped.is_empty() {
                debug!("face clipping produced no points, using raw corners");
                return smaller();
            }
            clipped
        }
        (2, 2) => {
            let edge0 = LineSegment::new(hits0.points[0], hits0.points[1]);
            let edge1 = LineSegment::new(hits1.points[0], hits1.points[1]);
            let (c0, c1) = edge0.closest_points(&edge1);
            vec![(c0 + c1) * 0.5]
        }
        (2, n1) if n1 >= 4 => edge_against_face(&hits0, box1, &hits1, &-normal, tolerances),
        (n0, 2) if n0 >= 4 => edge_against_face(&hits1, box0, &hits0, &normal, tolerances),
        _ => smaller(),
    }
}

/// Clip an edge to the contact face of `face_box`, falling back to clamping
/// the edge's ends into the box when no face is found or the edge misses it
fn edge_against_face(
    edge: &HitCorners,
    face_box: &OrientedBox,
    face_hits: &HitCorners,
    face_normal: &Vec3,
    tolerances: &ContactTolerances,
) -> Vec<Vec3> {
    let (start, end) = (edge.points[0], edge.points[1]);
    let clipped = ordered_face(face_box, face_hits, face_normal).and_then(|face| clip_segment(&start, &end, &face));
    let points = clipped.unwrap_or_else(|| {
        debug!("edge missed the contact face, clamping into the box");
        [face_box.closest_surface_point(&start), face_box.closest_surface_point(&end)]
    });
    merge_close(points.to_vec(), tolerances.vertex_merge_distance_squared)
}

/// The part of segment `start`..`end` inside the edge planes of `face`
fn clip_segment(start: &Vec3, end: &Vec3, face: &[Vec3; 4]) -> Option<[Vec3; 2]> {
    let direction = end - start;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (origin, out) in &edge_planes(face) {
        let distance = (start - origin).dot(out);
        let rate = direction.dot(out);
        if rate.abs() <= f32::EPSILON {
            if distance > 0.0 {
                return None;
            }
            continue;
        }

        let t = -distance / rate;
        if rate > 0.0 {
            t1 = t1.min(t);
        } else {
            t0 = t0.max(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some([start + direction * t0, start + direction * t1])
}

/// The face whose four corners are all in `hits` and that best faces `normal`,
/// wound around its perimeter
fn ordered_face(obb: &OrientedBox, hits: &HitCorners, normal: &Vec3) -> Option<[Vec3; 4]> {
    let corners = obb.corners();
    let axes = obb.axes();

    FACES
        .iter()
        .enumerate()
        .filter(|(_, face)| face.iter().all(|i| hits.indices.contains(i)))
        .map(|(f, face)| {
            let outward = if f % 2 == 0 { axes[f / 2] } else { -axes[f / 2] };
            (outward.dot(normal), face)
        })
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, face)| face.map(|i| corners[i]))
}

/// Edge planes of a convex quad as (point on edge, outward normal)
fn edge_planes(quad: &[Vec3; 4]) -> [(Vec3, Vec3); 4] {
    let normal = (quad[1] - quad[0]).cross(&(quad[2] - quad[0]));
    let centroid = quad.iter().sum::<Vec3>() / 4.0;
    std::array::from_fn(|i| {
        let s0 = quad[i];
        let s1 = quad[(i + 1) % 4];
        let mut out = (s1 - s0).cross(&normal).try_normalize(0.0).unwrap_or_else(Vec3::zeros);
        if (centroid - s0).dot(&out) > 0.0 {
            out = -out;
        }
        (s0, out)
    })
}

fn inside(planes: &[(Vec3, Vec3); 4], point: &Vec3, tolerance: f32) -> bool {
    planes.iter().all(|(origin, out)| (point - origin).dot(out) <= tolerance)
}

/// Clip two quads against each other after projecting the second onto the
/// plane of the first
fn clip_face_face(face0: &[Vec3; 4], face1: &[Vec3; 4], tolerances: &ContactTolerances) -> Vec<Vec3> {
    let Some(normal) = (face0[1] - face0[0]).cross(&(face0[2] - face0[0])).try_normalize(0.0) else {
        return Vec::new();
    };
    let projected: [Vec3; 4] = face1.map(|p| p + normal * normal.dot(&(face0[0] - p)));

    let mut points = Vec::new();
    for (clipper, subject) in [(face0, &projected), (&projected, face0)] {
        let planes = edge_planes(clipper);
        for (origin, out) in &planes {
            for j in 0..4 {
                let p0 = subject[j];
                let p1 = subject[(j + 1) % 4];
                let d0 = (p0 - origin).dot(out);
                let d1 = (p1 - origin).dot(out);

                if d0 * d1 < 0.0 {
                    let crossing = p0 + (p1 - p0) * (d0 / (d0 - d1));
                    if inside(&planes, &crossing, tolerances.clip_edge_tolerance) {
                        points.push(crossing);
                    }
                }
            }
        }
        points.extend(subject.iter().filter(|p| inside(&planes, p, tolerances.face_plane_tolerance)));
    }

    merge_close(points, tolerances.vertex_merge_distance_squared)
}

fn merge_close(points: Vec<Vec3>, distance_squared: f32) -> Vec<Vec3> {
    let mut merged: Vec<Vec3> = Vec::with_capacity(points.len());
    for point in points {
        if merged.iter().all(|m| (m - point).norm_squared() >= distance_squared) {
            merged.push(point);
        }
    }
    merged
}
