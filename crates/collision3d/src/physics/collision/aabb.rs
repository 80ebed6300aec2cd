//! Axis-aligned box collider
//!
//! Also serves as the cached bounding volume of every other collider.

use crate::foundation::math::{directions, Transform, Vec3};

use super::ellipsoid::Ellipsoid;
use super::obb::OrientedBox;
use super::primitives::{Interpenetration, Plane, Ray};
use super::shape::{unsupported_pairing, Collider, ColliderShape, ShapeKind};
use super::sphere::Sphere;
use super::tolerance::COINCIDENT_DEPTH;

/// An axis-aligned box described by its half-extents
///
/// `local_offset`/`local_radius` are the authored values; `offset`/`radius`
/// are derived from them by [`ColliderShape::update`] and never feed back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedBox {
    center: Vec3,
    offset: Vec3,
    radius: Vec3,
    local_offset: Vec3,
    local_radius: Vec3,
}

impl Default for AxisAlignedBox {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl AxisAlignedBox {
    /// Create a box; the given offset and radius become the authored values
    pub const fn new(center: Vec3, offset: Vec3, radius: Vec3) -> Self {
        Self {
            center,
            offset,
            radius,
            local_offset: offset,
            local_radius: radius,
        }
    }

    /// The smallest box enclosing `positions`, anchored at the origin
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let Some(first) = positions.first() else {
            return Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::zeros());
        };
        let (min, max) = positions
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Self::new(Vec3::zeros(), (min + max) / 2.0, (max - min) / 2.0)
    }

    /// Derived half-extents
    pub const fn radius(&self) -> Vec3 {
        self.radius
    }

    /// Authored half-extents
    pub const fn local_radius(&self) -> Vec3 {
        self.local_radius
    }

    /// Authored offset
    pub const fn local_offset(&self) -> Vec3 {
        self.local_offset
    }

    /// Move the anchor without touching extents
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Replace both the authored and the derived half-extents
    pub fn set_radius(&mut self, radius: Vec3) {
        self.local_radius = radius;
        self.radius = radius;
    }

    /// Replace both the authored and the derived offset
    pub fn set_offset(&mut self, offset: Vec3) {
        self.local_offset = offset;
        self.offset = offset;
    }

    /// Full extents
    pub fn size(&self) -> Vec3 {
        self.radius * 2.0
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Lowest corner
    pub fn min_position(&self) -> Vec3 {
        self.position() - self.radius
    }

    /// Highest corner
    pub fn max_position(&self) -> Vec3 {
        self.position() + self.radius
    }

    /// Per-axis overlap test against another box
    pub fn is_colliding(&self, other: &Self) -> bool {
        let a = self.position();
        let b = other.position();
        if a == b {
            return true;
        }
        (0..3).all(|i| (a[i] - b[i]).abs() <= self.radius[i] + other.radius[i])
    }

    /// True when the ray starts inside or hits the box
    pub fn is_colliding_with_ray(&self, ray: &Ray) -> bool {
        self.contains(&ray.origin, 0.0) || self.surface_point(ray).is_some()
    }

    /// Inclusive containment test, grown by `threshold` on the low side of each axis
    pub fn contains(&self, point: &Vec3, threshold: f32) -> bool {
        let lower = self.position() - self.radius.add_scalar(threshold);
        let upper = lower + self.size().add_scalar(threshold);
        (0..3).all(|i| point[i] >= lower[i] && point[i] <= upper[i])
    }

    /// True when both extreme corners of `other` are inside
    pub fn contains_box(&self, other: &Self, threshold: f32) -> bool {
        self.contains(&other.min_position(), threshold) && self.contains(&other.max_position(), threshold)
    }

    /// True when any of `positions` is inside
    pub fn contains_any(&self, positions: &[Vec3]) -> bool {
        positions.iter().any(|p| self.contains(p, 0.0))
    }

    /// The six outward face planes, +X +Y +Z then -X -Y -Z
    pub fn planes(&self) -> [Plane; 6] {
        let max = self.max_position();
        let min = self.min_position();
        [
            Plane::from_origin_normal(max, directions::right()),
            Plane::from_origin_normal(max, directions::up()),
            Plane::from_origin_normal(max, directions::backward()),
            Plane::from_origin_normal(min, directions::left()),
            Plane::from_origin_normal(min, directions::down()),
            Plane::from_origin_normal(min, directions::forward()),
        ]
    }

    /// The eight corners, bottom face first
    pub fn corners(&self) -> [Vec3; 8] {
        let min = self.min_position();
        let s = self.size();
        let bottom = [
            min,
            Vec3::new(min.x + s.x, min.y, min.z),
            Vec3::new(min.x, min.y, min.z + s.z),
            Vec3::new(min.x + s.x, min.y, min.z + s.z),
        ];
        let lift = Vec3::new(0.0, s.y, 0.0);
        [
            bottom[0],
            bottom[1],
            bottom[2],
            bottom[3],
            bottom[0] + lift,
            bottom[1] + lift,
            bottom[2] + lift,
            bottom[3] + lift,
        ]
    }

    /// Clamp `point` into the box shrunk by `inset` on every side
    pub fn clamping(&self, point: &Vec3, inset: f32) -> Vec3 {
        let min = self.min_position().add_scalar(inset);
        let max = self.max_position().add_scalar(-inset);
        let mut clamped = *point;
        for i in 0..3 {
            clamped[i] = if clamped[i] < min[i] { min[i] } else { clamped[i].min(max[i]) };
        }
        clamped
    }

    /// The smallest box enclosing both boxes
    #[must_use]
    pub fn expanded_to_enclose(&self, other: &Self) -> Self {
        Self::from_positions(&[
            self.max_position(),
            self.min_position(),
            other.max_position(),
            other.min_position(),
        ])
    }

    /// Inflate the derived half-extents only
    #[must_use]
    pub fn scaled_radius(mut self, factor: f32) -> Self {
        self.radius *= factor;
        self
    }

    /// Face closest to an interior point: outward normal and distance to it
    pub(crate) fn nearest_face(&self, point: &Vec3) -> (Vec3, f32) {
        let local = point - self.position();
        let mut best = (directions::up(), f32::INFINITY);
        for i in 0..3 {
            let distance = self.radius[i] - local[i].abs();
            if distance < best.1 {
                let mut normal = Vec3::zeros();
                normal[i] = if local[i] < 0.0 { -1.0 } else { 1.0 };
                best = (normal, distance);
            }
        }
        best
    }

    pub(crate) fn moved_inside_ellipsoid_space(&self, radius: &Vec3) -> Self {
        Self::new(
            self.center.component_div(radius),
            self.offset.component_div(radius),
            self.radius.component_div(radius),
        )
    }

    fn interpenetration_box(&self, other: &Self) -> Option<Interpenetration> {
        if !self.is_colliding(other) {
            return None;
        }
        let position = self.position();
        if position == other.position() {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [position]));
        }

        // Least overlap among the axes the centers are apart on
        let delta = other.position() - position;
        let (axis, overlap) = (0..3)
            .filter(|&i| delta[i] != 0.0)
            .map(|i| (i, self.radius[i] + other.radius[i] - delta[i].abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let mut direction = Vec3::zeros();
        direction[axis] = delta[axis].signum();
        let overlap_min = self.min_position().sup(&other.min_position());
        let overlap_max = self.max_position().inf(&other.max_position());
        let point = (overlap_min + overlap_max) * 0.5;
        Some(Interpenetration::new(-overlap, direction, [point]))
    }

    fn interpenetration_sphere(&self, sphere: &Sphere) -> Option<Interpenetration> {
        let p1 = self.position();
        let p2 = sphere.position();
        if p1 == p2 {
            let top = p1 + Vec3::new(0.0, self.radius.y, 0.0);
            return Some(Interpenetration::new(-self.radius.y, directions::up(), [top]));
        }

        let point1 = sphere.closest_surface_point(&p1);
        if !self.contains(&point1, 0.0) {
            return None;
        }
        let point2 = self.closest_surface_point(&p2);

        let depth = -(point1 - point2).norm();
        if depth >= 0.0 {
            return None;
        }
        let direction = self.surface_normal(&point2);
        Some(Interpenetration::new(depth, direction, [point2]))
    }

    fn interpenetration_ellipsoid(&self, ellipsoid: &Ellipsoid) -> Option<Interpenetration> {
        let position = self.position();
        if position == ellipsoid.position() {
            let top = position + Vec3::new(0.0, self.radius.y, 0.0);
            return Some(Interpenetration::new(-self.radius.y, directions::up(), [top]));
        }

        let in_space = self.moved_inside_ellipsoid_space(&ellipsoid.radius());
        let contact = ellipsoid.unit_space_contact(|c| in_space.closest_surface_point(c))?;
        match contact.ellipsoid_point {
            Some(ellipsoid_point) => {
                let depth = -(contact.shape_point - ellipsoid_point).norm();
                let direction = self.surface_normal(&contact.shape_point);
                Some(Interpenetration::new(depth, direction, [contact.shape_point]))
            }
            None => {
                // Ellipsoid center inside the box: push out through the nearest face
                let (normal, distance) = self.nearest_face(&ellipsoid.position());
                let depth = -(distance + ellipsoid.support_distance(&normal));
                let point = ellipsoid.position() + normal * distance;
                Some(Interpenetration::new(depth, normal, [point]))
            }
        }
    }

    fn interpenetration_oriented(&self, obb: &OrientedBox) -> Option<Interpenetration> {
        let position = self.position();
        if position == obb.position() {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [position]));
        }

        let p1 = obb.closest_surface_point(&position);
        if !self.contains(&p1, 0.0) {
            return None;
        }
        let p2 = self.closest_surface_point(&obb.position());

        let depth = -(p1 - p2).norm();
        let direction = self.surface_normal(&p2);
        Some(Interpenetration::new(depth, direction, [p2]))
    }
}

impl ColliderShape for AxisAlignedBox {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn offset(&self) -> Vec3 {
        self.offset
    }

    fn bounding_box(&self) -> AxisAlignedBox {
        *self
    }

    fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.local_offset.component_mul(&transform.scale);
        self.radius = self.local_radius.component_mul(&transform.scale);
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.local_offset = transform.position;
        self.local_radius = transform.scale;
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        let min = self.min_position();
        let max = self.max_position();
        point.sup(&min).inf(&max)
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        match other {
            Collider::AxisAlignedBox(other) => self.interpenetration_box(other),
            Collider::Sphere(sphere) => self.interpenetration_sphere(sphere),
            Collider::Ellipsoid(ellipsoid) => self.interpenetration_ellipsoid(ellipsoid),
            Collider::OrientedBox(obb) => self.interpenetration_oriented(obb),
            Collider::Triangle(_) | Collider::Mesh(_) => unsupported_pairing(ShapeKind::AxisAlignedBox, other.kind()),
        }
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let min = self.min_position();
        let max = self.max_position();

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for i in 0..3 {
            let mut near = (min[i] - ray.origin[i]) / ray.direction[i];
            let mut far = (max[i] - ray.origin[i]) / ray.direction[i];
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            if t_min > far || near > t_max {
                return None;
            }
            t_min = t_min.max(near);
            t_max = t_max.min(far);
        }

        let t = t_min.min(t_max);
        (t > 0.0).then(|| ray.point_at(t))
    }

    #[allow(clippy::float_cmp)]
    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        let local = point - self.position();
        if local == Vec3::zeros() {
            return directions::forward();
        }

        let mut normal = directions::forward();
        let mut min = f32::INFINITY;
        for i in 0..3 {
            let distance = (self.radius[i] - local[i].abs()).abs();
            if distance < min && distance != self.radius[i] {
                min = distance;
                normal = Vec3::zeros();
                normal[i] = if local[i] > 0.0 { 1.0 } else { -1.0 };
            }
        }
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    fn unit_box(position: Vec3) -> AxisAlignedBox {
        AxisAlignedBox::new(position, Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_from_positions() {
        let aabb = AxisAlignedBox::from_positions(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, 4.0, -2.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        assert_eq!(aabb.center(), Vec3::zeros());
        assert_relative_eq!(aabb.offset(), Vec3::new(1.0, 2.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(aabb.radius(), Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(aabb.volume(), 64.0, epsilon = EPSILON);
    }

    #[test]
    fn test_update_never_compounds_scale() {
        let mut aabb = AxisAlignedBox::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let transform = Transform::from_position_scale(Vec3::new(5.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        aabb.update(&transform);
        aabb.update(&transform);
        assert_eq!(aabb.radius(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.offset(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(aabb.position(), Vec3::new(7.0, 0.0, 0.0));
        assert_eq!(aabb.local_radius(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_update_size_and_offset_only_touches_authored_values() {
        let mut aabb = unit_box(Vec3::new(3.0, 0.0, 0.0));
        aabb.update_size_and_offset(&Transform::from_position_scale(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 4.0, 4.0)));
        assert_eq!(aabb.center(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(aabb.radius(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.local_radius(), Vec3::new(4.0, 4.0, 4.0));

        aabb.update(&Transform::from_position(Vec3::zeros()));
        assert_eq!(aabb.radius(), Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(aabb.offset(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_contains_bounds() {
        let aabb = unit_box(Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.contains(&aabb.position(), 0.0));
        assert!(aabb.contains(&Vec3::new(2.0, 3.0, 4.0), 0.0));
        assert!(!aabb.contains(&Vec3::new(2.1, 2.0, 3.0), 0.0));
        assert!(aabb.contains(&Vec3::new(-0.4, 2.0, 3.0), 0.5));
        assert!(aabb.contains_box(&AxisAlignedBox::new(aabb.position(), Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)), 0.0));
        assert!(aabb.contains_any(&[Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0)]));
    }

    #[test]
    fn test_contains_monotonicity() {
        let aabb = AxisAlignedBox::new(Vec3::new(-2.0, 1.0, 0.5), Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let position = aabb.position();
        assert!(aabb.contains(&position, 0.0));
        for i in 0..3 {
            for sign in [-1.0, 1.0] {
                let mut point = position;
                point[i] += sign * (aabb.radius()[i] + 1.0 + 1e-3);
                assert!(!aabb.contains(&point, 0.0), "axis {i} sign {sign}");
            }
        }
    }

    #[test]
    fn test_closest_surface_point_clamps() {
        let aabb = unit_box(Vec3::zeros());
        assert_eq!(aabb.closest_surface_point(&Vec3::new(5.0, 0.5, -3.0)), Vec3::new(1.0, 0.5, -1.0));
        assert_eq!(aabb.closest_surface_point(&Vec3::new(0.2, 0.1, 0.0)), Vec3::new(0.2, 0.1, 0.0));
    }

    #[test]
    fn test_ray_hits_face_at_distance_d_minus_r() {
        let r = 1.5;
        let aabb = AxisAlignedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(r, r, r));
        for d in [2.0_f32, 5.0, 10.0] {
            let ray = Ray::new(Vec3::new(d, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
            let hit = aabb.surface_point(&ray).unwrap();
            assert_relative_eq!((hit - ray.origin).norm(), d - r, epsilon = 1e-5);

            let ray = Ray::new(Vec3::new(0.0, 0.0, -d), Vec3::new(0.0, 0.0, 1.0));
            let hit = aabb.surface_point(&ray).unwrap();
            assert_relative_eq!(hit.z, -r, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_ray_misses() {
        let aabb = unit_box(Vec3::zeros());
        assert!(aabb.surface_point(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))).is_none());
        assert!(aabb.surface_point(&Ray::new(Vec3::new(5.0, 3.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))).is_none());
        assert!(aabb.surface_point(&Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0))).is_none());
        assert!(aabb.is_colliding_with_ray(&Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn test_surface_normal() {
        let aabb = unit_box(Vec3::zeros());
        assert_eq!(aabb.surface_normal(&Vec3::new(1.0, 0.2, 0.3)), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(aabb.surface_normal(&Vec3::new(0.1, -0.95, 0.3)), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(aabb.surface_normal(&Vec3::new(0.1, 0.2, 1.0)), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.surface_normal(&Vec3::zeros()), directions::forward());
    }

    #[test]
    fn test_box_box_symmetry() {
        let a = unit_box(Vec3::zeros());
        let b = unit_box(Vec3::new(1.5, 0.0, 0.0));
        let ab = a.interpenetration_box(&b).unwrap();
        let ba = b.interpenetration_box(&a).unwrap();
        assert!(ab.is_colliding() && ba.is_colliding());
        assert_relative_eq!(ab.depth, ba.depth, epsilon = EPSILON);
        assert_relative_eq!(ab.direction, -ba.direction, epsilon = EPSILON);
        assert_eq!(ab.direction, Vec3::x());
    }

    #[test]
    fn test_box_box_depth_is_least_overlap() {
        let small = unit_box(Vec3::zeros());
        let large = AxisAlignedBox::new(Vec3::new(2.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));

        let ab = small.interpenetration_box(&large).unwrap();
        let ba = large.interpenetration_box(&small).unwrap();
        assert_relative_eq!(ab.depth, -0.5, epsilon = EPSILON);
        assert_relative_eq!(ba.depth, -0.5, epsilon = EPSILON);
        assert_eq!(ab.direction, Vec3::x());
        assert_eq!(ba.direction, -Vec3::x());
        assert_relative_eq!(ab.points[0], Vec3::new(0.75, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(ab.points[0], ba.points[0], epsilon = EPSILON);
    }

    #[test]
    fn test_box_box_picks_shallowest_axis() {
        let a = AxisAlignedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(3.0, 1.0, 1.0));
        let b = unit_box(Vec3::new(0.5, -1.75, 0.0));
        let hit = a.interpenetration_box(&b).unwrap();
        assert_relative_eq!(hit.depth, -0.25, epsilon = EPSILON);
        assert_eq!(hit.direction, -Vec3::y());
    }

    #[test]
    fn test_box_box_separated() {
        let a = unit_box(Vec3::zeros());
        let b = unit_box(Vec3::new(2.5, 0.0, 0.0));
        assert!(a.interpenetration_box(&b).is_none());
    }

    #[test]
    fn test_coincident_boxes_resolve_upward() {
        let a = unit_box(Vec3::new(1.0, 1.0, 1.0));
        let b = AxisAlignedBox::new(Vec3::new(1.0, 1.0, 1.0), Vec3::zeros(), Vec3::new(3.0, 0.5, 2.0));
        let hit = a.interpenetration_box(&b).unwrap();
        assert!(hit.is_colliding());
        assert_eq!(hit.direction, directions::up());
        assert_eq!(hit.depth, COINCIDENT_DEPTH);
    }

    #[test]
    fn test_box_sphere() {
        let aabb = unit_box(Vec3::zeros());
        let sphere = Sphere::new(Vec3::new(1.5, 0.0, 0.0), Vec3::zeros(), 1.0);
        let hit = aabb.interpenetration_sphere(&sphere).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.5, epsilon = 1e-5);
        assert_eq!(hit.direction, Vec3::x());
        assert_relative_eq!(hit.points[0], Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);

        let far = Sphere::new(Vec3::new(2.5, 0.0, 0.0), Vec3::zeros(), 1.0);
        assert!(aabb.interpenetration_sphere(&far).is_none());
    }

    #[test]
    fn test_box_sphere_coincident_contacts_top() {
        let aabb = AxisAlignedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 2.0, 1.0));
        let sphere = Sphere::new(Vec3::zeros(), Vec3::zeros(), 0.5);
        let hit = aabb.interpenetration_sphere(&sphere).unwrap();
        assert_eq!(hit.depth, -2.0);
        assert_eq!(hit.points, vec![Vec3::new(0.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_box_ellipsoid() {
        let aabb = unit_box(Vec3::zeros());
        let ellipsoid = Ellipsoid::new(Vec3::new(2.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0));
        let hit = aabb.interpenetration_ellipsoid(&ellipsoid).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.5, epsilon = 1e-5);
        assert_eq!(hit.direction, Vec3::x());

        let far = Ellipsoid::new(Vec3::new(3.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0));
        assert!(aabb.interpenetration_ellipsoid(&far).is_none());
    }

    #[test]
    fn test_box_ellipsoid_center_inside() {
        let aabb = AxisAlignedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let ellipsoid = Ellipsoid::new(Vec3::new(1.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let hit = aabb.interpenetration_ellipsoid(&ellipsoid).unwrap();
        assert!(hit.is_colliding());
        assert_eq!(hit.direction, Vec3::x());
        assert_relative_eq!(hit.depth, -1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_box_oriented_box() {
        let aabb = unit_box(Vec3::zeros());
        let obb = OrientedBox::new(Vec3::new(1.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), crate::foundation::math::Quat::identity());
        let hit = aabb.interpenetration_oriented(&obb).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.5, epsilon = 1e-5);
        assert_eq!(hit.direction, Vec3::x());
    }

    #[test]
    fn test_clamping_and_enclosing() {
        let aabb = unit_box(Vec3::zeros());
        assert_eq!(aabb.clamping(&Vec3::new(3.0, -3.0, 0.0), 0.25), Vec3::new(0.75, -0.75, 0.0));

        let other = unit_box(Vec3::new(4.0, 0.0, 0.0));
        let both = aabb.expanded_to_enclose(&other);
        assert_relative_eq!(both.position(), Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(both.radius(), Vec3::new(3.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_planes_face_outward() {
        let aabb = unit_box(Vec3::zeros());
        for plane in aabb.planes() {
            assert!(plane.distance_to_point(&Vec3::zeros()) < 0.0);
            assert_relative_eq!(plane.distance_to_point(&(plane.normal * 1.0)), 0.0, epsilon = EPSILON);
        }
        let corners = aabb.corners();
        assert_eq!(corners[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(corners[7], Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "unsupported collider pairing")]
    fn test_triangle_pairing_panics() {
        let aabb = unit_box(Vec3::zeros());
        let triangle = Collider::Triangle(crate::physics::collision::triangle::Triangle::new(
            Vec3::zeros(),
            Vec3::x(),
            Vec3::y(),
        ));
        let _ = aabb.interpenetration(&triangle);
    }
}
