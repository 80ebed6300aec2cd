//! Ellipsoid collider
//!
//! Queries against an ellipsoid are answered in *ellipsoid space*: every
//! position and extent is divided component-wise by the ellipsoid's semi-axes,
//! which turns the ellipsoid into a unit sphere. The answer is mapped back by
//! multiplying with the semi-axes again.

use crate::foundation::math::{constants, directions, utils, Transform, Vec3};

use super::aabb::AxisAlignedBox;
use super::primitives::{Interpenetration, Ray};
use super::shape::{Collider, ColliderShape};
use super::tolerance::COINCIDENT_DEPTH;

/// An ellipsoid with three semi-axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    center: Vec3,
    offset: Vec3,
    radius: Vec3,
    local_offset: Vec3,
    local_radius: Vec3,
    bounding_box: AxisAlignedBox,
}

/// Contact between an ellipsoid and a shape already mapped into its space
pub(crate) struct UnitSpaceContact {
    /// The shape's closest point to the ellipsoid center, in world space
    pub shape_point: Vec3,
    /// The ellipsoid surface point facing `shape_point`, `None` when the
    /// shape contains the ellipsoid center
    pub ellipsoid_point: Option<Vec3>,
}

/// Contact between an ellipsoid and a sphere measured in ellipsoid space
pub(crate) struct UnitSphereContact {
    pub depth: f32,
    /// From the sphere toward the ellipsoid
    pub direction: Vec3,
    /// Deepest point of the sphere, in world space
    pub point: Vec3,
}

impl Ellipsoid {
    /// Create an ellipsoid; offset and radius become the authored values
    pub fn new(center: Vec3, offset: Vec3, radius: Vec3) -> Self {
        Self {
            center,
            offset,
            radius,
            local_offset: offset,
            local_radius: radius,
            bounding_box: AxisAlignedBox::new(center, offset, radius),
        }
    }

    /// The ellipsoid inscribed in a box's authored extents
    pub fn from_box(aabb: &AxisAlignedBox) -> Self {
        Self::new(aabb.center(), aabb.local_offset(), aabb.local_radius())
    }

    /// Derived semi-axes
    pub const fn radius(&self) -> Vec3 {
        self.radius
    }

    /// Authored semi-axes
    pub const fn local_radius(&self) -> Vec3 {
        self.local_radius
    }

    /// Authored offset
    pub const fn local_offset(&self) -> Vec3 {
        self.local_offset
    }

    /// Full extents
    pub fn size(&self) -> Vec3 {
        self.radius * 2.0
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        4.0 / 3.0 * constants::PI * self.radius.x * self.radius.y * self.radius.z
    }

    /// True when `point` is strictly inside the ellipsoid, the unit sphere
    /// being grown by `threshold` in ellipsoid space
    pub fn contains(&self, point: &Vec3, threshold: f32) -> bool {
        (point - self.position()).component_div(&self.radius).norm() < 1.0 + threshold
    }

    /// Distance from the center to the supporting plane with normal `normal`
    pub(crate) fn support_distance(&self, normal: &Vec3) -> f32 {
        self.radius.component_mul(normal).norm()
    }

    /// Run a closest-point query in ellipsoid space
    ///
    /// `closest` receives the ellipsoid center in ellipsoid space and must
    /// return the other shape's closest point to it, also in ellipsoid space.
    /// Returns `None` when that point is outside the unit sphere.
    pub(crate) fn unit_space_contact(&self, closest: impl FnOnce(&Vec3) -> Vec3) -> Option<UnitSpaceContact> {
        let center = self.position().component_div(&self.radius);
        let point = closest(&center);
        let to_point = point - center;
        if to_point.norm_squared() > 1.0 {
            return None;
        }

        let ellipsoid_point = to_point
            .try_normalize(f32::EPSILON)
            .map(|dir| (center + dir).component_mul(&self.radius));
        Some(UnitSpaceContact {
            shape_point: point.component_mul(&self.radius),
            ellipsoid_point,
        })
    }

    /// Overlap with a sphere at `position` whose radius in ellipsoid space
    /// is `radius_in_space`
    pub(crate) fn unit_sphere_contact(&self, position: &Vec3, radius_in_space: f32) -> Option<UnitSphereContact> {
        let sphere_center = position.component_div(&self.radius);
        let ellipsoid_center = self.position().component_div(&self.radius);
        let distance = (ellipsoid_center - sphere_center).norm();
        if distance >= radius_in_space + 1.0 {
            return None;
        }

        let direction_in_space = utils::direction(&sphere_center, &ellipsoid_center);
        let depth_in_space = distance - radius_in_space - 1.0;
        let displacement = direction_in_space.component_mul(&self.radius);
        let length = displacement.norm();

        Some(UnitSphereContact {
            depth: depth_in_space * length,
            direction: displacement / length,
            point: (sphere_center + direction_in_space * radius_in_space).component_mul(&self.radius),
        })
    }

    fn interpenetration_ellipsoid(&self, other: &Self) -> Option<Interpenetration> {
        let position = self.position();
        if position == other.position() {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [position]));
        }

        let radius_in_space = utils::component_mean(&self.radius.component_div(&other.radius));
        let contact = other.unit_sphere_contact(&position, radius_in_space)?;
        let point = self.closest_surface_point(&contact.point);
        Some(Interpenetration::new(contact.depth, contact.direction, [point]))
    }
}

impl ColliderShape for Ellipsoid {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn offset(&self) -> Vec3 {
        self.offset
    }

    fn bounding_box(&self) -> AxisAlignedBox {
        self.bounding_box
    }

    fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.local_offset.component_mul(&transform.scale);
        self.radius = self.local_radius.component_mul(&transform.scale);
        self.bounding_box = AxisAlignedBox::new(self.center, self.offset, self.radius);
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.local_offset = transform.position;
        self.local_radius = transform.scale / 2.0;
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        let position = self.position();
        let direction = (point - position)
            .component_div(&self.radius)
            .try_normalize(0.0)
            .unwrap_or_else(directions::up);
        position + direction.component_mul(&self.radius)
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        match other {
            Collider::Ellipsoid(other) => self.interpenetration_ellipsoid(other),
            Collider::AxisAlignedBox(_)
            | Collider::OrientedBox(_)
            | Collider::Sphere(_)
            | Collider::Triangle(_)
            | Collider::Mesh(_) => other.interpenetration(&Collider::Ellipsoid(*self)).map(Interpenetration::reversed),
        }
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let ray = ray.moved_inside_ellipsoid_space(&self.radius);

        let l = self.position().component_div(&self.radius) - ray.origin;
        let tca = l.dot(&ray.direction);
        if tca < 0.0 {
            return None;
        }
        let d2 = l.dot(&l) - tca * tca;
        if d2 > 1.0 {
            return None;
        }
        let thc = (1.0 - d2).sqrt();
        let (t0, t1) = (tca - thc, tca + thc);

        let t = if t0 >= 0.0 { t0 } else { t1 };
        (t >= 0.0).then(|| ray.point_at(t).component_mul(&self.radius))
    }

    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        let from = self.position().component_div(&self.radius);
        let to = point.component_div(&self.radius);
        utils::direction(&from, &to)
            .component_mul(&self.radius)
            .try_normalize(0.0)
            .unwrap_or_else(directions::up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn stretched(position: Vec3) -> Ellipsoid {
        Ellipsoid::new(position, Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0))
    }

    #[test]
    fn test_volume_and_size() {
        let ellipsoid = Ellipsoid::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(ellipsoid.volume(), 8.0 * constants::PI, epsilon = EPSILON);
        assert_eq!(ellipsoid.size(), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_from_box_uses_authored_extents() {
        let mut aabb = AxisAlignedBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        aabb.update(&Transform::from_position_scale(Vec3::zeros(), Vec3::new(5.0, 5.0, 5.0)));
        let ellipsoid = Ellipsoid::from_box(&aabb);
        assert_eq!(ellipsoid.radius(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_contains() {
        let ellipsoid = stretched(Vec3::new(1.0, 0.0, 0.0));
        assert!(ellipsoid.contains(&Vec3::new(2.9, 0.0, 0.0), 0.0));
        assert!(!ellipsoid.contains(&Vec3::new(1.0, 1.1, 0.0), 0.0));
        assert!(ellipsoid.contains(&Vec3::new(1.0, 1.1, 0.0), 0.2));
    }

    #[test]
    fn test_update_scales_from_authored_values() {
        let mut ellipsoid = stretched(Vec3::zeros());
        let transform = Transform::from_position_scale(Vec3::new(0.0, 3.0, 0.0), Vec3::new(2.0, 3.0, 4.0));
        ellipsoid.update(&transform);
        ellipsoid.update(&transform);
        assert_eq!(ellipsoid.radius(), Vec3::new(4.0, 3.0, 4.0));
        assert_eq!(ellipsoid.bounding_box().radius(), Vec3::new(4.0, 3.0, 4.0));
        assert_eq!(ellipsoid.bounding_box().position(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_closest_surface_point() {
        let ellipsoid = stretched(Vec3::zeros());
        assert_relative_eq!(ellipsoid.closest_surface_point(&Vec3::new(9.0, 0.0, 0.0)), Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(ellipsoid.closest_surface_point(&Vec3::new(0.0, -4.0, 0.0)), Vec3::new(0.0, -1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(ellipsoid.closest_surface_point(&Vec3::zeros()), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_ray_hits_stretched_axis() {
        let ellipsoid = stretched(Vec3::zeros());
        let hit = ellipsoid.surface_point(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))).unwrap();
        assert_relative_eq!(hit, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);

        let impact = ellipsoid.surface_impact(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0))).unwrap();
        assert_relative_eq!(impact.position, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(impact.normal, Vec3::y(), epsilon = EPSILON);

        assert!(ellipsoid.surface_point(&Ray::new(Vec3::new(5.0, 2.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))).is_none());
        assert!(ellipsoid.surface_point(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))).is_none());
    }

    #[test]
    fn test_surface_normal_is_unit_length() {
        let ellipsoid = stretched(Vec3::zeros());
        assert_relative_eq!(ellipsoid.surface_normal(&Vec3::new(2.0, 0.0, 0.0)), Vec3::x(), epsilon = EPSILON);
        let normal = ellipsoid.surface_normal(&Vec3::new(1.0, 0.5, 0.3));
        assert_relative_eq!(normal.norm(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_ellipsoid_ellipsoid_symmetry() {
        let a = stretched(Vec3::zeros());
        let b = stretched(Vec3::new(1.5, 0.0, 0.0));
        let ab = a.interpenetration(&Collider::Ellipsoid(b)).unwrap();
        let ba = b.interpenetration(&Collider::Ellipsoid(a)).unwrap();
        assert!(ab.is_colliding() && ba.is_colliding());
        assert_relative_eq!(ab.depth, -2.5, epsilon = EPSILON);
        assert_relative_eq!(ab.depth, ba.depth, epsilon = EPSILON);
        assert_relative_eq!(ab.direction, Vec3::x(), epsilon = EPSILON);
        assert_relative_eq!(ab.direction, -ba.direction, epsilon = EPSILON);
    }

    #[test]
    fn test_separated_ellipsoids() {
        let a = stretched(Vec3::zeros());
        let b = stretched(Vec3::new(4.5, 0.0, 0.0));
        assert!(a.interpenetration(&Collider::Ellipsoid(b)).is_none());
    }

    #[test]
    fn test_coincident_ellipsoids() {
        let a = stretched(Vec3::new(1.0, 2.0, 3.0));
        let b = Ellipsoid::new(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros(), Vec3::new(0.5, 3.0, 1.0));
        let hit = a.interpenetration(&Collider::Ellipsoid(b)).unwrap();
        assert!(hit.is_colliding());
        assert_eq!(hit.direction, directions::up());
    }

    #[test]
    fn test_support_distance() {
        let ellipsoid = Ellipsoid::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(ellipsoid.support_distance(&Vec3::y()), 2.0, epsilon = EPSILON);
        assert_relative_eq!(ellipsoid.support_distance(&-Vec3::z()), 3.0, epsilon = EPSILON);
    }
}
