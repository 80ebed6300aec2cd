//! Sphere collider

use crate::foundation::math::{constants, directions, utils, Transform, Vec3};

use super::aabb::AxisAlignedBox;
use super::ellipsoid::Ellipsoid;
use super::obb::OrientedBox;
use super::primitives::{Interpenetration, Ray};
use super::shape::{Collider, ColliderShape};
use super::tolerance::COINCIDENT_DEPTH;

/// A sphere with a scalar radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    offset: Vec3,
    radius: f32,
    local_offset: Vec3,
    local_radius: f32,
    bounding_box: AxisAlignedBox,
}

impl Sphere {
    /// Create a sphere; offset and radius become the authored values
    pub fn new(center: Vec3, offset: Vec3, radius: f32) -> Self {
        Self {
            center,
            offset,
            radius,
            local_offset: offset,
            local_radius: radius,
            bounding_box: AxisAlignedBox::new(center, offset, Vec3::repeat(radius)),
        }
    }

    /// Sphere around the bounding-box center of `positions`
    ///
    /// The radius is the largest *squared* distance to that center, which
    /// over-estimates the enclosing radius whenever it exceeds 1.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let offset = AxisAlignedBox::from_positions(positions).position();
        let radius = positions
            .iter()
            .map(|p| (offset - p).norm_squared())
            .fold(0.0_f32, f32::max);
        Self::new(Vec3::zeros(), offset, radius)
    }

    /// Derived radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Authored radius
    pub const fn local_radius(&self) -> f32 {
        self.local_radius
    }

    /// Authored offset
    pub const fn local_offset(&self) -> Vec3 {
        self.local_offset
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        4.0 * constants::PI * self.radius.powi(3) / 3.0
    }

    /// True when `point` is strictly inside the sphere grown by `threshold`
    pub fn contains(&self, point: &Vec3, threshold: f32) -> bool {
        (point - self.position()).norm() < self.radius + threshold
    }

    /// Overlap test against another sphere, touching counts
    pub fn is_colliding(&self, other: &Self) -> bool {
        let sum = self.radius + other.radius;
        (self.position() - other.position()).norm_squared() <= sum * sum
    }

    fn refresh_bounding_box(&mut self) {
        self.bounding_box = AxisAlignedBox::new(self.center, self.offset, Vec3::repeat(self.radius));
    }

    fn interpenetration_sphere(&self, other: &Self) -> Option<Interpenetration> {
        let p1 = self.position();
        let p2 = other.position();
        if p1 == p2 {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [p1]));
        }

        let radius_sum = self.radius + other.radius;
        let distance = (p2 - p1).norm();
        if distance >= radius_sum {
            return None;
        }

        let direction = utils::direction(&p1, &p2);
        let point = self.closest_surface_point(&p2);
        Some(Interpenetration::new(distance - radius_sum, direction, [point]))
    }

    fn interpenetration_ellipsoid(&self, ellipsoid: &Ellipsoid) -> Option<Interpenetration> {
        let position = self.position();
        if position == ellipsoid.position() {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [position]));
        }

        let radius_in_space = self.radius / utils::component_mean(&ellipsoid.radius());
        let contact = ellipsoid.unit_sphere_contact(&position, radius_in_space)?;
        let point = self.closest_surface_point(&contact.point);
        Some(Interpenetration::new(contact.depth, contact.direction, [point]))
    }

    fn interpenetration_oriented(&self, obb: &OrientedBox) -> Option<Interpenetration> {
        let position = self.position();
        if position == obb.position() {
            return Some(Interpenetration::new(COINCIDENT_DEPTH, directions::up(), [position]));
        }

        let point = obb.closest_surface_point(&position);
        let distance = (point - position).norm();
        if distance >= self.radius {
            return None;
        }
        if distance > 0.0 {
            let direction = self.surface_normal(&point);
            return Some(Interpenetration::new(distance - self.radius, direction, [point]));
        }

        // Center inside the box: the box escapes through its nearest face
        let (normal, to_face) = obb.nearest_face(&position);
        let face_point = position + normal * to_face;
        Some(Interpenetration::new(-(self.radius + to_face), -normal, [face_point]))
    }
}

impl ColliderShape for Sphere {
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
        self.radius = self.local_radius * utils::component_mean(&transform.scale);
        self.refresh_bounding_box();
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.local_offset = transform.position;
        self.local_radius = utils::component_mean(&transform.scale) / 2.0;
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        let position = self.position();
        position + utils::direction(&position, point) * self.radius
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        match other {
            Collider::Sphere(other) => self.interpenetration_sphere(other),
            Collider::Ellipsoid(ellipsoid) => self.interpenetration_ellipsoid(ellipsoid),
            Collider::OrientedBox(obb) => self.interpenetration_oriented(obb),
            Collider::AxisAlignedBox(_) | Collider::Triangle(_) | Collider::Mesh(_) => {
                other.interpenetration(&Collider::Sphere(*self)).map(Interpenetration::reversed)
            }
        }
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let l = self.position() - ray.origin;
        let tca = l.dot(&ray.direction);
        if tca < 0.0 {
            return None;
        }
        let d2 = l.dot(&l) - tca * tca;
        let radius2 = self.radius * self.radius;
        if d2 > radius2 {
            return None;
        }
        let thc = (radius2 - d2).sqrt();
        let (t0, t1) = (tca - thc, tca + thc);

        let t = if t0 >= 0.0 { t0 } else { t1 };
        (t >= 0.0).then(|| ray.point_at(t))
    }

    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        utils::direction(&self.position(), point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_unit_spheres_one_apart() {
        let a = Sphere::new(Vec3::zeros(), Vec3::zeros(), 1.0);
        let b = Sphere::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), 1.0);
        let hit = a.interpenetration(&Collider::Sphere(b)).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -1.0, epsilon = EPSILON);
        assert_relative_eq!(hit.direction, Vec3::x(), epsilon = EPSILON);
        assert_relative_eq!(hit.points[0], Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_sphere_sphere_symmetry() {
        let a = Sphere::new(Vec3::new(0.0, 1.0, 0.0), Vec3::zeros(), 2.0);
        let b = Sphere::new(Vec3::new(1.0, 2.0, 2.0), Vec3::zeros(), 2.0);
        let ab = a.interpenetration(&Collider::Sphere(b)).unwrap();
        let ba = b.interpenetration(&Collider::Sphere(a)).unwrap();
        assert_eq!(ab.is_colliding(), ba.is_colliding());
        assert_relative_eq!(ab.depth, ba.depth, epsilon = EPSILON);
        assert_relative_eq!(ab.direction, -ba.direction, epsilon = EPSILON);
    }

    #[test]
    fn test_separated_and_coincident_spheres() {
        let a = Sphere::new(Vec3::zeros(), Vec3::zeros(), 1.0);
        let far = Sphere::new(Vec3::new(2.0, 0.0, 0.0), Vec3::zeros(), 1.0);
        assert!(a.interpenetration(&Collider::Sphere(far)).is_none());

        let same = Sphere::new(Vec3::zeros(), Vec3::zeros(), 0.25);
        let hit = a.interpenetration(&Collider::Sphere(same)).unwrap();
        assert!(hit.is_colliding());
        assert_eq!(hit.direction, directions::up());
    }

    #[test]
    fn test_update_scales_radius_by_mean_scale() {
        let mut sphere = Sphere::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), 2.0);
        let transform = Transform::from_position_scale(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        sphere.update(&transform);
        sphere.update(&transform);
        assert_relative_eq!(sphere.radius(), 4.0, epsilon = EPSILON);
        assert_eq!(sphere.position(), Vec3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(sphere.bounding_box().radius(), Vec3::repeat(4.0), epsilon = EPSILON);

        sphere.update(&Transform::identity());
        assert_relative_eq!(sphere.radius(), 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_from_positions_keeps_squared_radius() {
        let sphere = Sphere::from_positions(&[Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]);
        assert_eq!(sphere.position(), Vec3::zeros());
        assert_relative_eq!(sphere.radius(), 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_ray_intersection() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), Vec3::zeros(), 1.0);
        let hit = sphere.surface_point(&Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0))).unwrap();
        assert_relative_eq!(hit, Vec3::new(0.0, 0.0, -4.0), epsilon = 1e-5);

        assert!(sphere.surface_point(&Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0))).is_none());
        assert!(sphere.surface_point(&Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0))).is_none());

        let impact = sphere.surface_impact(&Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0))).unwrap();
        assert_relative_eq!(impact.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_oriented_box() {
        let sphere = Sphere::new(Vec3::new(0.0, 1.5, 0.0), Vec3::zeros(), 1.0);
        let obb = OrientedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Quat::identity());
        let hit = sphere.interpenetration(&Collider::OrientedBox(obb)).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.5, epsilon = 1e-5);
        assert_relative_eq!(hit.direction, -Vec3::y(), epsilon = EPSILON);

        let reversed = obb.interpenetration(&Collider::Sphere(sphere)).unwrap();
        assert_relative_eq!(reversed.direction, Vec3::y(), epsilon = EPSILON);
        assert_relative_eq!(reversed.depth, hit.depth, epsilon = EPSILON);
    }

    #[test]
    fn test_sphere_center_inside_oriented_box() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.5, 0.0), Vec3::zeros(), 0.25);
        let obb = OrientedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(2.0, 1.0, 2.0), Quat::identity());
        let hit = sphere.interpenetration(&Collider::OrientedBox(obb)).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.75, epsilon = 1e-5);
        assert_relative_eq!(hit.direction, -Vec3::y(), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_ellipsoid() {
        let sphere = Sphere::new(Vec3::zeros(), Vec3::zeros(), 1.0);
        let ellipsoid = Ellipsoid::new(Vec3::new(2.5, 0.0, 0.0), Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let hit = sphere.interpenetration(&Collider::Ellipsoid(ellipsoid)).unwrap();
        assert!(hit.is_colliding());
        assert_relative_eq!(hit.depth, -0.5, epsilon = 1e-5);
        assert_relative_eq!(hit.direction, Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(hit.points[0], Vec3::x(), epsilon = 1e-5);

        let reversed = ellipsoid.interpenetration(&Collider::Sphere(sphere)).unwrap();
        assert_relative_eq!(reversed.direction, -Vec3::x(), epsilon = 1e-5);
    }
}
