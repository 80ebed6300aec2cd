//! Triangle collider
//!
//! Triangles are one-sided: contacts always push along the face normal.
//! They collide with spheres, ellipsoids and oriented boxes only.

use crate::foundation::math::{self, utils, Mat4, Transform, Vec3, Vec4};

use super::aabb::AxisAlignedBox;
use super::attributes::{CollisionAttributes, TriangleUvs};
use super::ellipsoid::Ellipsoid;
use super::obb::OrientedBox;
use super::primitives::{Interpenetration, LineSegment, Plane, Ray};
use super::shape::{unsupported_pairing, Collider, ColliderShape, ShapeKind};
use super::sphere::Sphere;
use super::surface::Surface;
use super::tolerance::{POTENTIAL_CONTACT_INFLATION, RAY_PARALLEL_EPSILON};

/// Opaque white, the default vertex color
pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

/// A triangle with per-vertex colors and collision attributes
///
/// `normal` and `center` are cached; call [`Triangle::recompute_all`] after
/// editing `positions` directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    /// RGBA per vertex, carried for rendering
    pub colors: [Vec4; 3],
    pub normal: Vec3,
    pub center: Vec3,
    pub raw_attributes: u64,
}

impl Triangle {
    /// Create a white triangle with no attributes; the normal follows the
    /// right-hand rule
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self {
            positions: [p1, p2, p3],
            colors: [WHITE; 3],
            normal: face_normal(&p1, &p2, &p3),
            center: (p1 + p2 + p3) / 3.0,
            raw_attributes: 0,
        }
    }

    /// Triangle from painted geometry, shifted by `offset`
    pub fn from_uvs(positions: [Vec3; 3], offset: Vec3, uv_sets: &[TriangleUvs]) -> Self {
        Self::new(positions[0] + offset, positions[1] + offset, positions[2] + offset)
            .with_attributes(CollisionAttributes::from_uvs(uv_sets))
    }

    /// Replace the cached normal
    #[must_use]
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    /// Replace the vertex colors
    #[must_use]
    pub fn with_colors(mut self, colors: [Vec4; 3]) -> Self {
        self.colors = colors;
        self
    }

    /// Replace the raw attribute word
    #[must_use]
    pub fn with_raw_attributes(mut self, raw: u64) -> Self {
        self.raw_attributes = raw;
        self
    }

    /// Replace the attributes
    #[must_use]
    pub fn with_attributes(self, attributes: CollisionAttributes) -> Self {
        self.with_raw_attributes(attributes.raw())
    }

    pub fn attributes(&self) -> CollisionAttributes {
        CollisionAttributes::from_raw(self.raw_attributes)
    }

    pub fn set_attributes(&mut self, attributes: CollisionAttributes) {
        self.raw_attributes = attributes.raw();
    }

    pub const fn p1(&self) -> Vec3 {
        self.positions[0]
    }

    pub const fn p2(&self) -> Vec3 {
        self.positions[1]
    }

    pub const fn p3(&self) -> Vec3 {
        self.positions[2]
    }

    /// The plane through the center, facing along the normal
    pub fn plane(&self) -> Plane {
        Plane::from_origin_normal(self.center, self.normal)
    }

    pub fn recompute_center(&mut self) {
        self.center = (self.p1() + self.p2() + self.p3()) / 3.0;
    }

    pub fn recompute_normal(&mut self) {
        self.normal = face_normal(&self.p1(), &self.p2(), &self.p3());
    }

    /// True when the vertices span no area
    pub fn is_degenerate(&self) -> bool {
        (self.p2() - self.p1())
            .cross(&(self.p3() - self.p1()))
            .try_normalize(f32::EPSILON)
            .is_none()
    }

    pub fn recompute_all(&mut self) {
        self.recompute_center();
        self.recompute_normal();
    }

    /// The edge closest to `point`
    pub fn edge_near(&self, point: &Vec3) -> LineSegment {
        let edges = [
            LineSegment::new(self.p1(), self.p2()),
            LineSegment::new(self.p1(), self.p3()),
            LineSegment::new(self.p2(), self.p3()),
        ];
        let distance = |edge: &LineSegment| (edge.closest_point(point) - point).norm();
        let mut nearest = edges[0];
        for edge in &edges[1..] {
            if distance(edge) < distance(&nearest) {
                nearest = *edge;
            }
        }
        nearest
    }

    /// In-plane direction perpendicular to the edge nearest `point`
    pub fn edge_normal(&self, point: &Vec3) -> Vec3 {
        let edge = self.edge_near(point);
        self.normal.cross(&utils::direction(&edge.p1, &edge.p2))
    }

    /// True when `point`, projected onto the triangle's plane, is inside it
    pub fn contains(&self, point: &Vec3) -> bool {
        let e10 = self.p2() - self.p1();
        let e20 = self.p3() - self.p1();
        let a = e10.dot(&e10);
        let b = e10.dot(&e20);
        let c = e20.dot(&e20);
        let ac_bb = a * c - b * b;

        let vp = point - self.p1();
        let d = vp.dot(&e10);
        let e = vp.dot(&e20);
        let x = d * c - e * b;
        let y = e * a - d * b;
        let z = x + y - ac_bb;
        z < 0.0 && x >= 0.0 && y >= 0.0
    }

    /// Blend toward `rhs`, taking its attributes
    ///
    /// The normal is rebuilt from the blended positions when the blended
    /// normal degenerates.
    pub fn interpolated(&self, rhs: &Self, t: f32) -> Self {
        let positions: [Vec3; 3] = std::array::from_fn(|i| self.positions[i].lerp(&rhs.positions[i], t));
        let colors: [Vec4; 3] = std::array::from_fn(|i| self.colors[i].lerp(&rhs.colors[i], t));

        let mut triangle = Self::new(positions[0], positions[1], positions[2])
            .with_colors(colors)
            .with_raw_attributes(rhs.raw_attributes);
        let blended = self.normal.lerp(&rhs.normal, t);
        if utils::is_finite(&blended) {
            if let Some(normal) = blended.try_normalize(f32::EPSILON) {
                triangle.normal = normal;
            }
        }
        triangle
    }

    /// Apply a transform matrix; the normal is recomputed
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::new(
            math::transform_point(matrix, self.p1()),
            math::transform_point(matrix, self.p2()),
            math::transform_point(matrix, self.p3()),
        )
        .with_colors(self.colors)
        .with_raw_attributes(self.raw_attributes)
    }

    pub(crate) fn moved_inside_ellipsoid_space(&self, radius: &Vec3) -> Self {
        let mut triangle = Self::new(
            self.p1().component_div(radius),
            self.p2().component_div(radius),
            self.p3().component_div(radius),
        );
        triangle.normal = self
            .normal
            .component_div(radius)
            .try_normalize(0.0)
            .unwrap_or(triangle.normal);
        triangle.colors = self.colors;
        triangle.raw_attributes = self.raw_attributes;
        triangle
    }

    /// Cheap pre-filter: does the triangle come near `other`'s inflated
    /// bounding box
    pub fn is_potentially_colliding(&self, other: &Collider) -> bool {
        let bounds = other.bounding_box().scaled_radius(POTENTIAL_CONTACT_INFLATION);
        let point = self.closest_surface_point(&bounds.position());
        bounds.contains(&point, 0.0)
    }

    fn interpenetration_sphere(&self, sphere: &Sphere) -> Option<Interpenetration> {
        let position = sphere.position();
        let p = self.closest_surface_point(&position);
        let v = p - position;
        if v.norm_squared() > sphere.radius() * sphere.radius() {
            return None;
        }

        // Sphere center on the triangle
        if v == Vec3::zeros() {
            return Some(Interpenetration::new(-sphere.radius(), self.normal, [p]));
        }

        let point = sphere.closest_surface_point(&p);
        let depth = -(p - point).norm();
        depth
            .is_finite()
            .then(|| Interpenetration::new(depth, self.normal, [point]))
    }

    fn interpenetration_ellipsoid(&self, ellipsoid: &Ellipsoid) -> Option<Interpenetration> {
        let in_space = self.moved_inside_ellipsoid_space(&ellipsoid.radius());
        let contact = ellipsoid.unit_space_contact(|c| in_space.closest_surface_point(c))?;

        let (depth, point) = match contact.ellipsoid_point {
            Some(point) => (-(contact.shape_point - point).norm(), point),
            None => (-ellipsoid.support_distance(&self.normal), contact.shape_point),
        };
        depth
            .is_finite()
            .then(|| Interpenetration::new(depth, self.normal, [point]))
    }

    fn interpenetration_oriented(&self, obb: &OrientedBox) -> Option<Interpenetration> {
        let p = self.closest_surface_point(&obb.position());
        if !obb.contains(&p) {
            return None;
        }

        let separation = self.normal.dot(&(obb.position() - self.center));
        let reach: f32 = obb
            .axes()
            .iter()
            .enumerate()
            .map(|(i, axis)| obb.radius()[i] * axis.dot(&self.normal).abs())
            .sum();

        let depth = separation - reach;
        (depth < 0.0).then(|| Interpenetration::new(depth, self.normal, [p]))
    }
}

/// Right-hand normal, or up for a zero-area triangle
fn face_normal(p1: &Vec3, p2: &Vec3, p3: &Vec3) -> Vec3 {
    (p2 - p1)
        .cross(&(p3 - p1))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(math::directions::up)
}

impl Surface for Triangle {
    fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl ColliderShape for Triangle {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn offset(&self) -> Vec3 {
        Vec3::zeros()
    }

    fn bounding_box(&self) -> AxisAlignedBox {
        AxisAlignedBox::from_positions(&self.positions)
    }

    // Triangles are placed by their vertices; see `transformed`
    fn update(&mut self, _transform: &Transform) {}

    fn update_size_and_offset(&mut self, _transform: &Transform) {}

    /// Ericson's closest point on a triangle, testing the vertex, edge and
    /// face regions in turn
    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        let (a, b, c) = (self.p1(), self.p2(), self.p3());
        let ab = b - a;
        let ac = c - a;

        // Vertex region outside A
        let ap = point - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        // Vertex region outside B
        let bp = point - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        // Edge region AB
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        // Vertex region outside C
        let cp = point - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        // Edge region AC
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        // Edge region BC
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        // Face region
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        match other {
            Collider::AxisAlignedBox(_) | Collider::Triangle(_) | Collider::Mesh(_) => {
                unsupported_pairing(ShapeKind::Triangle, other.kind())
            }
            _ if !self.is_potentially_colliding(other) => None,
            Collider::Sphere(sphere) => self.interpenetration_sphere(sphere),
            Collider::Ellipsoid(ellipsoid) => self.interpenetration_ellipsoid(ellipsoid),
            Collider::OrientedBox(obb) => self.interpenetration_oriented(obb),
        }
    }

    /// Möller–Trumbore ray/triangle intersection
    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let edge1 = self.p2() - self.p1();
        let edge2 = self.p3() - self.p1();
        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to the triangle
        if a.abs() < RAY_PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.p1();
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > RAY_PARALLEL_EPSILON).then(|| ray.point_at(t))
    }

    fn surface_normal(&self, _point: &Vec3) -> Vec3 {
        self.normal
    }
}
