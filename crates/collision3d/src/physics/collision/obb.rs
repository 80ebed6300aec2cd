//! Oriented box collider

use crate::foundation::math::{directions, Quat, Transform, Vec3};

use super::aabb::AxisAlignedBox;
use super::ellipsoid::Ellipsoid;
use super::obb_contact;
use super::primitives::{Interpenetration, Ray};
use super::shape::{Collider, ColliderShape};
use super::tolerance::ContactTolerances;

/// A box with half-extents along its own rotated axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    center: Vec3,
    offset: Vec3,
    radius: Vec3,
    rotation: Quat,
    local_offset: Vec3,
    local_radius: Vec3,
    local_rotation: Quat,
    bounding_box: AxisAlignedBox,
}

impl OrientedBox {
    /// Create a box; offset, radius and rotation become the authored values
    pub fn new(center: Vec3, offset: Vec3, radius: Vec3, rotation: Quat) -> Self {
        let mut obb = Self {
            center,
            offset,
            radius,
            rotation,
            local_offset: offset,
            local_radius: radius,
            local_rotation: rotation,
            bounding_box: AxisAlignedBox::default(),
        };
        obb.refresh_bounding_box();
        obb
    }

    /// The unrotated box enclosing `positions`, anchored at the origin
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let aabb = AxisAlignedBox::from_positions(positions);
        Self::new(Vec3::zeros(), aabb.offset(), aabb.radius(), Quat::identity())
    }

    /// Derived half-extents
    pub const fn radius(&self) -> Vec3 {
        self.radius
    }

    /// Derived rotation
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Authored half-extents
    pub const fn local_radius(&self) -> Vec3 {
        self.local_radius
    }

    /// Authored offset
    pub const fn local_offset(&self) -> Vec3 {
        self.local_offset
    }

    /// Authored rotation
    pub const fn local_rotation(&self) -> Quat {
        self.local_rotation
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

    /// The box's local X, Y and Z axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::x(),
            self.rotation * Vec3::y(),
            self.rotation * Vec3::z(),
        ]
    }

    /// World-space corners
    ///
    /// Bit 0 of the index selects -X, bit 1 selects -Y and bit 2 selects -Z,
    /// so corner 0 is the (+X, +Y, +Z) corner and corner 7 the opposite one.
    pub fn corners(&self) -> [Vec3; 8] {
        let position = self.position();
        let axes = self.axes();
        std::array::from_fn(|index| {
            let mut corner = position;
            for (bit, axis) in axes.iter().enumerate() {
                let sign = if index & (1 << bit) == 0 { 1.0 } else { -1.0 };
                corner += axis * (sign * self.radius[bit]);
            }
            corner
        })
    }

    /// Strict containment test in the box's local frame
    pub fn contains(&self, point: &Vec3) -> bool {
        let local = self.to_local(point);
        (0..3).all(|i| local[i].abs() < self.radius[i])
    }

    /// 15-axis separating axis test
    pub fn is_colliding(&self, other: &Self) -> bool {
        self.is_colliding_with_epsilon(other, ContactTolerances::default().parallel_axis_epsilon)
    }

    /// Box/box interpenetration with recalibrated contact tolerances
    ///
    /// Every other pairing behaves exactly like
    /// [`ColliderShape::interpenetration`].
    pub fn interpenetration_with_tolerances(
        &self,
        other: &Collider,
        tolerances: &ContactTolerances,
    ) -> Option<Interpenetration> {
        match other {
            Collider::OrientedBox(other) => {
                if !self.is_colliding_with_epsilon(other, tolerances.parallel_axis_epsilon) {
                    return None;
                }
                obb_contact::box_contact(self, other, tolerances)
            }
            Collider::Ellipsoid(ellipsoid) => self.interpenetration_ellipsoid(ellipsoid),
            Collider::AxisAlignedBox(_) | Collider::Sphere(_) | Collider::Triangle(_) | Collider::Mesh(_) => {
                other.interpenetration(&Collider::OrientedBox(*self)).map(Interpenetration::reversed)
            }
        }
    }

    /// Face closest to a point: outward world normal and signed distance to it
    pub(crate) fn nearest_face(&self, point: &Vec3) -> (Vec3, f32) {
        let local = self.to_local(point);
        let axes = self.axes();
        let mut best = (axes[1], f32::INFINITY);
        for i in 0..3 {
            let distance = self.radius[i] - local[i].abs();
            if distance < best.1 {
                let normal = if local[i] < 0.0 { -axes[i] } else { axes[i] };
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
            self.rotation,
        )
    }

    fn to_local(&self, point: &Vec3) -> Vec3 {
        self.rotation.inverse_transform_vector(&(point - self.position()))
    }

    fn refresh_bounding_box(&mut self) {
        let rotation = self.rotation.to_rotation_matrix();
        let r = rotation.matrix();
        let extents = Vec3::from_fn(|i, _| (0..3).map(|j| r[(i, j)].abs() * self.radius[j]).sum());
        self.bounding_box = AxisAlignedBox::new(self.center, self.offset, extents);
    }

    fn is_colliding_with_epsilon(&self, other: &Self, epsilon: f32) -> bool {
        let a = self.axes();
        let b = other.axes();
        let ea = self.radius;
        let eb = other.radius;

        // Rotation expressing `other` in this box's frame
        let r: [[f32; 3]; 3] = std::array::from_fn(|i| std::array::from_fn(|j| a[i].dot(&b[j])));
        let abs_r: [[f32; 3]; 3] = std::array::from_fn(|i| std::array::from_fn(|j| r[i][j].abs() + epsilon));

        let d = other.position() - self.position();
        let t = [d.dot(&a[0]), d.dot(&a[1]), d.dot(&a[2])];

        // L = A0, A1, A2
        for i in 0..3 {
            let rb = eb[0] * abs_r[i][0] + eb[1] * abs_r[i][1] + eb[2] * abs_r[i][2];
            if t[i].abs() > ea[i] + rb {
                return false;
            }
        }

        // L = B0, B1, B2
        for j in 0..3 {
            let ra = ea[0] * abs_r[0][j] + ea[1] * abs_r[1][j] + ea[2] * abs_r[2][j];
            let projected = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if projected.abs() > ra + eb[j] {
                return false;
            }
        }

        // L = Ai x Bj
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[i2][j] + ea[i2] * abs_r[i1][j];
                let rb = eb[j1] * abs_r[i][j2] + eb[j2] * abs_r[i][j1];
                let projected = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if projected.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
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
                let (normal, distance) = self.nearest_face(&ellipsoid.position());
                let depth = -(distance + ellipsoid.support_distance(&normal));
                let point = ellipsoid.position() + normal * distance;
                Some(Interpenetration::new(depth, normal, [point]))
            }
        }
    }
}

impl ColliderShape for OrientedBox {
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
        self.rotation = transform.rotation * self.local_rotation;
        self.refresh_bounding_box();
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.local_offset = transform.position;
        self.local_radius = transform.scale / 2.0;
        self.local_rotation = transform.rotation;
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        let position = self.position();
        let d = point - position;
        self.axes()
            .iter()
            .enumerate()
            .fold(position, |q, (i, axis)| {
                q + axis * d.dot(axis).clamp(-self.radius[i], self.radius[i])
            })
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        self.interpenetration_with_tolerances(other, &ContactTolerances::default())
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        let p = self.position() - ray.origin;
        for (i, axis) in self.axes().iter().enumerate() {
            let r = self.radius[i];
            let e = axis.dot(&p);
            let f = axis.dot(&ray.direction);

            if f.abs() > f32::EPSILON {
                let mut t1 = (e + r) / f;
                let mut t2 = (e - r) / f;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max || t_max < 0.0 {
                    return None;
                }
            } else if -e - r > 0.0 || -e + r < 0.0 {
                return None;
            }
        }

        (t_min > 0.0).then(|| ray.point_at(t_min))
    }

    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        let local = self.to_local(point);
        if local == Vec3::zeros() {
            return self.rotation * directions::forward();
        }

        let axes = self.axes();
        let mut normal = self.rotation * directions::forward();
        let mut min = f32::INFINITY;
        for i in 0..3 {
            let distance = (self.radius[i] - local[i].abs()).abs();
            if distance < min {
                min = distance;
                normal = if local[i] < 0.0 { -axes[i] } else { axes[i] };
            }
        }
        normal
    }
}
