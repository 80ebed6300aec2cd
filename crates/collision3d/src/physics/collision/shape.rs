//! The collider capability set and the closed set of collider shapes
//!
//! Every shape answers the same queries through [`ColliderShape`]. Pairwise
//! interpenetration is double-dispatched: the receiver matches on the
//! [`Collider`] variant it is compared against, and pairings a shape does not
//! compute itself are delegated to the other shape and reversed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::{Transform, Vec3};

use super::aabb::AxisAlignedBox;
use super::ellipsoid::Ellipsoid;
use super::mesh::TriangleMeshCollider;
use super::obb::OrientedBox;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use super::sphere::Sphere;
use super::triangle::Triangle;

/// Queries shared by every collider shape
pub trait ColliderShape {
    /// World-space center, before the offset is applied
    fn center(&self) -> Vec3;

    /// Derived world-space offset from the center
    fn offset(&self) -> Vec3;

    /// Where the shape actually is: center plus offset
    fn position(&self) -> Vec3 {
        self.center() + self.offset()
    }

    /// Axis-aligned box enclosing the shape
    fn bounding_box(&self) -> AxisAlignedBox;

    /// Place the shape in the world: derived values are recomputed from the
    /// authored values and `transform`, never from their previous state
    fn update(&mut self, transform: &Transform);

    /// Re-author the local size and offset from `transform`
    fn update_size_and_offset(&mut self, transform: &Transform);

    /// The point of the surface closest to `point`
    fn closest_surface_point(&self, point: &Vec3) -> Vec3;

    /// How far `other` penetrates this shape
    ///
    /// The direction points from this shape toward `other`; the depth is
    /// negative while they overlap.
    ///
    /// # Panics
    ///
    /// Panics when the pairing is not supported, see [`ShapeKind::supports_pairing`].
    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration>;

    /// Where `ray` first meets the surface
    fn surface_point(&self, ray: &Ray) -> Option<Vec3>;

    /// Surface normal nearest to `point`
    fn surface_normal(&self, point: &Vec3) -> Vec3;

    /// Where `ray` first meets the surface, with the normal there
    fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        let position = self.surface_point(ray)?;
        Some(SurfaceImpact {
            normal: self.surface_normal(&position),
            position,
            triangle: None,
        })
    }
}

/// Tag of each collider variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    AxisAlignedBox,
    OrientedBox,
    Sphere,
    Ellipsoid,
    Triangle,
    Mesh,
}

impl ShapeKind {
    /// True when `interpenetration` is defined between the two kinds, in
    /// either order
    pub const fn supports_pairing(self, other: Self) -> bool {
        !matches!(
            (self, other),
            (Self::AxisAlignedBox | Self::Triangle | Self::Mesh, Self::Triangle | Self::Mesh)
                | (Self::Triangle | Self::Mesh, Self::AxisAlignedBox)
        )
    }
}

/// Abort an unsupported interpenetration pairing
pub(crate) fn unsupported_pairing(a: ShapeKind, b: ShapeKind) -> ! {
    panic!("unsupported collider pairing: {a:?} vs {b:?}")
}

/// Errors raised when building colliders or validating collision work
#[derive(Error, Debug)]
pub enum CollisionError {
    #[error("unsupported collider pairing: {a:?} vs {b:?}")]
    UnsupportedPairing { a: ShapeKind, b: ShapeKind },

    #[error("mesh collider needs at least one triangle")]
    EmptyMesh,

    #[error("no collider at index {0}")]
    UnknownCollider(usize),

    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    InvalidIndex { index: u32, vertex_count: usize },

    #[error("triangle {0} has zero area")]
    DegenerateTriangle(usize),
}

/// Any collider shape
///
/// Serialized externally tagged by variant name, each shape in its
/// fixed-order float form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    AxisAlignedBox(AxisAlignedBox),
    OrientedBox(OrientedBox),
    Sphere(Sphere),
    Ellipsoid(Ellipsoid),
    Triangle(Triangle),
    Mesh(TriangleMeshCollider),
}

impl Collider {
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::AxisAlignedBox(_) => ShapeKind::AxisAlignedBox,
            Self::OrientedBox(_) => ShapeKind::OrientedBox,
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Ellipsoid(_) => ShapeKind::Ellipsoid,
            Self::Triangle(_) => ShapeKind::Triangle,
            Self::Mesh(_) => ShapeKind::Mesh,
        }
    }

    /// Bounding-box rejection followed by the exact interpenetration test
    ///
    /// Returns `None` for unsupported pairings instead of panicking.
    pub fn test(&self, other: &Self) -> Option<Interpenetration> {
        if !self.kind().supports_pairing(other.kind()) {
            return None;
        }
        if !self.bounding_box().is_colliding(&other.bounding_box()) {
            return None;
        }
        self.interpenetration(other)
    }

    fn shape(&self) -> &dyn ColliderShape {
        match self {
            Self::AxisAlignedBox(shape) => shape,
            Self::OrientedBox(shape) => shape,
            Self::Sphere(shape) => shape,
            Self::Ellipsoid(shape) => shape,
            Self::Triangle(shape) => shape,
            Self::Mesh(shape) => shape,
        }
    }

    fn shape_mut(&mut self) -> &mut dyn ColliderShape {
        match self {
            Self::AxisAlignedBox(shape) => shape,
            Self::OrientedBox(shape) => shape,
            Self::Sphere(shape) => shape,
            Self::Ellipsoid(shape) => shape,
            Self::Triangle(shape) => shape,
            Self::Mesh(shape) => shape,
        }
    }
}

impl ColliderShape for Collider {
    fn center(&self) -> Vec3 {
        self.shape().center()
    }

    fn offset(&self) -> Vec3 {
        self.shape().offset()
    }

    fn bounding_box(&self) -> AxisAlignedBox {
        self.shape().bounding_box()
    }

    fn update(&mut self, transform: &Transform) {
        self.shape_mut().update(transform);
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.shape_mut().update_size_and_offset(transform);
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        self.shape().closest_surface_point(point)
    }

    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        self.shape().interpenetration(other)
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        self.shape().surface_point(ray)
    }

    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        self.shape().surface_normal(point)
    }

    fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        self.shape().surface_impact(ray)
    }
}

impl From<AxisAlignedBox> for Collider {
    fn from(shape: AxisAlignedBox) -> Self {
        Self::AxisAlignedBox(shape)
    }
}

impl From<OrientedBox> for Collider {
    fn from(shape: OrientedBox) -> Self {
        Self::OrientedBox(shape)
    }
}

impl From<Sphere> for Collider {
    fn from(shape: Sphere) -> Self {
        Self::Sphere(shape)
    }
}

impl From<Ellipsoid> for Collider {
    fn from(shape: Ellipsoid) -> Self {
        Self::Ellipsoid(shape)
    }
}

impl From<Triangle> for Collider {
    fn from(shape: Triangle) -> Self {
        Self::Triangle(shape)
    }
}

impl From<TriangleMeshCollider> for Collider {
    fn from(shape: TriangleMeshCollider) -> Self {
        Self::Mesh(shape)
    }
}
