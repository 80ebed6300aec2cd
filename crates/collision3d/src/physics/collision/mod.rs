//! Narrow-phase collision shapes
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, planes, segments and query results
//! - [`aabb`], [`obb`], [`sphere`], [`ellipsoid`], [`triangle`], [`mesh`] - The collider shapes
//! - [`shape`] - The [`ColliderShape`] capability set and the [`Collider`] enum
//! - `obb_contact` - Contact points between two oriented boxes
//! - [`surface`] - Surface classification by normal
//! - [`attributes`] - Per-triangle flags and values
//! - [`encoding`] - Fixed-order float encoding and serde
//! - [`tolerance`] - Named numeric tolerances
//!
//! # Conventions
//!
//! An [`Interpenetration`] returned by `a.interpenetration(b)` points from `a`
//! toward `b`, and its depth is negative while the shapes overlap.

pub mod aabb;
pub mod attributes;
pub mod ellipsoid;
pub mod encoding;
pub mod mesh;
pub mod obb;
pub(crate) mod obb_contact;
pub mod primitives;
pub mod shape;
pub mod sphere;
pub mod surface;
pub mod tolerance;
pub mod triangle;

// Re-export commonly used types
pub use aabb::AxisAlignedBox;
pub use attributes::{AttributeFlags, AttributeValues, CollisionAttributes, TriangleUvs};
pub use ellipsoid::Ellipsoid;
pub use encoding::{DecodeError, FloatEncoding};
pub use mesh::TriangleMeshCollider;
pub use obb::OrientedBox;
pub use primitives::{Interpenetration, LineSegment, Plane, PlaneSide, Ray, SurfaceImpact};
pub use shape::{Collider, ColliderShape, CollisionError, ShapeKind};
pub use sphere::Sphere;
pub use surface::{Surface, SurfaceType};
pub use tolerance::ContactTolerances;
pub use triangle::Triangle;
