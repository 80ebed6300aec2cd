//! # collision3d
//!
//! Narrow-phase 3D collision detection: closest points, ray casts and
//! interpenetration between axis-aligned boxes, oriented boxes, spheres,
//! ellipsoids, triangles and triangle meshes.
//!
//! ## Features
//!
//! - **Closed shape set**: every pairing is dispatched through the [`Collider`](physics::collision::Collider) enum
//! - **Oriented box contacts**: separating-axis test with face clipping
//! - **Authored vs derived extents**: transforms never compound across updates
//! - **Fixed-order serialization**: shapes encode as flat float lists
//!
//! ## Quick Start
//!
//! ```rust
//! use collision3d::prelude::*;
//!
//! let a = Collider::from(Sphere::new(Vec3::zeros(), Vec3::zeros(), 1.0));
//! let b = Collider::from(Sphere::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), 1.0));
//!
//! let hit = a.interpenetration(&b).unwrap();
//! assert!(hit.is_colliding());
//! assert!((hit.depth + 1.0).abs() < 1e-5);
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Quat, Transform, Vec3},
        physics::{
            collision::{
                AxisAlignedBox, Collider, ColliderShape, ContactTolerances, Ellipsoid, Interpenetration,
                OrientedBox, Ray, ShapeKind, Sphere, Surface, SurfaceType, Triangle, TriangleMeshCollider,
            },
            narrow_phase::{CollisionPair, Contact, NarrowPhase},
        },
    };
}
