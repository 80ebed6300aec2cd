//! Physics module for collision detection
//!
//! [`collision`] holds the shapes and their pairwise tests; [`narrow_phase`]
//! runs those tests over candidate pairs supplied by a broad phase.

pub mod collision;
pub mod narrow_phase;

pub use collision::{Collider, ColliderShape, CollisionError, Interpenetration, ShapeKind};
pub use narrow_phase::{CollisionPair, Contact, NarrowPhase};
