//! Batch narrow phase
//!
//! Runs the exact pairwise tests over candidate pairs produced by some broad
//! phase, and remembers which pairs collided on the previous call so callers
//! can react to contacts starting and ending.

use std::collections::HashSet;

use log::trace;

use super::collision::{Collider, ColliderShape, CollisionError, ContactTolerances, Interpenetration};

/// Two colliders by index, smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub a: usize,
    pub b: usize,
}

impl CollisionPair {
    /// Create a pair; the indices are stored in ascending order
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Every distinct pair among `count` colliders
    pub fn all(count: usize) -> Vec<Self> {
        (0..count)
            .flat_map(|a| (a + 1..count).map(move |b| Self { a, b }))
            .collect()
    }
}

/// A colliding pair and how the second collider penetrates the first
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub pair: CollisionPair,
    /// Points from collider `pair.a` toward collider `pair.b`
    pub interpenetration: Interpenetration,
}

/// Narrow-phase state carried between frames
#[derive(Debug, Default)]
pub struct NarrowPhase {
    /// Used for oriented box pairs
    tolerances: ContactTolerances,
    /// Colliding pairs from the current frame
    current_pairs: HashSet<CollisionPair>,
    /// Colliding pairs from the previous frame
    previous_pairs: HashSet<CollisionPair>,
}

impl NarrowPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow phase with recalibrated oriented box contact tolerances
    pub fn with_tolerances(tolerances: ContactTolerances) -> Self {
        Self {
            tolerances,
            ..Self::default()
        }
    }

    pub const fn tolerances(&self) -> &ContactTolerances {
        &self.tolerances
    }

    /// Test every candidate pair and return the colliding ones, in candidate
    /// order
    ///
    /// Candidates are validated before anything is tested: an index out of
    /// range or an unsupported pairing fails the whole call and leaves the
    /// frame state untouched. Pairs of a collider with itself and repeated
    /// pairs are skipped.
    pub fn detect(&mut self, colliders: &[Collider], candidates: &[CollisionPair]) -> Result<Vec<Contact>, CollisionError> {
        for pair in candidates {
            let first = colliders.get(pair.a).ok_or(CollisionError::UnknownCollider(pair.a))?;
            let second = colliders.get(pair.b).ok_or(CollisionError::UnknownCollider(pair.b))?;
            if pair.a != pair.b && !first.kind().supports_pairing(second.kind()) {
                return Err(CollisionError::UnsupportedPairing {
                    a: first.kind(),
                    b: second.kind(),
                });
            }
        }

        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let mut tested = HashSet::new();
        let mut contacts = Vec::new();
        for &pair in candidates {
            let pair = CollisionPair::new(pair.a, pair.b);
            if pair.a == pair.b || !tested.insert(pair) {
                continue;
            }

            let (first, second) = (&colliders[pair.a], &colliders[pair.b]);
            trace!("Testing {:?} {} vs {:?} {}", first.kind(), pair.a, second.kind(), pair.b);
            if !first.bounding_box().is_colliding(&second.bounding_box()) {
                continue;
            }

            let hit = match first {
                Collider::OrientedBox(obb) => obb.interpenetration_with_tolerances(second, &self.tolerances),
                _ => first.interpenetration(second),
            };
            if let Some(interpenetration) = hit.filter(Interpenetration::is_colliding) {
                self.current_pairs.insert(pair);
                contacts.push(Contact { pair, interpenetration });
            }
        }
        Ok(contacts)
    }

    /// Pairs colliding now that were not colliding on the previous call
    pub fn entered(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<_> = self.current_pairs.difference(&self.previous_pairs).copied().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Pairs colliding on the previous call that no longer collide
    pub fn exited(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<_> = self.previous_pairs.difference(&self.current_pairs).copied().collect();
        pairs.sort_unstable();
        pairs
    }

    /// All pairs colliding on the last call
    pub fn current(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Forget both frames
    pub fn clear(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }
}
