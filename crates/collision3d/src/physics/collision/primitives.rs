//! Primitive geometric types shared by every collider
//!
//! Rays, planes and segments, plus the two result types produced by collider
//! queries: [`Interpenetration`] and [`SurfaceImpact`].

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};

use super::aabb::AxisAlignedBox;
use super::shape::ColliderShape;
use super::tolerance::SEGMENT_EPSILON;
use super::triangle::Triangle;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed in the unit-sphere space of an ellipsoid with
    /// semi-axes `radius`
    pub fn moved_inside_ellipsoid_space(&self, radius: &Vec3) -> Self {
        Self::new(
            self.origin.component_div(radius),
            self.direction.component_div(radius),
        )
    }
}

/// Which side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// On the normal's side, or on the plane
    Front,
    /// Behind the plane
    Back,
}

/// An infinite plane `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit plane normal
    pub normal: Vec3,
    /// Signed offset term of the plane equation
    pub constant: f32,
}

impl Plane {
    /// Create a plane from its equation terms
    pub const fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Create the plane through `origin` facing `normal`
    pub fn from_origin_normal(origin: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            constant: -origin.dot(&normal),
        }
    }

    /// The point of the plane closest to the world origin
    pub fn origin(&self) -> Vec3 {
        self.normal * -self.constant
    }

    /// Signed distance from the plane to `point`
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Classify `point` against the plane
    pub fn classify_point(&self, point: &Vec3) -> PlaneSide {
        if self.distance_to_point(point) < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Front
        }
    }

    /// Where the infinite line through `segment` crosses the plane, `None` when
    /// the line is parallel to it
    pub fn intersection_of_line(&self, segment: &LineSegment) -> Option<Vec3> {
        let dir = segment.p2 - segment.p1;
        let denom = self.normal.dot(&dir);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let t = -self.distance_to_point(&segment.p1) / denom;
        Some(segment.p1 + dir * t)
    }

    /// Separating test between the plane and an axis-aligned box
    pub fn is_colliding_with_box(&self, aabb: &AxisAlignedBox) -> bool {
        let c = aabb.position();
        let e = aabb.radius();
        let r = e.x * self.normal.x.abs() + e.y * self.normal.y.abs() + e.z * self.normal.z.abs();
        self.distance_to_point(&c).abs() <= r
    }
}

/// A finite line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Start point
    pub p1: Vec3,
    /// End point
    pub p2: Vec3,
}

impl LineSegment {
    /// Create a segment between two points
    pub const fn new(p1: Vec3, p2: Vec3) -> Self {
        Self { p1, p2 }
    }

    /// Segment length
    pub fn length(&self) -> f32 {
        (self.p2 - self.p1).norm()
    }

    /// Closest point on the segment to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let d = self.p2 - self.p1;
        let len_sq = d.norm_squared();
        if len_sq <= SEGMENT_EPSILON {
            return self.p1;
        }
        let t = ((point - self.p1).dot(&d) / len_sq).clamp(0.0, 1.0);
        self.p1 + d * t
    }

    /// Closest pair of points between two segments (Ericson, 5.1.9)
    pub fn closest_points(&self, other: &LineSegment) -> (Vec3, Vec3) {
        let d1 = self.p2 - self.p1;
        let d2 = other.p2 - other.p1;
        let r = self.p1 - other.p1;
        let a = d1.dot(&d1);
        let e = d2.dot(&d2);
        let f = d2.dot(&r);

        if a <= SEGMENT_EPSILON && e <= SEGMENT_EPSILON {
            return (self.p1, other.p1);
        }

        let (s, t) = if a <= SEGMENT_EPSILON {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(&r);
            if e <= SEGMENT_EPSILON {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(&d2);
                let denom = a * e - b * b;
                let mut s = if denom == 0.0 {
                    0.0
                } else {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                };
                let mut t = (b * s + f) / e;
                if t < 0.0 {
                    t = 0.0;
                    s = (-c / a).clamp(0.0, 1.0);
                } else if t > 1.0 {
                    t = 1.0;
                    s = ((b - c) / a).clamp(0.0, 1.0);
                }
                (s, t)
            }
        };

        (self.p1 + d1 * s, other.p1 + d2 * t)
    }
}

/// Overlap between two colliders and how to resolve it
///
/// `direction` points from the queried collider toward the compared one;
/// moving the compared collider by `direction * -depth` separates the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpenetration {
    /// Negative when overlapping, more negative is deeper
    pub depth: f32,
    /// Unit separating direction
    pub direction: Vec3,
    /// Contact points, without duplicates
    pub points: Vec<Vec3>,
}

impl Interpenetration {
    /// Create a result, dropping repeated contact points
    pub fn new(depth: f32, direction: Vec3, points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut unique: Vec<Vec3> = Vec::new();
        for point in points {
            if !unique.contains(&point) {
                unique.push(point);
            }
        }
        Self {
            depth,
            direction,
            points: unique,
        }
    }

    /// True when the result can safely be used to resolve penetration
    pub fn is_valid(&self) -> bool {
        self.depth.is_finite()
            && utils::is_finite(&self.direction)
            && !self.points.is_empty()
            && self.points.iter().all(utils::is_finite)
    }

    /// True when the result is valid and the shapes overlap
    pub fn is_colliding(&self) -> bool {
        self.is_valid() && self.depth < 0.0
    }

    /// The same contact seen from the other collider
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.direction = -self.direction;
        self
    }
}

/// Where a ray meets a collider's surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceImpact {
    /// Surface normal at the hit
    pub normal: Vec3,
    /// Hit position
    pub position: Vec3,
    /// The triangle that was hit, for mesh colliders
    pub triangle: Option<Triangle>,
}
