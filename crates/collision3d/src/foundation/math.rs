//! Math utilities and types
//!
//! Provides the nalgebra aliases and the `Transform` used by every collider.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix4, Quaternion, Unit, UnitQuaternion, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform from all three components
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        transform_point(&self.to_matrix(), point)
    }
}

/// Transform a position by a homogeneous matrix
pub fn transform_point(matrix: &Mat4, point: Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(point)).coords
}

/// Named directions, Y up and -Z forward
pub mod directions {
    use super::Vec3;

    /// World up (+Y)
    pub fn up() -> Vec3 {
        Vec3::y()
    }

    /// World down (-Y)
    pub fn down() -> Vec3 {
        -Vec3::y()
    }

    /// World right (+X)
    pub fn right() -> Vec3 {
        Vec3::x()
    }

    /// World left (-X)
    pub fn left() -> Vec3 {
        -Vec3::x()
    }

    /// World forward (-Z)
    pub fn forward() -> Vec3 {
        -Vec3::z()
    }

    /// World backward (+Z)
    pub fn backward() -> Vec3 {
        Vec3::z()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Mean of the three components
    pub fn component_mean(v: &Vec3) -> f32 {
        (v.x + v.y + v.z) / 3.0
    }

    /// True when every component is finite
    pub fn is_finite(v: &Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }

    /// Unit vector from `from` toward `to`, zero when the points coincide
    pub fn direction(from: &Vec3, to: &Vec3) -> Vec3 {
        (to - from).try_normalize(0.0).unwrap_or_else(Vec3::zeros)
    }

    /// Angle in radians between two vectors, clamped against rounding
    pub fn angle_between(a: &Vec3, b: &Vec3) -> f32 {
        let denom = a.norm() * b.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
    }
}
