//! Surface classification by normal angle

use serde::{Deserialize, Serialize};

use crate::foundation::math::{directions, utils, Vec3};

use super::primitives::SurfaceImpact;

/// Upper bound (exclusive) of the floor range, 30°
const FLOOR_MAX_ANGLE: f32 = 0.523_599;
/// Upper bound (inclusive) of the ramp range, 55°
const RAMP_MAX_ANGLE: f32 = 0.959_931_46;
/// Lower bound (inclusive) of the ceiling range, 155°
const CEILING_MIN_ANGLE: f32 = 2.705_26;

/// Semantic surface category derived from a normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Steep or vertical
    Wall,
    /// Facing down
    Ceiling,
    /// Walkable slope
    Ramp,
    /// Flat ground
    Floor,
}

impl SurfaceType {
    /// Classify a normal by its angle to world up
    pub fn from_normal(normal: &Vec3) -> Self {
        let angle = utils::angle_between(normal, &directions::up());
        if (0.0..FLOOR_MAX_ANGLE).contains(&angle) {
            Self::Floor
        } else if (FLOOR_MAX_ANGLE..=RAMP_MAX_ANGLE).contains(&angle) {
            Self::Ramp
        } else if angle >= CEILING_MIN_ANGLE {
            Self::Ceiling
        } else {
            Self::Wall
        }
    }

    /// True if an object can rest on this surface
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Ramp)
    }
}

/// Anything with a surface normal
pub trait Surface {
    /// Unit surface normal
    fn normal(&self) -> Vec3;

    /// Category of this surface
    fn surface_type(&self) -> SurfaceType {
        SurfaceType::from_normal(&self.normal())
    }
}

impl Surface for SurfaceImpact {
    fn normal(&self) -> Vec3 {
        self.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::deg_to_rad;

    fn tilted(degrees: f32) -> Vec3 {
        let radians = deg_to_rad(degrees);
        Vec3::new(radians.sin(), radians.cos(), 0.0)
    }

    #[test]
    fn test_angle_ranges() {
        assert_eq!(SurfaceType::from_normal(&Vec3::y()), SurfaceType::Floor);
        assert_eq!(SurfaceType::from_normal(&tilted(29.0)), SurfaceType::Floor);
        assert_eq!(SurfaceType::from_normal(&tilted(31.0)), SurfaceType::Ramp);
        assert_eq!(SurfaceType::from_normal(&tilted(54.0)), SurfaceType::Ramp);
        assert_eq!(SurfaceType::from_normal(&tilted(56.0)), SurfaceType::Wall);
        assert_eq!(SurfaceType::from_normal(&Vec3::x()), SurfaceType::Wall);
        assert_eq!(SurfaceType::from_normal(&tilted(154.0)), SurfaceType::Wall);
        assert_eq!(SurfaceType::from_normal(&tilted(156.0)), SurfaceType::Ceiling);
        assert_eq!(SurfaceType::from_normal(&-Vec3::y()), SurfaceType::Ceiling);
    }

    #[test]
    fn test_walkable() {
        assert!(SurfaceType::Floor.is_walkable());
        assert!(SurfaceType::Ramp.is_walkable());
        assert!(!SurfaceType::Wall.is_walkable());
        assert!(!SurfaceType::Ceiling.is_walkable());
    }

    #[test]
    fn test_impact_classifies_through_trait() {
        let impact = SurfaceImpact {
            normal: Vec3::y(),
            position: Vec3::zeros(),
            triangle: None,
        };
        assert_eq!(impact.surface_type(), SurfaceType::Floor);
    }
}
