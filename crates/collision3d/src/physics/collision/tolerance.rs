//! Numeric tolerances used by the narrow phase
//!
//! Every threshold that depends on the world's unit scale lives here under a
//! name describing its role. The values assume metre-scale geometry; a scene
//! authored at a different scale recalibrates through [`ContactTolerances`].

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Squared distance under which two clipped contact points are merged.
pub const VERTEX_MERGE_DISTANCE_SQUARED: f32 = 1e-4;

/// Squared length under which a candidate separating axis is treated as
/// degenerate (the cross product of near-parallel edges). Such an axis never
/// separates and never becomes the minimum-penetration axis.
pub const DEGENERATE_AXIS_LENGTH_SQUARED: f32 = 0.02;

/// Distance within which a point is considered to lie on a face plane.
pub const FACE_PLANE_TOLERANCE: f32 = 1e-4;

/// Distance outside a face edge-plane still accepted for clipped edge
/// intersection points.
pub const CLIP_EDGE_TOLERANCE: f32 = 0.1;

/// Slack added to the penetration depth when collecting the vertices of a box
/// that lie inside the contact band.
pub const HIT_BAND_SLACK: f32 = 0.01;

/// Bias added to every entry of the absolute relative rotation matrix in the
/// 15-axis box test, so parallel edges do not produce a null axis.
pub const PARALLEL_AXIS_EPSILON: f32 = f32::EPSILON;

/// Ray/triangle determinant magnitude under which the ray counts as parallel.
/// Also the minimum accepted hit distance.
pub const RAY_PARALLEL_EPSILON: f32 = 1e-5;

/// Squared segment length under which a segment degenerates to a point.
pub const SEGMENT_EPSILON: f32 = 1e-5;

/// Depth reported when two shapes share the same position.
pub const COINCIDENT_DEPTH: f32 = -f32::EPSILON;

/// Number of centroid-nearest triangles examined by the mesh nearest-triangle
/// search. The search is not exhaustive past this count.
pub const NEAREST_TRIANGLE_CANDIDATES: usize = 10;

/// Factor applied to an opponent's bounding box before a triangle decides
/// whether it is worth testing exactly.
pub const POTENTIAL_CONTACT_INFLATION: f32 = 1.5;

/// Recalibratable tolerances for box/box contact generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTolerances {
    /// See [`VERTEX_MERGE_DISTANCE_SQUARED`]
    pub vertex_merge_distance_squared: f32,
    /// See [`DEGENERATE_AXIS_LENGTH_SQUARED`]
    pub degenerate_axis_length_squared: f32,
    /// See [`FACE_PLANE_TOLERANCE`]
    pub face_plane_tolerance: f32,
    /// See [`CLIP_EDGE_TOLERANCE`]
    pub clip_edge_tolerance: f32,
    /// See [`HIT_BAND_SLACK`]
    pub hit_band_slack: f32,
    /// See [`PARALLEL_AXIS_EPSILON`]
    pub parallel_axis_epsilon: f32,
}

impl Default for ContactTolerances {
    fn default() -> Self {
        Self {
            vertex_merge_distance_squared: VERTEX_MERGE_DISTANCE_SQUARED,
            degenerate_axis_length_squared: DEGENERATE_AXIS_LENGTH_SQUARED,
            face_plane_tolerance: FACE_PLANE_TOLERANCE,
            clip_edge_tolerance: CLIP_EDGE_TOLERANCE,
            hit_band_slack: HIT_BAND_SLACK,
            parallel_axis_epsilon: PARALLEL_AXIS_EPSILON,
        }
    }
}

impl Config for ContactTolerances {}

impl ContactTolerances {
    /// Scale every length-based tolerance for a world where one metre spans
    /// `unit` world units. Squared tolerances scale by `unit²`.
    pub fn scaled_for_unit(unit: f32) -> Self {
        let base = Self::default();
        Self {
            vertex_merge_distance_squared: base.vertex_merge_distance_squared * unit * unit,
            degenerate_axis_length_squared: base.degenerate_axis_length_squared,
            face_plane_tolerance: base.face_plane_tolerance * unit,
            clip_edge_tolerance: base.clip_edge_tolerance * unit,
            hit_band_slack: base.hit_band_slack * unit,
            parallel_axis_epsilon: base.parallel_axis_epsilon,
        }
    }

    /// Validate that every tolerance is finite and non-negative
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("vertex_merge_distance_squared", self.vertex_merge_distance_squared),
            ("degenerate_axis_length_squared", self.degenerate_axis_length_squared),
            ("face_plane_tolerance", self.face_plane_tolerance),
            ("clip_edge_tolerance", self.clip_edge_tolerance),
            ("hit_band_slack", self.hit_band_slack),
            ("parallel_axis_epsilon", self.parallel_axis_epsilon),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matches_constants() {
        let tolerances = ContactTolerances::default();
        assert_eq!(tolerances.hit_band_slack, HIT_BAND_SLACK);
        assert_eq!(tolerances.degenerate_axis_length_squared, DEGENERATE_AXIS_LENGTH_SQUARED);
        assert!(tolerances.validate().is_ok());
    }

    #[test]
    fn test_scaling_for_centimetres() {
        let tolerances = ContactTolerances::scaled_for_unit(100.0);
        assert_relative_eq!(tolerances.vertex_merge_distance_squared, 1.0, epsilon = 1e-4);
        assert_relative_eq!(tolerances.clip_edge_tolerance, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_partial_ron_falls_back_to_defaults() {
        let tolerances: ContactTolerances = ron::from_str("(hit_band_slack: 0.5)").unwrap();
        assert_eq!(tolerances.hit_band_slack, 0.5);
        assert_eq!(tolerances.face_plane_tolerance, FACE_PLANE_TOLERANCE);
    }

    #[test]
    fn test_negative_tolerance_fails_validation() {
        let tolerances = ContactTolerances {
            clip_edge_tolerance: -1.0,
            ..Default::default()
        };
        assert!(tolerances.validate().unwrap_err().contains("clip_edge_tolerance"));
    }
}
