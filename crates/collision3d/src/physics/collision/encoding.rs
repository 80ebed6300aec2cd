//! Fixed-order float encoding of collider shapes
//!
//! Each shape is written as a flat list of floats in a fixed field order,
//! and the serde impls of every shape go through that list. Only the
//! authored values are encoded; derived values are rebuilt by the next
//! `update`.
//!
//! | shape | fields |
//! |---|---|
//! | `AxisAlignedBox` | center.xyz, offset.xyz, radius.xyz |
//! | `Sphere` | center.xyz, offset.xyz, radius |
//! | `Ellipsoid` | center.xyz, offset.xyz, radius.xyz |
//! | `OrientedBox` | center.xyz, offset.xyz, radius.xyz, rotation.ijkw |
//! | `Triangle` | p1.xyz, p2.xyz, p3.xyz, c1.rgba, c2.rgba, c3.rgba |

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::foundation::math::{Quat, Quaternion, Transform, Unit, Vec3, Vec4};

use super::aabb::AxisAlignedBox;
use super::ellipsoid::Ellipsoid;
use super::mesh::TriangleMeshCollider;
use super::obb::OrientedBox;
use super::shape::ColliderShape;
use super::sphere::Sphere;
use super::triangle::Triangle;

/// Accepted distance of a decoded rotation's norm from 1 before it is
/// renormalized
const UNIT_NORM_TOLERANCE: f32 = 1e-4;

/// Errors raised while decoding a float list
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("expected {expected} floats, found {found}")]
    Length { expected: usize, found: usize },

    #[error("float at index {index} is not finite")]
    NonFinite { index: usize },

    #[error("rotation quaternion has zero length")]
    ZeroRotation,
}

/// Conversion to and from a fixed-order list of floats
pub trait FloatEncoding: Sized {
    /// Length of the encoded list
    const FLOAT_COUNT: usize;

    fn to_floats(&self) -> Vec<f32>;

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError>;
}

fn validate(floats: &[f32], expected: usize) -> Result<(), DecodeError> {
    if floats.len() != expected {
        return Err(DecodeError::Length {
            expected,
            found: floats.len(),
        });
    }
    match floats.iter().position(|f| !f.is_finite()) {
        Some(index) => Err(DecodeError::NonFinite { index }),
        None => Ok(()),
    }
}

fn vec3_at(floats: &[f32], at: usize) -> Vec3 {
    Vec3::new(floats[at], floats[at + 1], floats[at + 2])
}

fn vec4_at(floats: &[f32], at: usize) -> Vec4 {
    Vec4::new(floats[at], floats[at + 1], floats[at + 2], floats[at + 3])
}

fn rotation_at(floats: &[f32], at: usize) -> Result<Quat, DecodeError> {
    let (i, j, k, w) = (floats[at], floats[at + 1], floats[at + 2], floats[at + 3]);
    let quaternion = Quaternion::new(w, i, j, k);
    let norm = quaternion.norm();
    if norm == 0.0 {
        return Err(DecodeError::ZeroRotation);
    }
    if (norm - 1.0).abs() <= UNIT_NORM_TOLERANCE {
        Ok(Unit::new_unchecked(quaternion))
    } else {
        Ok(Unit::new_normalize(quaternion))
    }
}

impl FloatEncoding for AxisAlignedBox {
    const FLOAT_COUNT: usize = 9;

    fn to_floats(&self) -> Vec<f32> {
        let mut floats = Vec::with_capacity(Self::FLOAT_COUNT);
        floats.extend_from_slice(self.center().as_slice());
        floats.extend_from_slice(self.local_offset().as_slice());
        floats.extend_from_slice(self.local_radius().as_slice());
        floats
    }

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError> {
        validate(floats, Self::FLOAT_COUNT)?;
        Ok(Self::new(vec3_at(floats, 0), vec3_at(floats, 3), vec3_at(floats, 6)))
    }
}

impl FloatEncoding for Sphere {
    const FLOAT_COUNT: usize = 7;

    fn to_floats(&self) -> Vec<f32> {
        let mut floats = Vec::with_capacity(Self::FLOAT_COUNT);
        floats.extend_from_slice(self.center().as_slice());
        floats.extend_from_slice(self.local_offset().as_slice());
        floats.push(self.local_radius());
        floats
    }

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError> {
        validate(floats, Self::FLOAT_COUNT)?;
        Ok(Self::new(vec3_at(floats, 0), vec3_at(floats, 3), floats[6]))
    }
}

impl FloatEncoding for Ellipsoid {
    const FLOAT_COUNT: usize = 9;

    fn to_floats(&self) -> Vec<f32> {
        let mut floats = Vec::with_capacity(Self::FLOAT_COUNT);
        floats.extend_from_slice(self.center().as_slice());
        floats.extend_from_slice(self.local_offset().as_slice());
        floats.extend_from_slice(self.local_radius().as_slice());
        floats
    }

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError> {
        validate(floats, Self::FLOAT_COUNT)?;
        Ok(Self::new(vec3_at(floats, 0), vec3_at(floats, 3), vec3_at(floats, 6)))
    }
}

impl FloatEncoding for OrientedBox {
    const FLOAT_COUNT: usize = 13;

    fn to_floats(&self) -> Vec<f32> {
        let rotation = self.local_rotation();
        let mut floats = Vec::with_capacity(Self::FLOAT_COUNT);
        floats.extend_from_slice(self.center().as_slice());
        floats.extend_from_slice(self.local_offset().as_slice());
        floats.extend_from_slice(self.local_radius().as_slice());
        floats.extend_from_slice(&[rotation.i, rotation.j, rotation.k, rotation.w]);
        floats
    }

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError> {
        validate(floats, Self::FLOAT_COUNT)?;
        Ok(Self::new(
            vec3_at(floats, 0),
            vec3_at(floats, 3),
            vec3_at(floats, 6),
            rotation_at(floats, 9)?,
        ))
    }
}

/// Positions and colors only; the attributes travel beside the list
impl FloatEncoding for Triangle {
    const FLOAT_COUNT: usize = 21;

    fn to_floats(&self) -> Vec<f32> {
        let mut floats = Vec::with_capacity(Self::FLOAT_COUNT);
        for position in &self.positions {
            floats.extend_from_slice(position.as_slice());
        }
        for color in &self.colors {
            floats.extend_from_slice(color.as_slice());
        }
        floats
    }

    fn from_floats(floats: &[f32]) -> Result<Self, DecodeError> {
        validate(floats, Self::FLOAT_COUNT)?;
        Ok(Self::new(vec3_at(floats, 0), vec3_at(floats, 3), vec3_at(floats, 6))
            .with_colors([vec4_at(floats, 9), vec4_at(floats, 13), vec4_at(floats, 17)]))
    }
}

macro_rules! serde_via_floats {
    ($($shape:ty),*) => {
        $(
            impl Serialize for $shape {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_seq(self.to_floats())
                }
            }

            impl<'de> Deserialize<'de> for $shape {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let floats = Vec::<f32>::deserialize(deserializer)?;
                    Self::from_floats(&floats).map_err(D::Error::custom)
                }
            }
        )*
    };
}

serde_via_floats!(AxisAlignedBox, Sphere, Ellipsoid, OrientedBox);

impl Serialize for Triangle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.to_floats(), self.raw_attributes).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Triangle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (floats, raw_attributes) = <(Vec<f32>, u64)>::deserialize(deserializer)?;
        Self::from_floats(&floats)
            .map(|triangle| triangle.with_raw_attributes(raw_attributes))
            .map_err(D::Error::custom)
    }
}

#[derive(Serialize)]
struct MeshRecordRef<'a> {
    transform: &'a Transform,
    offset: Vec3,
    triangles: &'a [Triangle],
}

#[derive(Deserialize)]
struct MeshRecord {
    transform: Transform,
    offset: Vec3,
    triangles: Vec<Triangle>,
}

impl Serialize for TriangleMeshCollider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MeshRecordRef {
            transform: self.transform(),
            offset: self.offset(),
            triangles: self.untransformed_triangles(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TriangleMeshCollider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = MeshRecord::deserialize(deserializer)?;
        Self::new(record.transform, record.offset, record.triangles).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vector3;

    #[test]
    fn test_field_order() {
        let aabb = AxisAlignedBox::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(aabb.to_floats(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), 7.0);
        assert_eq!(sphere.to_floats(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        let obb = OrientedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Quat::identity());
        assert_eq!(obb.to_floats()[9..], [0.0_f32, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encodes_authored_values() {
        let mut sphere = Sphere::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), 2.0);
        sphere.update(&Transform::from_position_scale(Vec3::new(5.0, 0.0, 0.0), Vec3::new(3.0, 3.0, 3.0)));
        assert_eq!(sphere.to_floats(), vec![5.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(
            Sphere::from_floats(&[0.0; 6]),
            Err(DecodeError::Length { expected: 7, found: 6 })
        );
        assert_eq!(
            Ellipsoid::from_floats(&[0.0, 0.0, 0.0, 0.0, f32::NAN, 0.0, 1.0, 1.0, 1.0]),
            Err(DecodeError::NonFinite { index: 4 })
        );

        let mut floats = OrientedBox::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Quat::identity()).to_floats();
        floats[12] = 0.0;
        assert_eq!(OrientedBox::from_floats(&floats), Err(DecodeError::ZeroRotation));
    }

    #[test]
    fn test_oriented_box_round_trip_through_ron() {
        let obb = OrientedBox::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(1.0, 2.0, 0.5),
            Quat::from_axis_angle(&Vector3::y_axis(), 0.7),
        );
        let text = ron::to_string(&obb).unwrap();
        let decoded: OrientedBox = ron::from_str(&text).unwrap();
        assert_eq!(decoded, obb);
    }

    #[test]
    fn test_triangle_keeps_colors_and_attributes() {
        let triangle = Triangle::new(Vec3::zeros(), Vec3::z(), Vec3::x())
            .with_colors([Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 0.5)])
            .with_raw_attributes(0x0000_0002_0000_0008);
        assert_eq!(triangle.to_floats().len(), Triangle::FLOAT_COUNT);

        let text = ron::to_string(&triangle).unwrap();
        let decoded: Triangle = ron::from_str(&text).unwrap();
        assert_eq!(decoded, triangle);
    }

    #[test]
    fn test_empty_mesh_fails_to_decode() {
        let record = MeshRecordRef {
            transform: &Transform::identity(),
            offset: Vec3::zeros(),
            triangles: &[],
        };
        let text = ron::to_string(&record).unwrap();
        let error = ron::from_str::<TriangleMeshCollider>(&text).unwrap_err();
        assert!(error.to_string().contains("at least one triangle"));
    }
}
