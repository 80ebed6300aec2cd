//! Per-triangle collision attributes
//!
//! A triangle carries one raw `u64`: the high 32 bits are a set of flags and
//! the low 32 bits a set of boolean values. Both groups can be authored by
//! painting UVs onto renderable geometry: the first UV of each UV set picks a
//! cell of a 3x3 grid, and every cell owns one bit.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Cells per side of the UV attribute grid
const GRID_SIZE: u32 = 3;

bitflags! {
    /// Flag group of a triangle's attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AttributeFlags: u32 {
        const _ = !0;
    }
}

/// Boolean value group of a triangle's attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttributeValues(pub u32);

impl AttributeValues {
    /// Set or clear the boolean at `index`; indexes past 31 are ignored
    pub fn set_bool(&mut self, value: bool, index: u32) {
        let Some(bit) = 1_u32.checked_shl(index) else {
            return;
        };
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    /// Read the boolean at `index`; false past 31
    pub fn get_bool(&self, index: u32) -> bool {
        1_u32.checked_shl(index).is_some_and(|bit| self.0 & bit == bit)
    }
}

/// UVs of one renderable triangle in one UV set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleUvs {
    pub uv1: Vec2,
    pub uv2: Vec2,
    pub uv3: Vec2,
}

/// Both attribute groups of a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionAttributes {
    pub flags: AttributeFlags,
    pub values: AttributeValues,
}

impl CollisionAttributes {
    /// Split a raw attribute word into its groups
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            flags: AttributeFlags::from_bits_retain((raw >> 32) as u32),
            values: AttributeValues(raw as u32),
        }
    }

    /// Pack both groups into a raw attribute word
    pub const fn raw(&self) -> u64 {
        ((self.flags.bits() as u64) << 32) | self.values.0 as u64
    }

    /// Derive both groups from painted UVs
    pub fn from_uvs(uv_sets: &[TriangleUvs]) -> Self {
        let bits = parse_uvs(uv_sets);
        Self {
            flags: AttributeFlags::from_bits_retain(bits),
            values: AttributeValues(bits),
        }
    }
}

/// One bit per UV set: set `s` with its first UV in grid cell (`col`, `row`)
/// sets bit `9 * s + 3 * row + col + 1`
///
/// UVs outside the unit square and bits past the 32nd are ignored.
pub fn parse_uvs(uv_sets: &[TriangleUvs]) -> u32 {
    let range = GRID_SIZE as f32;
    let mut value = 0;
    for (set, uvs) in uv_sets.iter().enumerate() {
        let col = (uvs.uv1.x * range).floor();
        let row = (uvs.uv1.y * range).floor();
        if !(0.0..range).contains(&col) || !(0.0..range).contains(&row) {
            continue;
        }

        let Ok(set) = u32::try_from(set) else {
            break;
        };
        let shift = GRID_SIZE * GRID_SIZE * set + row as u32 * GRID_SIZE + col as u32 + 1;
        if let Some(bit) = 1_u32.checked_shl(shift) {
            value |= bit;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uvs(u: f32, v: f32) -> TriangleUvs {
        TriangleUvs {
            uv1: Vec2::new(u, v),
            uv2: Vec2::zeros(),
            uv3: Vec2::zeros(),
        }
    }

    #[test]
    fn test_grid_cells_map_to_bits() {
        assert_eq!(parse_uvs(&[uvs(0.1, 0.1)]), 1 << 1);
        assert_eq!(parse_uvs(&[uvs(0.9, 0.1)]), 1 << 3);
        assert_eq!(parse_uvs(&[uvs(0.5, 0.5)]), 1 << 5);
        assert_eq!(parse_uvs(&[uvs(0.9, 0.9)]), 1 << 9);
    }

    #[test]
    fn test_uv_sets_use_separate_ranges() {
        assert_eq!(parse_uvs(&[uvs(0.1, 0.1), uvs(0.1, 0.1)]), (1 << 1) | (1 << 10));
        assert_eq!(parse_uvs(&[uvs(1.5, 0.1), uvs(0.1, 0.1)]), 1 << 10);
        assert_eq!(parse_uvs(&[uvs(-0.1, 0.1)]), 0);
    }

    #[test]
    fn test_overflowing_sets_are_ignored() {
        let sets = [uvs(0.1, 0.1), uvs(0.1, 0.1), uvs(0.1, 0.1), uvs(0.9, 0.9)];
        assert_eq!(parse_uvs(&sets), (1 << 1) | (1 << 10) | (1 << 19));
    }

    #[test]
    fn test_raw_word_splits_into_groups() {
        let attributes = CollisionAttributes::from_raw(0x0000_0005_0000_0003);
        assert_eq!(attributes.flags.bits(), 5);
        assert_eq!(attributes.values.0, 3);
        assert_eq!(attributes.raw(), 0x0000_0005_0000_0003);
    }

    #[test]
    fn test_value_booleans() {
        let mut values = AttributeValues::default();
        values.set_bool(true, 4);
        assert!(values.get_bool(4));
        assert!(!values.get_bool(3));
        values.set_bool(false, 4);
        assert!(!values.get_bool(4));
    }

    #[test]
    fn test_value_booleans_past_the_last_bit() {
        let mut values = AttributeValues::default();
        values.set_bool(true, 31);
        assert!(values.get_bool(31));
        assert_eq!(values.0, 1 << 31);

        values.set_bool(true, 32);
        values.set_bool(false, 40);
        assert_eq!(values.0, 1 << 31);
        assert!(!values.get_bool(32));
        assert!(!values.get_bool(u32::MAX));
    }
}
