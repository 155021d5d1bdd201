//! Compact math types used by the replay format.
//!
//! Positions and orientations of spawned entities are stored with 16-bit
//! integer components to save space. Vectors reuse glam's `I16Vec3`; glam has
//! no 16-bit matrix, so [`I16Mat3`] is a plain POD type here.

use glam::{I16Vec3, Mat3, Vec3};

/// 3x3 matrix of signed 16-bit components (row-major storage, POD type)
///
/// Memory layout (18 bytes): m11 m12 m13 m21 m22 m23 m31 m32 m33
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct I16Mat3 {
    pub rows: [[i16; 3]; 3],
}

impl I16Mat3 {
    /// Serialized size in bytes
    pub const SIZE: usize = 18;

    pub const ZERO: Self = Self { rows: [[0; 3]; 3] };

    /// Identity at the fixed-point scale used by the game (1.0 == 1000)
    pub const IDENTITY: Self = Self {
        rows: [[1000, 0, 0], [0, 1000, 0], [0, 0, 1000]],
    };

    pub const fn from_rows(row0: [i16; 3], row1: [i16; 3], row2: [i16; 3]) -> Self {
        Self {
            rows: [row0, row1, row2],
        }
    }

    /// Flatten to nine components in row-major order
    pub fn to_array(&self) -> [i16; 9] {
        let [a, b, c] = self.rows;
        [a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2]]
    }

    pub fn from_array(v: [i16; 9]) -> Self {
        Self::from_rows([v[0], v[1], v[2]], [v[3], v[4], v[5]], [v[6], v[7], v[8]])
    }

    /// Convert to a float matrix, dividing every component by `scale`
    pub fn to_mat3(&self, scale: f32) -> Mat3 {
        let row = |r: [i16; 3]| Vec3::new(r[0] as f32, r[1] as f32, r[2] as f32) / scale;
        Mat3::from_cols(row(self.rows[0]), row(self.rows[1]), row(self.rows[2])).transpose()
    }
}

/// Convert a compressed vector to floats, dividing every component by `scale`
pub fn i16_vec3_to_vec3(v: I16Vec3, scale: f32) -> Vec3 {
    v.as_vec3() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_roundtrip() {
        let m = I16Mat3::from_array([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(m.rows[1], [4, 5, 6]);
        assert_eq!(m.to_array(), [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_identity_to_mat3() {
        let m = I16Mat3::IDENTITY.to_mat3(1000.0);
        assert_eq!(m, Mat3::IDENTITY);
    }

    #[test]
    fn test_row_major_to_mat3() {
        // Row 0 holds (1, 2, 3), so column 0 of the float matrix is (1, 4, 7)
        let m = I16Mat3::from_array([1, 2, 3, 4, 5, 6, 7, 8, 9]).to_mat3(1.0);
        assert_eq!(m.x_axis, Vec3::new(1.0, 4.0, 7.0));
        assert_eq!(m.row(0), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_i16_vec3_scale() {
        let v = i16_vec3_to_vec3(I16Vec3::new(100, -50, 0), 10.0);
        assert_eq!(v, Vec3::new(10.0, -5.0, 0.0));
    }
}
