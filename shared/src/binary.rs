//! Little-endian primitive codec
//!
//! [`BinaryReader`] reads fixed-width values from a borrowed byte slice and
//! reports underruns as [`FormatError::Truncated`] naming the field being
//! read. [`ByteSink`] is the infallible counterpart for building output in a
//! `Vec<u8>`.
//!
//! # Encodings
//! ```text
//! bool     u8 (0 = false, anything else = true)
//! Vec2     2 x f32
//! Vec3     3 x f32
//! I16Vec3  3 x i16
//! Mat3     9 x f32, row-major
//! I16Mat3  9 x i16, row-major
//! cstr     ASCII bytes terminated by 0x00
//! blob     i32 length + bytes
//! ```

use crate::error::FormatError;
use crate::math::I16Mat3;
use byteorder::{LittleEndian, ReadBytesExt};
use glam::{I16Vec3, Mat3, Vec2, Vec3};
use std::io::{Cursor, Read};

/// Sequential reader over a byte slice
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Total length of the underlying slice
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Move to an absolute offset
    pub fn seek(&mut self, offset: usize) {
        self.cursor.set_position(offset as u64);
    }

    /// Fail with [`FormatError::Truncated`] unless `needed` bytes remain
    pub fn ensure(&self, field: &'static str, needed: usize) -> Result<(), FormatError> {
        let available = self.remaining();
        if available < needed {
            return Err(FormatError::Truncated {
                field,
                needed,
                available,
            });
        }
        Ok(())
    }

    pub fn skip(&mut self, field: &'static str, count: usize) -> Result<(), FormatError> {
        self.ensure(field, count)?;
        self.cursor.set_position((self.position() + count) as u64);
        Ok(())
    }

    /// Borrow the next `count` bytes without copying
    pub fn read_slice(&mut self, field: &'static str, count: usize) -> Result<&'a [u8], FormatError> {
        self.ensure(field, count)?;
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + count) as u64);
        Ok(&data[start..start + count])
    }

    pub fn read_bytes(&mut self, field: &'static str, count: usize) -> Result<Vec<u8>, FormatError> {
        self.read_slice(field, count).map(<[u8]>::to_vec)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, FormatError> {
        self.ensure(field, 1)?;
        Ok(self.cursor.read_u8().unwrap_or_default())
    }

    pub fn read_i8(&mut self, field: &'static str) -> Result<i8, FormatError> {
        self.ensure(field, 1)?;
        Ok(self.cursor.read_i8().unwrap_or_default())
    }

    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, FormatError> {
        Ok(self.read_u8(field)? != 0)
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, FormatError> {
        self.ensure(field, 2)?;
        Ok(self.cursor.read_u16::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_i16(&mut self, field: &'static str) -> Result<i16, FormatError> {
        self.ensure(field, 2)?;
        Ok(self.cursor.read_i16::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        self.ensure(field, 4)?;
        Ok(self.cursor.read_u32::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_i32(&mut self, field: &'static str) -> Result<i32, FormatError> {
        self.ensure(field, 4)?;
        Ok(self.cursor.read_i32::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, FormatError> {
        self.ensure(field, 8)?;
        Ok(self.cursor.read_i64::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_f32(&mut self, field: &'static str) -> Result<f32, FormatError> {
        self.ensure(field, 4)?;
        Ok(self.cursor.read_f32::<LittleEndian>().unwrap_or_default())
    }

    pub fn read_vec2(&mut self, field: &'static str) -> Result<Vec2, FormatError> {
        self.ensure(field, 8)?;
        Ok(Vec2::new(self.read_f32(field)?, self.read_f32(field)?))
    }

    pub fn read_vec3(&mut self, field: &'static str) -> Result<Vec3, FormatError> {
        self.ensure(field, 12)?;
        Ok(Vec3::new(
            self.read_f32(field)?,
            self.read_f32(field)?,
            self.read_f32(field)?,
        ))
    }

    pub fn read_i16_vec3(&mut self, field: &'static str) -> Result<I16Vec3, FormatError> {
        self.ensure(field, 6)?;
        Ok(I16Vec3::new(
            self.read_i16(field)?,
            self.read_i16(field)?,
            self.read_i16(field)?,
        ))
    }

    /// Nine f32 in row-major order
    pub fn read_mat3(&mut self, field: &'static str) -> Result<Mat3, FormatError> {
        self.ensure(field, 36)?;
        let mut rows = [0f32; 9];
        for v in &mut rows {
            *v = self.read_f32(field)?;
        }
        Ok(Mat3::from_cols_array(&rows).transpose())
    }

    pub fn read_i16_mat3(&mut self, field: &'static str) -> Result<I16Mat3, FormatError> {
        self.ensure(field, I16Mat3::SIZE)?;
        let mut values = [0i16; 9];
        for v in &mut values {
            *v = self.read_i16(field)?;
        }
        Ok(I16Mat3::from_array(values))
    }

    /// Null-terminated ASCII string
    pub fn read_cstr(&mut self, field: &'static str) -> Result<String, FormatError> {
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        let rest = data.get(start..).unwrap_or_default();
        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(FormatError::InvalidString {
                field,
                reason: "missing null terminator".to_string(),
            });
        };
        let bytes = &rest[..end];
        if !bytes.is_ascii() {
            return Err(FormatError::InvalidString {
                field,
                reason: "non-ASCII bytes".to_string(),
            });
        }
        self.cursor.set_position((start + end + 1) as u64);
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// i32 length prefix followed by that many bytes
    pub fn read_blob(&mut self, field: &'static str) -> Result<Vec<u8>, FormatError> {
        let len = self.read_i32(field)?;
        let len = usize::try_from(len).map_err(|_| FormatError::InvalidString {
            field,
            reason: format!("negative length {len}"),
        })?;
        self.read_bytes(field, len)
    }

    /// i32 length prefix followed by UTF-8 bytes
    pub fn read_string(&mut self, field: &'static str) -> Result<String, FormatError> {
        let bytes = self.read_blob(field)?;
        String::from_utf8(bytes).map_err(|e| FormatError::InvalidString {
            field,
            reason: e.to_string(),
        })
    }

    /// Read all remaining bytes via `std::io::Read`
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.remaining());
        // Reading from an in-memory cursor cannot fail.
        let _ = self.cursor.read_to_end(&mut out);
        out
    }
}

/// Infallible little-endian output
pub trait ByteSink {
    fn put_u8(&mut self, v: u8);
    fn put_bytes(&mut self, v: &[u8]);

    fn put_i8(&mut self, v: i8) {
        self.put_u8(v as u8);
    }

    fn put_bool(&mut self, v: bool) {
        self.put_u8(v as u8);
    }

    fn put_u16(&mut self, v: u16) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_i16(&mut self, v: i16) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_f32(&mut self, v: f32) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_vec2(&mut self, v: Vec2) {
        self.put_f32(v.x);
        self.put_f32(v.y);
    }

    fn put_vec3(&mut self, v: Vec3) {
        self.put_f32(v.x);
        self.put_f32(v.y);
        self.put_f32(v.z);
    }

    fn put_i16_vec3(&mut self, v: I16Vec3) {
        self.put_i16(v.x);
        self.put_i16(v.y);
        self.put_i16(v.z);
    }

    fn put_mat3(&mut self, m: Mat3) {
        for v in m.transpose().to_cols_array() {
            self.put_f32(v);
        }
    }

    fn put_i16_mat3(&mut self, m: I16Mat3) {
        for v in m.to_array() {
            self.put_i16(v);
        }
    }

    fn put_cstr(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
        self.put_u8(0);
    }

    fn put_blob(&mut self, v: &[u8]) {
        self.put_i32(v.len() as i32);
        self.put_bytes(v);
    }

    fn put_string(&mut self, s: &str) {
        self.put_blob(s.as_bytes());
    }
}

impl ByteSink for Vec<u8> {
    fn put_u8(&mut self, v: u8) {
        self.push(v);
    }

    fn put_bytes(&mut self, v: &[u8]) {
        self.extend_from_slice(v);
    }
}
