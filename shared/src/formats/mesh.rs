//! Mesh asset payload
//!
//! # Layout
//! ```text
//! 0x00: index_count i32
//! 0x04: vertex_count i32
//! 0x08: reserved u16
//! 0x0A: vertices (vertex_count * 32 bytes): position 3xf32, texcoord 2xf32, normal 3xf32
//! var:  indices (index_count * u32)
//! ```

use crate::binary::{BinaryReader, ByteSink};
use crate::error::FormatError;
use glam::{Vec2, Vec3};

/// Mesh header (10 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHeader {
    pub index_count: i32,
    pub vertex_count: i32,
}

impl MeshHeader {
    pub const SIZE: usize = 10;

    pub fn new(index_count: i32, vertex_count: i32) -> Self {
        Self {
            index_count,
            vertex_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.vertex_count.to_le_bytes());
        // reserved bytes stay 0
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            index_count: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            vertex_count: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Total payload size implied by the header
    pub fn payload_size(&self) -> usize {
        Self::SIZE + self.vertex_count.max(0) as usize * Vertex::SIZE + self.index_count.max(0) as usize * 4
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    pub const SIZE: usize = 32;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshContent {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshContent {
    /// Parse a mesh payload. Index ranges are not checked, see [`Self::validate_indices`].
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, FormatError> {
        let header = MeshHeader::from_bytes(data).ok_or_else(|| FormatError::TooShort {
            asset: format!("mesh '{name}'"),
            expected: MeshHeader::SIZE,
            actual: data.len(),
        })?;

        if header.index_count < 0 {
            return Err(FormatError::NegativeCount {
                asset: format!("mesh '{name}'"),
                field: "index_count",
                value: header.index_count,
            });
        }
        if header.vertex_count < 0 {
            return Err(FormatError::NegativeCount {
                asset: format!("mesh '{name}'"),
                field: "vertex_count",
                value: header.vertex_count,
            });
        }

        let expected = header.payload_size();
        if data.len() < expected {
            return Err(FormatError::TooShort {
                asset: format!("mesh '{name}'"),
                expected,
                actual: data.len(),
            });
        }

        let mut reader = BinaryReader::new(data);
        reader.seek(MeshHeader::SIZE);

        let mut vertices = Vec::with_capacity(header.vertex_count as usize);
        for _ in 0..header.vertex_count {
            vertices.push(Vertex {
                position: reader.read_vec3("vertex position")?,
                texcoord: reader.read_vec2("vertex texcoord")?,
                normal: reader.read_vec3("vertex normal")?,
            });
        }

        let mut indices = Vec::with_capacity(header.index_count as usize);
        for _ in 0..header.index_count {
            indices.push(reader.read_u32("index")?);
        }

        Ok(Self { vertices, indices })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = MeshHeader::new(self.indices.len() as i32, self.vertices.len() as i32);
        let mut out = Vec::with_capacity(header.payload_size());
        out.put_bytes(&header.to_bytes());
        for v in &self.vertices {
            out.put_vec3(v.position);
            out.put_vec2(v.texcoord);
            out.put_vec3(v.normal);
        }
        for &i in &self.indices {
            out.put_u32(i);
        }
        out
    }

    /// Returns the first index that does not reference a vertex
    pub fn validate_indices(&self) -> Result<(), MeshIndexError> {
        let vertex_count = self.vertices.len();
        match self.indices.iter().position(|&i| i as usize >= vertex_count) {
            Some(position) => Err(MeshIndexError {
                position,
                index: self.indices[position],
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
pub struct MeshIndexError {
    pub position: usize,
    pub index: u32,
    pub vertex_count: usize,
}
