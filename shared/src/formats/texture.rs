//! Texture asset payload
//!
//! # Layout
//! ```text
//! 0x00: magic u16 (16401)
//! 0x02: width i32
//! 0x06: height i32
//! 0x0A: mipmap_count u8
//! 0x0B: pixels (width * height * 4 bytes, RGBA8, row-major)
//! var:  mipmaps (ignored)
//! ```

use crate::error::FormatError;

pub const TEXTURE_MAGIC: u16 = 16401;

/// Texture header (11 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub magic: u16,
    pub width: i32,
    pub height: i32,
    pub mipmap_count: u8,
}

impl TextureHeader {
    pub const SIZE: usize = 11;

    pub fn new(width: i32, height: i32, mipmap_count: u8) -> Self {
        Self {
            magic: TEXTURE_MAGIC,
            width,
            height,
            mipmap_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.magic.to_le_bytes());
        bytes[2..6].copy_from_slice(&self.width.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.height.to_le_bytes());
        bytes[10] = self.mipmap_count;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: u16::from_le_bytes([bytes[0], bytes[1]]),
            width: i32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            height: i32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]),
            mipmap_count: bytes[10],
        })
    }
}

/// Decoded RGBA8 texture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureContent {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureContent {
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, FormatError> {
        let header = TextureHeader::from_bytes(data).ok_or_else(|| FormatError::TooShort {
            asset: format!("texture '{name}'"),
            expected: TextureHeader::SIZE,
            actual: data.len(),
        })?;

        if header.magic != TEXTURE_MAGIC {
            return Err(FormatError::InvalidTextureHeader {
                name: name.to_string(),
                expected: TEXTURE_MAGIC,
                actual: header.magic,
            });
        }
        if header.width < 0 || header.height < 0 {
            return Err(FormatError::NegativeDimensions {
                asset: format!("texture '{name}'"),
                width: header.width,
                height: header.height,
            });
        }

        let pixel_len = header.width as usize * header.height as usize * 4;
        let expected = TextureHeader::SIZE + pixel_len;
        if data.len() < expected {
            return Err(FormatError::TooShort {
                asset: format!("texture '{name}'"),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width: header.width as u32,
            height: header.height as u32,
            pixels: data[TextureHeader::SIZE..expected].to_vec(),
        })
    }

    /// Swap row `y` with row `height - 1 - y`
    pub fn flip_vertical(&mut self) {
        let stride = self.width as usize * 4;
        let height = self.height as usize;
        if stride == 0 {
            return;
        }
        for y in 0..height / 2 {
            let (top, bottom) = self.pixels.split_at_mut((height - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = TextureHeader::new(self.width as i32, self.height as i32, 0);
        let mut out = Vec::with_capacity(TextureHeader::SIZE + self.pixels.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&self.pixels);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_bytes(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
        let mut data = TextureHeader::new(width, height, 1).to_bytes().to_vec();
        data.extend_from_slice(pixels);
        data
    }

    #[test]
    fn test_empty_texture() {
        let tex = TextureContent::parse("empty", &texture_bytes(0, 0, &[])).unwrap();
        assert_eq!(tex.width, 0);
        assert_eq!(tex.height, 0);
        assert!(tex.pixels.is_empty());
    }

    #[test]
    fn test_bad_magic() {
        let mut data = texture_bytes(1, 1, &[0; 4]);
        data[0..2].copy_from_slice(&16400u16.to_le_bytes());
        let err = TextureContent::parse("tile", &data).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidTextureHeader {
                name: "tile".to_string(),
                expected: 16401,
                actual: 16400,
            }
        );
        assert!(err.to_string().contains("16401"));
        assert!(err.to_string().contains("16400"));
    }

    #[test]
    fn test_negative_dimensions() {
        let data = texture_bytes(-1, 4, &[]);
        assert!(matches!(
            TextureContent::parse("neg", &data),
            Err(FormatError::NegativeDimensions { width: -1, height: 4, .. })
        ));
    }

    #[test]
    fn test_pixels_and_trailing_mipmaps() {
        let pixels: Vec<u8> = (0..16).collect();
        let mut data = texture_bytes(2, 2, &pixels);
        // Trailing mipmap data is ignored
        data.extend_from_slice(&[0xFF; 4]);

        let tex = TextureContent::parse("t", &data).unwrap();
        assert_eq!(tex.pixels, pixels);
    }

    #[test]
    fn test_short_pixels() {
        let data = texture_bytes(2, 2, &[0; 15]);
        assert!(matches!(
            TextureContent::parse("t", &data),
            Err(FormatError::TooShort { expected: 27, actual: 26, .. })
        ));
    }

    #[test]
    fn test_flip_vertical() {
        // 1x3 texture, one pixel per row
        let mut tex = TextureContent {
            width: 1,
            height: 3,
            pixels: vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3],
        };
        tex.flip_vertical();
        assert_eq!(tex.pixels, vec![3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1]);
    }
}
