//! Audio asset payload (RIFF/WAVE)
//!
//! Headers are read with `hound`; the PCM bytes of the `data` chunk are kept
//! as stored so they can be handed to a mixer without conversion.

use crate::binary::BinaryReader;
use crate::error::FormatError;
use std::io::Cursor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundContent {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Raw PCM bytes from the `data` chunk
    pub data: Vec<u8>,
}

impl SoundContent {
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, FormatError> {
        let reader = hound::WavReader::new(Cursor::new(data)).map_err(|e| FormatError::InvalidWave {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let spec = reader.spec();
        // The reader stops at the start of the samples, right after the
        // data chunk size
        let start = reader.into_inner().position() as usize;
        let mut size = BinaryReader::new(data);
        size.seek(start.saturating_sub(4));
        let declared = size.read_u32("data chunk size")? as usize;
        // Some encoders write a larger size than the file holds
        let end = start.saturating_add(declared).min(data.len());

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            data: data[start.min(end)..end].to_vec(),
        })
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f32 {
        duration_secs(self.data.len() as u64, self.channels, self.bits_per_sample, self.sample_rate)
    }
}

fn duration_secs(byte_len: u64, channels: u16, bits_per_sample: u16, sample_rate: u32) -> f32 {
    let frame_size = u64::from(channels) * (u64::from(bits_per_sample) / 8);
    if frame_size == 0 || sample_rate == 0 {
        return 0.0;
    }
    ((byte_len / frame_size) as f64 / f64::from(sample_rate)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buffer = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buffer
    }

    #[test]
    fn test_parse_pcm16() {
        let data = wav_bytes(2, 44100, &[1, -1, 2, -2]);
        let sound = SoundContent::parse("jump1", &data).unwrap();
        assert_eq!(sound.channels, 2);
        assert_eq!(sound.sample_rate, 44100);
        assert_eq!(sound.bits_per_sample, 16);
        assert_eq!(sound.data.len(), 8);
        assert_eq!(&sound.data[0..4], &[1, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_duration() {
        let data = wav_bytes(1, 10, &[0; 20]);
        let sound = SoundContent::parse("s", &data).unwrap();
        assert_eq!(sound.duration_secs(), 2.0);
    }

    #[test]
    fn test_not_a_wave() {
        let err = SoundContent::parse("bad", b"OggS0000WAVE").unwrap_err();
        assert!(matches!(err, FormatError::InvalidWave { .. }));
    }

    #[test]
    fn test_missing_chunks() {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(b"WAVE");
        let err = SoundContent::parse("empty", &data).unwrap_err();
        assert!(matches!(err, FormatError::InvalidWave { name, .. } if name == "empty"));
    }

    #[test]
    fn test_short_fmt_chunk() {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&14u32.to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(b"fmt ");
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        let err = SoundContent::parse("short", &data).unwrap_err();
        assert!(matches!(err, FormatError::InvalidWave { .. }));
    }

    #[test]
    fn test_skips_extra_chunks() {
        // A LIST chunk ahead of the samples is ignored
        let wav = wav_bytes(1, 8000, &[7, 8]);
        let mut data = wav[..36].to_vec();
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(b"INFO");
        data.extend_from_slice(&wav[36..]);
        let riff_size = (data.len() - 8) as u32;
        data[4..8].copy_from_slice(&riff_size.to_le_bytes());

        let sound = SoundContent::parse("list", &data).unwrap();
        assert_eq!(sound.data, vec![7, 0, 8, 0]);
    }

    #[test]
    fn test_duration_of_large_payload() {
        // 8 GiB of 16-bit stereo at 44.1 kHz
        let secs = duration_secs(8 << 30, 2, 16, 44100);
        assert!((secs - 48_695.77).abs() < 0.01);
        assert_eq!(duration_secs(1 << 20, 0, 16, 44100), 0.0);
    }
}
