//! In-memory WAV container encoding.
//!
//! The remote transcription endpoint expects a self-contained mono 16-bit PCM
//! WAV file, so the header layout must be reproduced byte-exactly: canonical
//! 44-byte header (RIFF size = 36 + data length, PCM format chunk, data chunk)
//! followed by little-endian samples.

use crate::error::{CallscribeError, Result};
use std::io::Cursor;

/// Encode PCM samples as a mono 16-bit WAV file.
///
/// Deterministic: the same samples and rate always produce identical bytes.
/// Output length is exactly `44 + 2 * samples.len()`.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| CallscribeError::WavEncode {
            message: format!("Failed to create WAV writer: {}", e),
        })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| CallscribeError::WavEncode {
                message: format!("Failed to write sample: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| CallscribeError::WavEncode {
        message: format!("Failed to finalize WAV header: {}", e),
    })?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::SAMPLE_RATE;

    fn field_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn field_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn encode_length_is_header_plus_samples() {
        let samples = vec![0i16; 1600];
        let wav = encode_wav(&samples, SAMPLE_RATE).unwrap();
        assert_eq!(wav.len(), 44 + 1600 * 2);
    }

    #[test]
    fn encode_three_zero_samples_has_exact_header_fields() {
        let wav = encode_wav(&[0i16, 0, 0], 8000).unwrap();

        assert_eq!(wav.len(), 50);
        assert_eq!(&wav[0..4], b"RIFF");
        // Total-size field = 36 + data length.
        assert_eq!(field_u32(&wav, 4), 42);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        // Format chunk size and linear PCM tag.
        assert_eq!(field_u32(&wav, 16), 16);
        assert_eq!(field_u16(&wav, 20), 1);
        // Mono.
        assert_eq!(field_u16(&wav, 22), 1);
        // Sample rate and byte rate = rate * 2.
        assert_eq!(field_u32(&wav, 24), 8000);
        assert_eq!(field_u32(&wav, 28), 16000);
        // Block align and bits per sample.
        assert_eq!(field_u16(&wav, 32), 2);
        assert_eq!(field_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        // Data length = sample count * 2.
        assert_eq!(field_u32(&wav, 40), 6);
    }

    #[test]
    fn encode_samples_are_little_endian_after_header() {
        let wav = encode_wav(&[0x0102i16, -2], 8000).unwrap();
        assert_eq!(&wav[44..46], &[0x02, 0x01]);
        assert_eq!(&wav[46..48], &(-2i16).to_le_bytes());
    }

    #[test]
    fn encode_is_deterministic() {
        let samples: Vec<i16> = (0..400).map(|i| (i * 7 % 311) as i16).collect();
        let first = encode_wav(&samples, SAMPLE_RATE).unwrap();
        let second = encode_wav(&samples, SAMPLE_RATE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn encode_empty_input_is_header_only() {
        let wav = encode_wav(&[], 8000).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(field_u32(&wav, 4), 36);
        assert_eq!(field_u32(&wav, 40), 0);
    }

    #[test]
    fn encode_roundtrips_through_hound_reader() {
        let samples = vec![100i16, -200, 300, -400];
        let wav = encode_wav(&samples, 8000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
