//! The TAPE container format: a fixed 2 KiB envelope carrying an
//! assembled program plus metadata.

use crate::error::TapeError;

pub const TAPE_SIZE: usize = 2048;
const HEADER_SIZE: usize = 128;
const PAYLOAD_LIMIT: usize = TAPE_SIZE - HEADER_SIZE;
const MAGIC: &[u8; 4] = b"TAPE";
const STRING_FIELD_LEN: usize = 32;
const MAX_STRING_LEN: usize = 31;

const OFFSET_VERSION_MAJOR: usize = 4;
const OFFSET_VERSION_MINOR: usize = 5;
const OFFSET_PAYLOAD_SIZE: usize = 6;
const OFFSET_TIMESTAMP: usize = 8;
const OFFSET_NAME: usize = 12;
const OFFSET_AUTHOR: usize = 44;
const OFFSET_DESCRIPTION: usize = 76;
const OFFSET_CHECKSUM: usize = 124;
const CHECKSUM_COVERS: usize = 124;

/// The header fields surfaced to callers; the wire format is the fixed
/// byte layout below, not this struct's memory layout.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TapeMetadata {
    pub name: String,
    pub author: String,
    pub description: String,
    pub timestamp: u32,
}

impl Default for TapeMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            description: String::new(),
            timestamp: 0,
        }
    }
}

/// Builds a 2048-byte TAPE buffer from `payload` and `meta`.
pub fn encode(payload: &[u8], meta: &TapeMetadata) -> Result<[u8; TAPE_SIZE], TapeError> {
    if payload.len() > PAYLOAD_LIMIT {
        return Err(TapeError::ProgramTooLarge {
            size: payload.len(),
            limit: PAYLOAD_LIMIT,
        });
    }

    let mut buf = [0u8; TAPE_SIZE];
    buf[0..4].copy_from_slice(MAGIC);
    buf[OFFSET_VERSION_MAJOR] = 1;
    buf[OFFSET_VERSION_MINOR] = 0;

    let payload_size = payload.len() as u16;
    buf[OFFSET_PAYLOAD_SIZE..OFFSET_PAYLOAD_SIZE + 2].copy_from_slice(&payload_size.to_be_bytes());
    buf[OFFSET_TIMESTAMP..OFFSET_TIMESTAMP + 4].copy_from_slice(&meta.timestamp.to_be_bytes());

    write_string_field(&mut buf, OFFSET_NAME, &meta.name);
    write_string_field(&mut buf, OFFSET_AUTHOR, &meta.author);
    write_string_field(&mut buf, OFFSET_DESCRIPTION, &meta.description);

    let checksum = header_checksum(&buf);
    buf[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 2].copy_from_slice(&checksum.to_be_bytes());

    buf[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);

    Ok(buf)
}

/// Parses a 2048-byte TAPE buffer back into metadata and payload. A
/// checksum mismatch is logged and decoding proceeds — it is a
/// diagnostic, not a hard failure.
pub fn decode(buf: &[u8]) -> Result<(TapeMetadata, Vec<u8>), TapeError> {
    if buf.len() < HEADER_SIZE {
        return Err(TapeError::MalformedTape { len: buf.len() });
    }
    if &buf[0..4] != MAGIC {
        return Err(TapeError::NotATape);
    }

    let payload_size =
        u16::from_be_bytes([buf[OFFSET_PAYLOAD_SIZE], buf[OFFSET_PAYLOAD_SIZE + 1]]) as usize;
    let timestamp = u32::from_be_bytes([
        buf[OFFSET_TIMESTAMP],
        buf[OFFSET_TIMESTAMP + 1],
        buf[OFFSET_TIMESTAMP + 2],
        buf[OFFSET_TIMESTAMP + 3],
    ]);

    let name = read_string_field(buf, OFFSET_NAME);
    let author = read_string_field(buf, OFFSET_AUTHOR);
    let description = read_string_field(buf, OFFSET_DESCRIPTION);

    let stored_checksum =
        u16::from_be_bytes([buf[OFFSET_CHECKSUM], buf[OFFSET_CHECKSUM + 1]]);
    let computed_checksum = header_checksum(buf);
    if stored_checksum != computed_checksum {
        log::warn!(
            "tape header checksum mismatch: stored {:#06x}, computed {:#06x}",
            stored_checksum,
            computed_checksum
        );
    }

    let payload_end = (HEADER_SIZE + payload_size).min(buf.len());
    let payload = buf[HEADER_SIZE..payload_end].to_vec();

    Ok((
        TapeMetadata {
            name,
            author,
            description,
            timestamp,
        },
        payload,
    ))
}

fn write_string_field(buf: &mut [u8; TAPE_SIZE], offset: usize, value: &str) {
    let truncated: String = value.chars().take(MAX_STRING_LEN).collect();
    let bytes = truncated.as_bytes();
    let len = bytes.len().min(STRING_FIELD_LEN);
    buf[offset..offset + len].copy_from_slice(&bytes[..len]);
}

fn read_string_field(buf: &[u8], offset: usize) -> String {
    let field = &buf[offset..offset + STRING_FIELD_LEN];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Sum of header bytes `0..CHECKSUM_COVERS`, mod 65536; the checksum
/// field itself and anything written after it never feed the sum.
fn header_checksum(buf: &[u8]) -> u16 {
    let sum: u32 = buf[..CHECKSUM_COVERS].iter().map(|&b| b as u32).sum();
    (sum % 65536) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_payload_and_metadata() {
        let meta = TapeMetadata {
            name: "X".to_string(),
            author: "Y".to_string(),
            description: "Z".to_string(),
            timestamp: 0,
        };
        let payload = [0xDE, 0xAD, 0xBE, 0xEF];

        let tape = encode(&payload, &meta).unwrap();
        let (decoded_meta, decoded_payload) = decode(&tape).unwrap();

        assert_eq!(decoded_payload, payload);
        assert_eq!(decoded_meta, meta);
    }

    #[test]
    fn payload_of_exactly_1920_bytes_encodes() {
        let payload = vec![0xAB; PAYLOAD_LIMIT];
        assert!(encode(&payload, &TapeMetadata::default()).is_ok());
    }

    #[test]
    fn payload_of_1921_bytes_fails() {
        let payload = vec![0xAB; PAYLOAD_LIMIT + 1];
        assert!(matches!(
            encode(&payload, &TapeMetadata::default()),
            Err(TapeError::ProgramTooLarge { .. })
        ));
    }

    #[test]
    fn decode_rejects_a_buffer_without_the_magic() {
        let buf = [0u8; TAPE_SIZE];
        assert!(matches!(decode(&buf), Err(TapeError::NotATape)));
    }

    #[test]
    fn decode_rejects_a_too_short_buffer() {
        let buf = [0u8; 10];
        assert!(matches!(decode(&buf), Err(TapeError::MalformedTape { .. })));
    }

    #[test]
    fn decode_tolerates_a_corrupted_checksum() {
        let mut tape = encode(&[1, 2, 3], &TapeMetadata::default()).unwrap();
        tape[OFFSET_CHECKSUM] ^= 0xFF; // corrupt it
        let (_, payload) = decode(&tape).unwrap();
        assert_eq!(payload, vec![1, 2, 3]);
    }

    #[test]
    fn names_longer_than_31_bytes_are_truncated() {
        let meta = TapeMetadata {
            name: "a".repeat(40),
            ..TapeMetadata::default()
        };
        let tape = encode(&[], &meta).unwrap();
        let (decoded, _) = decode(&tape).unwrap();
        assert_eq!(decoded.name.len(), MAX_STRING_LEN);
    }
}
