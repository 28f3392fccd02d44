//! Codecs for PLC string flavours.
//!
//! `STRING(n)` occupies `n + 1` bytes of Windows-1252 with a NUL terminator;
//! `WSTRING(n)` occupies `2n + 2` bytes of UTF-16LE with a NUL terminator.
//! Buffer sizes come from type metadata at runtime, so these work on dynamic
//! slices rather than fixed-size arrays.

use super::error::StringError;
use encoding_rs::{UTF_16LE, WINDOWS_1252};

/// Decodes a Windows-1252 buffer up to its first NUL (or the full slice).
pub fn decode_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (cow, _, _) = WINDOWS_1252.decode(&bytes[..end]);
    cow.into_owned()
}

/// Encodes into a Windows-1252 buffer of exactly `capacity` bytes,
/// NUL-terminated and zero-padded.
///
/// Fails if the text does not fit (`capacity - 1` usable bytes) or contains
/// characters outside the code page.
pub fn encode_string(text: &str, capacity: usize) -> Result<Vec<u8>, StringError> {
    let (encoded, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return Err(StringError::Unencodable {
            encoding: "Windows-1252",
        });
    }
    if capacity == 0 || encoded.len() > capacity - 1 {
        return Err(StringError::TooLong {
            capacity: capacity.saturating_sub(1),
            got: encoded.len(),
        });
    }

    let mut buf = vec![0u8; capacity];
    buf[..encoded.len()].copy_from_slice(&encoded);
    Ok(buf)
}

/// Decodes a UTF-16LE buffer up to its first NUL code unit (or the full slice).
pub fn decode_wstring(bytes: &[u8]) -> String {
    let mut end = bytes.len() & !1;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == 0 && bytes[i + 1] == 0 {
            end = i;
            break;
        }
        i += 2;
    }
    let (cow, _, _) = UTF_16LE.decode(&bytes[..end]);
    cow.into_owned()
}

/// Encodes into a UTF-16LE buffer of exactly `capacity` bytes,
/// NUL-terminated and zero-padded. `capacity` must leave room for the
/// 2-byte terminator.
pub fn encode_wstring(text: &str, capacity: usize) -> Result<Vec<u8>, StringError> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let byte_len = units.len() * 2;
    if capacity < 2 || byte_len > capacity - 2 {
        return Err(StringError::TooLong {
            capacity: capacity.saturating_sub(2),
            got: byte_len,
        });
    }

    let mut buf = vec![0u8; capacity];
    for (i, unit) in units.iter().enumerate() {
        buf[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_roundtrip() {
        let buf = encode_string("Hello", 81).unwrap();
        assert_eq!(buf.len(), 81);
        assert_eq!(buf[5], 0);
        assert_eq!(decode_string(&buf), "Hello");
    }

    #[test]
    fn string_cp1252_euro_sign() {
        // "€" is a single 0x80 byte in CP1252
        let buf = encode_string("5€", 10).unwrap();
        assert_eq!(&buf[..2], &[b'5', 0x80]);
        assert_eq!(decode_string(&buf), "5€");
    }

    #[test]
    fn string_too_long() {
        let err = encode_string("abcdef", 6).unwrap_err();
        assert!(matches!(err, StringError::TooLong { capacity: 5, got: 6 }));
    }

    #[test]
    fn wstring_roundtrip() {
        let buf = encode_wstring("Grüße", 22).unwrap();
        assert_eq!(buf.len(), 22);
        assert_eq!(decode_wstring(&buf), "Grüße");
    }

    #[test]
    fn wstring_unterminated_decodes_fully() {
        let mut buf = Vec::new();
        for unit in "ab".encode_utf16() {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_wstring(&buf), "ab");
    }
}
