//! Byte input and BOM detection (`spec.md` §4.1).
//!
//! The reader streams a pack in fixed-size chunks; BOM detection looks
//! only at the first non-empty chunk.

use std::io::{self, Read};

pub const CHUNK_SIZE: usize = 4096;

/// BOM kinds the detector recognizes, in the order they must be tried:
/// UTF-32 LE must be tried before UTF-16 LE since both start `FF FE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bom {
    Utf8,
    Utf32Le,
    Utf32Be,
    Utf16Le,
    Utf16Be,
}

impl Bom {
    const KNOWN: [(Bom, &'static [u8]); 5] = [
        (Bom::Utf8, &[0xEF, 0xBB, 0xBF]),
        (Bom::Utf32Le, &[0xFF, 0xFE, 0x00, 0x00]),
        (Bom::Utf32Be, &[0x00, 0x00, 0xFE, 0xFF]),
        (Bom::Utf16Le, &[0xFF, 0xFE]),
        (Bom::Utf16Be, &[0xFE, 0xFF]),
    ];

    /// Scans `bytes` against the known BOM prefixes in priority order.
    /// Returns the matched BOM and its byte length, or `None` if `bytes`
    /// starts with none of them.
    pub fn detect(bytes: &[u8]) -> Option<(Bom, usize)> {
        for (bom, prefix) in Self::KNOWN {
            if bytes.starts_with(prefix) {
                return Some((bom, prefix.len()));
            }
        }
        None
    }
}

/// Reads a whole pack file into memory in [`CHUNK_SIZE`]-byte chunks,
/// then strips a leading UTF-8 BOM or rejects any other recognized BOM.
///
/// Returns the input with any UTF-8 BOM removed. A non-UTF-8 BOM is
/// reported by returning `Err` — the caller turns this into `E1002`.
pub fn read_and_strip_bom(mut reader: impl Read) -> io::Result<Result<Vec<u8>, ()>> {
    let mut data = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }

    if data.is_empty() {
        return Ok(Ok(data));
    }

    match Bom::detect(&data) {
        Some((Bom::Utf8, len)) => {
            data.drain(..len);
            Ok(Ok(data))
        }
        Some(_) => Ok(Err(())),
        None => Ok(Ok(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_utf8_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'x'];
        assert_eq!(Bom::detect(&bytes), Some((Bom::Utf8, 3)));
    }

    #[test]
    fn prefers_utf32_le_over_utf16_le() {
        let bytes = [0xFF, 0xFE, 0x00, 0x00];
        assert_eq!(Bom::detect(&bytes), Some((Bom::Utf32Le, 4)));
    }

    #[test]
    fn detects_utf16_le_without_trailing_zeros() {
        let bytes = [0xFF, 0xFE, b'x', b'\0'];
        assert_eq!(Bom::detect(&bytes), Some((Bom::Utf16Le, 2)));
    }

    #[test]
    fn no_bom_on_plain_text() {
        let bytes = b"@language";
        assert_eq!(Bom::detect(bytes), None);
    }

    #[test]
    fn strips_utf8_bom_from_stream() {
        let input = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        let result = read_and_strip_bom(&input[..]).unwrap().unwrap();
        assert_eq!(result, b"hi");
    }

    #[test]
    fn rejects_utf16_be_bom() {
        let input = [0xFE, 0xFF, b'h', b'i'];
        let result = read_and_strip_bom(&input[..]).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = read_and_strip_bom(&[][..]).unwrap().unwrap();
        assert!(result.is_empty());
    }
}
