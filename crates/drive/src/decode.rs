//! Best-effort text decoding for downloaded delimited files.

use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode file bytes as text.
///
/// Valid UTF-8 (with or without a BOM) is used as-is. Anything else is read
/// as windows-1252, which maps every byte to some character, so decoding
/// never fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("Content is not UTF-8, decoding as windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(decode_text("año,región".as_bytes()), "año,región");
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFid,name"), "id,name");
    }

    #[test]
    fn test_latin_fallback() {
        // "año" in windows-1252
        assert_eq!(decode_text(b"a\xF1o"), "año");
        // 0x80 is the euro sign in windows-1252
        assert_eq!(decode_text(b"\x80 5"), "€ 5");
    }
}
