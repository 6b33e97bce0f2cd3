//! Strict text decoding over an ordered list of candidate encodings.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use std::borrow::Cow;

/// Decode `bytes` as `label`, or `None` if the bytes are not valid text in
/// that encoding.
///
/// Decoding never substitutes replacement characters. UTF-8 and UTF-16 check
/// themselves. Single-byte encodings accept any byte sequence, so for them text
/// containing control characters other than tab, CR and LF is rejected: this
/// is how a wrong guess (EBCDIC read as Windows-1252, for instance) is told
/// apart from real text.
pub(crate) fn decode<'a>(bytes: &'a [u8], label: &str) -> Option<Cow<'a, str>> {
    let label = label.trim();
    let encoding = Encoding::for_label(label.as_bytes())?;
    let bom = Encoding::for_bom(bytes);

    let (encoding, body) = if encoding == UTF_8 {
        match bom {
            Some((found, len)) if found == UTF_8 => (UTF_8, &bytes[len..]),
            _ => (UTF_8, bytes),
        }
    } else if encoding == UTF_16LE || encoding == UTF_16BE {
        match bom {
            Some((found, len)) if found == UTF_16LE || found == UTF_16BE => (found, &bytes[len..]),
            // "utf-16" alone does not say which byte order to use
            _ if label.eq_ignore_ascii_case("utf-16") => return None,
            _ => (encoding, bytes),
        }
    } else {
        (encoding, bytes)
    };

    let text = encoding.decode_without_bom_handling_and_without_replacement(body)?;
    if encoding.is_single_byte()
        && text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return None;
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBFa,b\n";
        assert_eq!(decode(bytes, "utf-8").as_deref(), Some("a,b\n"));
    }

    #[test]
    fn test_utf8_rejects_invalid_bytes() {
        assert!(decode(b"caf\xE9", "utf-8").is_none());
    }

    #[test]
    fn test_latin1_accepts_high_bytes() {
        assert_eq!(decode(b"caf\xE9", "latin1").as_deref(), Some("café"));
    }

    #[test]
    fn test_utf16_requires_bom() {
        let without_bom: Vec<u8> = "a,b".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert!(decode(&without_bom, "utf-16").is_none());
        assert_eq!(decode(&without_bom, "utf-16le").as_deref(), Some("a,b"));

        let mut with_bom = vec![0xFE, 0xFF];
        with_bom.extend("a,b".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode(&with_bom, "utf-16").as_deref(), Some("a,b"));
    }

    #[test]
    fn test_rejects_control_characters() {
        // 0x81 is a C1 control under windows-1252
        assert!(decode(b"\x81\x6B\x82", "cp1252").is_none());
        assert!(decode(b"a\x1Bb", "latin1").is_none());
    }

    #[test]
    fn test_utf8_keeps_control_characters() {
        assert_eq!(
            decode(b"ann,\x1B[1mbold\x1B[0m\n", "utf-8").as_deref(),
            Some("ann,\u{1b}[1mbold\u{1b}[0m\n")
        );
        assert_eq!(decode(b"a,b\n1,2\n\x1A", "utf-8").as_deref(), Some("a,b\n1,2\n\u{1a}"));
    }

    #[test]
    fn test_unknown_label() {
        assert!(decode(b"a", "not-an-encoding").is_none());
    }
}
