//! Hex payload codec
//!
//! Converts between user-typed hex text and raw frame bytes.
//!
//! Two layers exist on purpose:
//!
//! - [`sanitize_input`] is the lenient per-keystroke filter used by the send box
//! - [`decode`] is the strict validator that every payload goes through before
//!   it reaches the backend
//!
//! [`encode`] produces the canonical form used by the response log:
//! upper-case byte pairs separated by single spaces.

use crate::error::InvalidHexError;
use std::fmt::Write;

/// Decode hex text into bytes.
///
/// Every `0x`/`0X` marker and all whitespace are removed first, wherever they
/// appear, so `"0xAB CD"`, `"ab cd"` and `"0xAB0xCD"` all decode to
/// `[0xAB, 0xCD]`.
pub fn decode(input: &str) -> Result<Vec<u8>, InvalidHexError> {
    let digits = normalize(input);

    if digits.is_empty() {
        return Err(InvalidHexError::Empty);
    }

    if let Some((position, ch)) = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(InvalidHexError::InvalidCharacter { ch, position });
    }

    if digits.len() % 2 != 0 {
        return Err(InvalidHexError::OddLength(digits.len()));
    }

    // Only ASCII hex digits remain, so byte pairs are always valid
    Ok(digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

/// Render bytes as `"01 02 FF"`
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

/// Keystroke filter for the send box: keep hex digits only, upper-cased.
pub fn sanitize_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Drop whitespace and every `0x`/`0X` marker in a single left-to-right pass.
/// Removing whitespace never joins two characters into a new marker.
fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '0' && matches!(chars.peek(), Some('x' | 'X')) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_with_prefix_and_spaces() {
        assert_eq!(decode("0xAB CD"), Ok(vec![0xAB, 0xCD]));
        assert_eq!(decode("0Xab\tcd\n"), Ok(vec![0xAB, 0xCD]));
        assert_eq!(decode("0x01 0x02"), Ok(vec![0x01, 0x02]));
    }

    #[test]
    fn test_decode_odd_length() {
        assert_eq!(decode("ABC"), Err(InvalidHexError::OddLength(3)));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(""), Err(InvalidHexError::Empty));
        assert_eq!(decode("   "), Err(InvalidHexError::Empty));
        assert_eq!(decode("0x"), Err(InvalidHexError::Empty));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert_eq!(
            decode("AG"),
            Err(InvalidHexError::InvalidCharacter { ch: 'G', position: 1 })
        );
        // A lone `x` is not a marker
        assert!(matches!(
            decode("x1"),
            Err(InvalidHexError::InvalidCharacter { ch: 'x', .. })
        ));
        assert_eq!(decode("0x100x20"), Ok(vec![0x10, 0x20]));
    }

    #[test]
    fn test_decode_strips_markers_inside_groups() {
        assert_eq!(decode("AB0xCD"), Ok(vec![0xAB, 0xCD]));
        assert_eq!(decode("0xAB0XCD"), Ok(vec![0xAB, 0xCD]));
        assert_eq!(decode("0x01 020x03"), Ok(vec![0x01, 0x02, 0x03]));
        // Whitespace between `0` and `x` does not form a marker
        assert!(matches!(
            decode("0 x12"),
            Err(InvalidHexError::InvalidCharacter { ch: 'x', position: 1 })
        ));
    }

    #[test]
    fn test_decode_zero_bytes_survive_marker_stripping() {
        assert_eq!(decode("00"), Ok(vec![0x00]));
        assert_eq!(decode("0x00"), Ok(vec![0x00]));
        assert_eq!(decode("0x10 0x20"), Ok(vec![0x10, 0x20]));
    }

    #[test]
    fn test_encode_canonical() {
        assert_eq!(encode(&[0x01, 0x02]), "01 02");
        assert_eq!(encode(&[0xAB, 0x0C, 0xFF]), "AB 0C FF");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("ab-cd zz 0x1f"), "ABCD01F");
        assert_eq!(sanitize_input("ghij"), "");
    }

    #[test]
    fn test_sanitized_text_still_validated() {
        // The filter can leave an odd digit count; decode must still reject it
        let filtered = sanitize_input("a-b-c");
        assert_eq!(decode(&filtered), Err(InvalidHexError::OddLength(3)));
    }

    fn spaced_hex(bytes: &[u8], lower: bool, prefix: bool) -> String {
        bytes
            .iter()
            .map(|b| {
                let pair = if lower { format!("{:02x}", b) } else { format!("{:02X}", b) };
                if prefix { format!("0x{}", pair) } else { pair }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    proptest! {
        #[test]
        fn test_decode_then_encode_is_canonical(
            bytes in prop::collection::vec(any::<u8>(), 1..64),
            lower in any::<bool>(),
            prefix in any::<bool>(),
        ) {
            let text = spaced_hex(&bytes, lower, prefix);
            let decoded = decode(&text).unwrap();
            prop_assert_eq!(&decoded, &bytes);
            prop_assert_eq!(encode(&decoded), spaced_hex(&bytes, false, false).replace("  ", " "));
        }

        #[test]
        fn test_odd_digit_count_always_rejected(digits in "[0-9A-Fa-f]{0,63}") {
            prop_assume!(digits.len() % 2 == 1);
            prop_assert_eq!(decode(&digits), Err(InvalidHexError::OddLength(digits.len())));
        }

        #[test]
        fn test_non_hex_character_always_rejected(
            digits in "([0-9A-Fa-f]{2}){0,16}",
            bad in prop::sample::select(vec!['g', 'G', 'z', 'Z', '!', '#', '-', '_', '/', '.', ':', 'é']),
            at in any::<prop::sample::Index>(),
        ) {
            let mut text = digits.clone();
            text.insert(at.index(digits.len() + 1), bad);
            prop_assert!(
                matches!(decode(&text), Err(InvalidHexError::InvalidCharacter { ch, .. }) if ch == bad),
                "decode({:?}) accepted a non-hex character",
                text
            );
        }
    }
}
