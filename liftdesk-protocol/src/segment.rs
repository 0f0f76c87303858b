//! Seven-segment digit codec.
//!
//! The keypad display and the motor controllers exchange raw segment
//! patterns, not numbers: the board renders the target height into
//! segment bytes for the keypad, and decodes the height each controller
//! reports back from the segment bytes in its display frame. The same
//! table also renders the status words ("rSt", "Err", "S1".."S3").
//!
//! Bit layout: bit0..bit6 = segments a..g, bit7 = decimal point.

/// Decimal-point bit, masked off before table lookup
pub const DP_BIT: u8 = 0x80;

/// Segment patterns for digits 0-9 followed by letters A-Z.
///
/// Letters reuse digit patterns where the glyphs coincide (O=0, S=5, Z=2);
/// decoding scans digits first, so those patterns always read as digits.
const SEGMENT_TABLE: [u8; 36] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F, // 0-9
    0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, 0x3D, 0x76, 0x30, 0x1E, // A-J
    0x75, 0x38, 0x15, 0x54, 0x3F, 0x73, 0x67, 0x50, 0x6D, 0x78, // K-T
    0x3E, 0x1C, 0x2A, 0x76, 0x6E, 0x5B, // U-Z
];

/// Number of table entries searched when `alphanumeric` is false
const DIGIT_RANGE: usize = 10;

/// The reserved "rSt" word a controller shows while re-calibrating.
///
/// Seeing this pattern in a height position is a fault indicator, not a
/// reading.
pub const WORD_RESET: [u8; 3] = [0x50, 0x6D, 0x78];

/// The "Err" word shown on the keypad in the error state
pub const WORD_ERROR: [u8; 3] = [0x79, 0x50, 0x50];

/// A display-frame decode that did not produce a height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeAnomaly {
    /// Digits matched the reserved reset word
    ResetWord,
    /// One or more patterns matched no table entry
    Unrecognized,
}

/// Encode a table index (0-9 digits, 10-35 letters) into a segment byte.
///
/// Out-of-range values render as a blank display.
pub fn encode_digit(value: u8) -> u8 {
    SEGMENT_TABLE.get(value as usize).copied().unwrap_or(0x00)
}

/// Encode an ASCII uppercase letter into a segment byte
pub fn encode_letter(letter: u8) -> u8 {
    if letter.is_ascii_uppercase() {
        encode_digit(letter - b'A' + 10)
    } else {
        0x00
    }
}

/// Decode a segment byte back to its table index.
///
/// The decimal-point bit is masked off before comparison. Only the digit
/// subrange is scanned unless `alphanumeric` is set. Returns `None` for
/// patterns that match no entry - callers must treat that as a decode
/// failure, never as zero.
pub fn decode_digit(byte: u8, alphanumeric: bool) -> Option<u8> {
    let pattern = byte & !DP_BIT;
    let range = if alphanumeric {
        SEGMENT_TABLE.len()
    } else {
        DIGIT_RANGE
    };

    SEGMENT_TABLE[..range]
        .iter()
        .position(|&entry| entry == pattern)
        .map(|index| index as u8)
}

/// Render a height into the three display digits.
///
/// Heights of 1000 and above show three whole digits (thousands,
/// hundreds, tens). Below 1000 the display shows hundreds, tens and a
/// tenths-style ones digit, with the decimal point lit on the middle
/// digit so the far end can tell the two layouts apart (621 reads
/// "62.1").
pub fn height_to_digits(height: f32) -> [u8; 3] {
    let h = (height + 0.5) as u32;
    if h >= 1000 {
        [
            encode_digit((h / 1000 % 10) as u8),
            encode_digit((h / 100 % 10) as u8),
            encode_digit((h / 10 % 10) as u8),
        ]
    } else {
        [
            encode_digit((h / 100) as u8),
            encode_digit((h / 10 % 10) as u8) | DP_BIT,
            encode_digit((h % 10) as u8),
        ]
    }
}

/// Decode three display digits back into a height.
///
/// Exact inverse of [`height_to_digits`]; the reserved reset word and
/// unrecognized patterns are reported as anomalies.
pub fn digits_to_height(digits: [u8; 3]) -> Result<f32, DecodeAnomaly> {
    if digits == WORD_RESET {
        return Err(DecodeAnomaly::ResetWord);
    }

    let d0 = decode_digit(digits[0], false).ok_or(DecodeAnomaly::Unrecognized)?;
    let d1 = decode_digit(digits[1], false).ok_or(DecodeAnomaly::Unrecognized)?;
    let d2 = decode_digit(digits[2], false).ok_or(DecodeAnomaly::Unrecognized)?;

    let height = if digits[1] & DP_BIT != 0 {
        // Tenths layout: hundreds, tens, ones
        u32::from(d0) * 100 + u32::from(d1) * 10 + u32::from(d2)
    } else {
        // Whole layout: thousands, hundreds, tens
        u32::from(d0) * 1000 + u32::from(d1) * 100 + u32::from(d2) * 10
    };
    Ok(height as f32)
}

/// Render the blinking memory-mode word: "S" plus the selected slot digit
pub fn memory_word(slot: Option<u8>) -> [u8; 3] {
    let digit = match slot {
        Some(k) => encode_digit(k),
        None => 0x00,
    };
    [encode_letter(b'S'), digit, 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_roundtrip() {
        for d in 0..10u8 {
            let byte = encode_digit(d);
            assert_eq!(decode_digit(byte, false), Some(d));
        }
    }

    #[test]
    fn test_letter_only_in_alphanumeric_range() {
        let t = encode_letter(b'T');
        assert_eq!(decode_digit(t, false), None);
        assert_eq!(decode_digit(t, true), Some(29));
    }

    #[test]
    fn test_decode_masks_decimal_point() {
        let byte = encode_digit(2) | DP_BIT;
        assert_eq!(decode_digit(byte, false), Some(2));
    }

    #[test]
    fn test_decode_unknown_pattern() {
        // 0x49 (segments a, d, g) is no digit and no letter
        assert_eq!(decode_digit(0x49, true), None);
    }

    #[test]
    fn test_reset_word_spelling() {
        let word = [encode_letter(b'R'), encode_letter(b'S'), encode_letter(b'T')];
        assert_eq!(word, WORD_RESET);
    }

    #[test]
    fn test_height_tenths_layout() {
        // 621 -> "62.1": DP on the middle digit
        let digits = height_to_digits(621.0);
        assert_eq!(digits[0], encode_digit(6));
        assert_eq!(digits[1], encode_digit(2) | DP_BIT);
        assert_eq!(digits[2], encode_digit(1));
        assert_eq!(digits_to_height(digits), Ok(621.0));
    }

    #[test]
    fn test_height_whole_layout() {
        // 1280 -> "128": no DP, tens resolution
        let digits = height_to_digits(1280.0);
        assert_eq!(digits[0], encode_digit(1));
        assert_eq!(digits[1], encode_digit(2));
        assert_eq!(digits[2], encode_digit(8));
        assert_eq!(digits_to_height(digits), Ok(1280.0));
    }

    #[test]
    fn test_height_roundtrip_across_range() {
        for h in (620..=1280).step_by(7) {
            let digits = height_to_digits(h as f32);
            let decoded = digits_to_height(digits).unwrap();
            if h >= 1000 {
                // Whole layout drops the ones digit
                assert_eq!(decoded, (h / 10 * 10) as f32);
            } else {
                assert_eq!(decoded, h as f32);
            }
        }
    }

    #[test]
    fn test_reset_word_is_anomaly() {
        assert_eq!(digits_to_height(WORD_RESET), Err(DecodeAnomaly::ResetWord));
    }

    #[test]
    fn test_garbage_digits_are_anomaly() {
        assert_eq!(
            digits_to_height([0x49, 0x3F, 0x3F]),
            Err(DecodeAnomaly::Unrecognized)
        );
    }

    #[test]
    fn test_memory_word() {
        let unselected = memory_word(None);
        assert_eq!(unselected[0], encode_letter(b'S'));
        assert_eq!(unselected[1], 0x00);

        let slot2 = memory_word(Some(2));
        assert_eq!(slot2[1], encode_digit(2));
    }
}
