//! Decoding of `\uXXXX` escapes, including UTF-16 surrogate pairs.
//!
//! [`UnicodeEscapeBuffer`] accumulates exactly four ASCII hexadecimal digits
//! into a UTF-16 code unit. [`combine`] turns one or two code units into a
//! `char`, rejecting lone surrogates.

use crate::error::SyntaxError;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn hex_val(b: u8) -> Option<u32> {
        match b {
            b'0'..=b'9' => Some(u32::from(b - b'0')),
            b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
            b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
            _ => None,
        }
    }

    /// Feeds one hex digit. Returns the code unit once the fourth digit
    /// arrives and resets for the next escape.
    pub fn feed(&mut self, b: u8) -> Result<Option<u16>, SyntaxError> {
        let d = Self::hex_val(b).ok_or(SyntaxError::InvalidUnicodeEscapeChar(char::from(b)))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        #[expect(clippy::cast_possible_truncation)]
        let unit = self.acc as u16;
        self.acc = 0;
        self.len = 0;
        Ok(Some(unit))
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

/// Combines a code unit (and its low surrogate, if it is a high surrogate)
/// into a scalar value.
pub(crate) fn combine(high: u16, low: Option<u16>) -> Result<char, SyntaxError> {
    let code = match low {
        None => u32::from(high),
        Some(low) if (0xDC00..=0xDFFF).contains(&low) && is_high_surrogate(high) => {
            0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        }
        Some(low) => return Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(low))),
    };
    char::from_u32(code).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(code))
}
