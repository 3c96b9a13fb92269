//! Submission body decoding.
//!
//! The whole body is one percent-encoded UTF-8 string. Every `%` must start
//! a two-digit hex escape and `+` stays a literal plus sign.

use percent_encoding::percent_decode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` not followed by two hex digits.
    #[error("malformed percent escape at byte {offset}")]
    MalformedEscape { offset: usize },

    /// The decoded bytes are not UTF-8.
    #[error("submission is not valid UTF-8")]
    InvalidUtf8,
}

/// Percent-decode a raw submission body.
pub fn decode_submission(raw: &[u8]) -> Result<String, DecodeError> {
    check_escapes(raw)?;
    percent_decode(raw)
        .decode_utf8()
        .map(|text| text.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

fn check_escapes(raw: &[u8]) -> Result<(), DecodeError> {
    let mut start = 0;
    while let Some(pos) = raw[start..].iter().position(|&b| b == b'%') {
        let offset = start + pos;
        match raw.get(offset + 1..offset + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                start = offset + 3;
            }
            _ => return Err(DecodeError::MalformedEscape { offset }),
        }
    }
    Ok(())
}
