//! Script number encoding.
//!
//! Numbers on the stack are little-endian byte arrays with a sign bit in the
//! most significant bit of the last byte. Operands are limited in length,
//! results are not, so arithmetic runs on `BigInt`.

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use super::error::{InterpreterError, InterpreterErrorCode};

/// A decoded script number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNumber(pub BigInt);

impl ScriptNumber {
    /// Wrap an integer.
    pub fn new(val: i64) -> Self {
        ScriptNumber(BigInt::from(val))
    }

    /// Decode `bytes`, rejecting operands longer than `max_len` and, when
    /// `require_minimal` is set, non-minimal encodings.
    pub fn from_bytes(
        bytes: &[u8],
        max_len: usize,
        require_minimal: bool,
    ) -> Result<Self, InterpreterError> {
        if bytes.len() > max_len {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!(
                    "numeric value is {} bytes which exceeds the max allowed of {}",
                    bytes.len(),
                    max_len
                ),
            ));
        }
        if require_minimal && !is_minimally_encoded(bytes) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::MinimalData,
                format!("numeric value {} is not minimally encoded", hex::encode(bytes)),
            ));
        }
        let Some((&last, _)) = bytes.split_last() else {
            return Ok(ScriptNumber(BigInt::zero()));
        };

        let mut magnitude = bytes.to_vec();
        let negative = last & 0x80 != 0;
        if let Some(top) = magnitude.last_mut() {
            *top &= 0x7f;
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(ScriptNumber(BigInt::from_bytes_le(sign, &magnitude)))
    }

    /// Minimal little-endian sign-magnitude encoding. Zero is empty.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        let (_, mut out) = self.0.abs().to_bytes_le();
        let negative = self.0.is_negative();
        let sign = if negative { 0x80 } else { 0x00 };
        set_sign(&mut out, sign);
        out
    }

    /// Value clamped to the `i32` range, as used for counts and indices.
    pub fn to_i32(&self) -> i32 {
        self.0
            .to_i32()
            .unwrap_or(if self.0.is_negative() { i32::MIN } else { i32::MAX })
    }

    /// Value clamped to the `i64` range.
    pub fn to_i64(&self) -> i64 {
        self.0
            .to_i64()
            .unwrap_or(if self.0.is_negative() { i64::MIN } else { i64::MAX })
    }

    /// `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// `true` if `bytes` has no superfluous trailing zero (or sign-only) byte.
pub fn is_minimally_encoded(bytes: &[u8]) -> bool {
    match bytes {
        [] => true,
        [.., last] if last & 0x7f != 0 => true,
        [_] => false,
        [.., prev, _] => prev & 0x80 != 0,
    }
}

/// Re-encode `bytes` as the shortest equivalent script number.
pub fn minimally_encode(bytes: &[u8]) -> Vec<u8> {
    let Some((&last, rest)) = bytes.split_last() else {
        return Vec::new();
    };
    let sign = last & 0x80;
    let mut out = rest.to_vec();
    out.push(last & 0x7f);
    while let Some(&0) = out.last() {
        out.pop();
    }
    set_sign(&mut out, sign);
    out
}

fn set_sign(magnitude: &mut Vec<u8>, sign: u8) {
    match magnitude.last().map(|top| top & 0x80 != 0) {
        None => {}
        Some(true) => magnitude.push(sign),
        Some(false) => {
            if let Some(top) = magnitude.last_mut() {
                *top |= sign;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_vectors() {
        let cases: &[(i64, &[u8])] = &[
            (0, &[]),
            (1, &[0x01]),
            (-1, &[0x81]),
            (127, &[0x7f]),
            (128, &[0x80, 0x00]),
            (-128, &[0x80, 0x80]),
            (255, &[0xff, 0x00]),
            (256, &[0x00, 0x01]),
            (-256, &[0x00, 0x81]),
            (389, &[0x85, 0x01]),
        ];
        for (value, bytes) in cases {
            let n = ScriptNumber::new(*value);
            assert_eq!(n.to_bytes(), bytes.to_vec(), "encode {}", value);
            let back = ScriptNumber::from_bytes(bytes, 4, true).unwrap();
            assert_eq!(back.to_i64(), *value, "decode {}", value);
        }
    }

    #[test]
    fn test_length_and_minimality() {
        assert!(ScriptNumber::from_bytes(&[1, 0, 0, 0, 0], 4, false).is_err());
        assert!(ScriptNumber::from_bytes(&[0x01, 0x00], 4, true).is_err());
        assert!(ScriptNumber::from_bytes(&[0x80], 4, true).is_err());
        assert_eq!(ScriptNumber::from_bytes(&[0x01, 0x00], 4, false).unwrap().to_i64(), 1);
    }

    #[test]
    fn test_minimally_encode() {
        assert_eq!(minimally_encode(&[]), Vec::<u8>::new());
        assert_eq!(minimally_encode(&[0x00, 0x00]), Vec::<u8>::new());
        assert_eq!(minimally_encode(&[0x80]), Vec::<u8>::new());
        assert_eq!(minimally_encode(&[0x01, 0x00, 0x00]), vec![0x01]);
        assert_eq!(minimally_encode(&[0x01, 0x00, 0x80]), vec![0x81]);
        assert_eq!(minimally_encode(&[0xff, 0x00, 0x80]), vec![0xff, 0x80]);
    }
}
