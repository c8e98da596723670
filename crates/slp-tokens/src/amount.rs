//! Token quantities at the API boundary.
//!
//! Quantities are arbitrary-precision integers in base units (display amount
//! scaled by the token's decimals). On the wire they are 8-byte big-endian
//! integers, so every quantity entering a record goes through
//! [`quantity_to_u64`].

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::TokenError;
use crate::metadata::MAX_DECIMALS;

/// Parse a decimal display amount (e.g. `"12.5"`) into base units.
pub fn to_base_units(display: &str, decimals: u8) -> Result<BigUint, TokenError> {
    check_decimals(decimals)?;
    let display = display.trim();
    let (int_part, frac_part) = match display.split_once('.') {
        Some((i, f)) => (i, f),
        None => (display, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(TokenError::InvalidInput(format!("not a decimal amount: {:?}", display)));
    }
    if frac_part.len() > decimals as usize {
        return Err(TokenError::PrecisionOverflow(format!(
            "{} has more than {} fractional digits",
            display, decimals
        )));
    }

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len()..decimals as usize {
        digits.push('0');
    }
    let units = BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_else(BigUint::zero);
    quantity_to_u64(&units)?;
    Ok(units)
}

/// Narrow a quantity to the 8-byte wire field.
pub fn quantity_to_u64(quantity: &BigUint) -> Result<u64, TokenError> {
    quantity.to_u64().ok_or_else(|| {
        TokenError::PrecisionOverflow(format!("quantity {} does not fit in 8 bytes", quantity))
    })
}

/// Render base units as a display amount with exactly `decimals`
/// fractional digits.
pub fn format_base_units(quantity: u64, decimals: u8) -> String {
    let digits = quantity.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    format!("{}.{}", int_part, frac_part)
}

pub(crate) fn check_decimals(decimals: u8) -> Result<(), TokenError> {
    if decimals > MAX_DECIMALS {
        return Err(TokenError::PrecisionOverflow(format!(
            "decimals {} exceeds the maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_by_decimals() {
        assert_eq!(to_base_units("100", 1).unwrap(), BigUint::from(1000u32));
        assert_eq!(to_base_units("12.5", 2).unwrap(), BigUint::from(1250u32));
        assert_eq!(to_base_units("0.001", 3).unwrap(), BigUint::from(1u32));
        assert_eq!(to_base_units(".5", 1).unwrap(), BigUint::from(5u32));
        assert_eq!(to_base_units("7.", 0).unwrap(), BigUint::from(7u32));
    }

    #[test]
    fn test_rejects_excess_precision() {
        assert!(matches!(
            to_base_units("1.25", 1),
            Err(TokenError::PrecisionOverflow(_))
        ));
        assert!(matches!(
            to_base_units("1", 10),
            Err(TokenError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn test_rejects_overflow_of_wire_field() {
        assert_eq!(
            to_base_units("18446744073709551615", 0).unwrap(),
            BigUint::from(u64::MAX)
        );
        assert!(matches!(
            to_base_units("18446744073709551616", 0),
            Err(TokenError::PrecisionOverflow(_))
        ));
        assert!(matches!(
            to_base_units("1844674407370955161.6", 1),
            Err(TokenError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", ".", "1.2.3", "-1", "1e3", "abc", "1,5"] {
            assert!(
                matches!(to_base_units(bad, 2), Err(TokenError::InvalidInput(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format_base_units(1000, 1), "100.0");
        assert_eq!(format_base_units(5, 3), "0.005");
        assert_eq!(format_base_units(42, 0), "42");
    }
}
