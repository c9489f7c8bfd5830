//! Token amount parsing and formatting.
//!
//! The payment token uses 18 decimals. Amounts are carried as `U256` in the
//! smallest unit everywhere; decimal strings only appear at the input and
//! display boundary. String-in, string-out preserves full precision beyond
//! any native float range.

use alloy::primitives::U256;
use alloy::primitives::utils::{format_units, parse_units};

use super::error::ClientError;

/// Decimals of the payment token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Parse a decimal string (e.g. "10" or "1.5") into smallest-unit `U256`.
///
/// Rejects empty input, negative values, and anything that does not parse as
/// a decimal number with at most 18 fractional digits.
pub fn parse_token_amount(field: &'static str, input: &str) -> Result<U256, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(field, "amount is required"));
    }
    if trimmed.starts_with('-') {
        return Err(ClientError::validation(field, "amount cannot be negative"));
    }

    let parsed = parse_units(trimmed, TOKEN_DECIMALS)
        .map_err(|e| ClientError::validation(field, format!("not a valid amount: {e}")))?;

    Ok(parsed.get_absolute())
}

/// Format a smallest-unit `U256` as a decimal token string.
///
/// Trailing fractional zeros are trimmed ("10.000...0" renders as "10").
pub fn format_token_amount(amount: U256) -> String {
    let rendered = match format_units(amount, TOKEN_DECIMALS) {
        Ok(s) => s,
        // format_units only fails on out-of-range decimals; 18 is in range.
        Err(_) => return amount.to_string(),
    };

    match rendered.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => rendered,
    }
}

/// One whole token in smallest units (10^18).
pub fn one_token() -> U256 {
    U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Parse a decimal token-id string into `U256`.
///
/// Token ids are integral; fractions and signs are rejected.
pub fn parse_token_id(field: &'static str, input: &str) -> Result<U256, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(field, "token id is required"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClientError::validation(
            field,
            "token id must be a non-negative integer",
        ));
    }

    trimmed
        .parse::<U256>()
        .map_err(|e| ClientError::validation(field, format!("not a valid token id: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_amount() {
        let amount = parse_token_amount("amount", "10").unwrap();
        assert_eq!(amount, U256::from(10u64) * one_token());
    }

    #[test]
    fn test_parse_fractional_amount() {
        let amount = parse_token_amount("amount", "1.5").unwrap();
        assert_eq!(amount, U256::from(15u64) * one_token() / U256::from(10u64));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            parse_token_amount("amount", "   "),
            Err(ClientError::Validation { field: "amount", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(parse_token_amount("amount", "-3").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_token_amount("amount", "ten").is_err());
        assert!(parse_token_amount("amount", "1.2.3").is_err());
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        assert_eq!(format_token_amount(U256::from(10u64) * one_token()), "10");
        assert_eq!(
            format_token_amount(U256::from(15u64) * one_token() / U256::from(10u64)),
            "1.5"
        );
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_token_amount(U256::ZERO), "0");
    }

    #[test]
    fn test_parse_token_id() {
        assert_eq!(
            parse_token_id("token_id", "42").unwrap(),
            U256::from(42u64)
        );
        assert!(parse_token_id("token_id", "").is_err());
        assert!(parse_token_id("token_id", "1.5").is_err());
        assert!(parse_token_id("token_id", "-1").is_err());
    }

    #[test]
    fn test_round_trip_preserves_value() {
        for input in ["1", "0.000000000000000001", "123456789.987654321"] {
            let parsed = parse_token_amount("amount", input).unwrap();
            let reparsed = parse_token_amount("amount", &format_token_amount(parsed)).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }
}
