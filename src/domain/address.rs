//! Address input validation.
//!
//! All user-supplied addresses pass through here before any network call:
//! well-formedness first (`0x` + 40 hex chars), then a zero-address check
//! wherever a real participant is required.

use alloy::primitives::Address;

use super::error::ClientError;

/// Parse a user-supplied address string, naming the field on failure.
pub fn parse_address(field: &'static str, input: &str) -> Result<Address, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(field, "address is required"));
    }

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| ClientError::validation(field, "address must start with 0x"))?;

    if hex.len() != 40 {
        return Err(ClientError::validation(
            field,
            format!("address must be 40 hex characters, got {}", hex.len()),
        ));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ClientError::validation(
            field,
            "address contains non-hex characters",
        ));
    }

    trimmed
        .parse::<Address>()
        .map_err(|e| ClientError::validation(field, format!("not a valid address: {e}")))
}

/// Parse an address and reject the all-zero "null" address.
///
/// Used wherever a real sender/recipient is required.
pub fn parse_participant(field: &'static str, input: &str) -> Result<Address, ClientError> {
    let address = parse_address(field, input)?;
    if address == Address::ZERO {
        return Err(ClientError::validation(
            field,
            "the zero address is not allowed here",
        ));
    }
    Ok(address)
}
