//! ABI Call Encoding - Selectors and Parameter Codec
//!
//! Builds calldata for the fixed set of ERC-20/ERC-721 functions the client
//! invokes: 4-byte keccak selector plus ABI-encoded parameters. Return data
//! decoding is concrete per Solidity type; a decode failure means the node
//! returned something that is not the declared type and surfaces as a
//! chain-call error.

use alloy::primitives::{keccak256, Address, Bytes, U256};
use alloy::sol_types::abi::TokenSeq;
use alloy::sol_types::{sol_data, SolType, SolValue};

use crate::domain::error::ClientError;

/// 4-byte function selector for a canonical signature string.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// Calldata for a zero-argument call.
pub fn encode_call(signature: &str) -> Bytes {
    Bytes::from(selector(signature).to_vec())
}

/// Calldata for a call with ABI-encoded parameters.
///
/// `params` is a value or tuple of values matching the signature's argument
/// list, e.g. `("transfer(address,uint256)", (to, amount))`.
pub fn encode_call_with<P: SolValue>(signature: &str, params: P) -> Bytes
where
    for<'a> <<P as SolValue>::SolType as SolType>::Token<'a>: TokenSeq<'a>,
{
    let encoded = params.abi_encode_params();
    let mut data = Vec::with_capacity(4 + encoded.len());
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&encoded);
    Bytes::from(data)
}

fn decode_error(what: &'static str, e: impl std::fmt::Display) -> ClientError {
    ClientError::ChainCall(format!("failed to decode {what} return value: {e}"))
}

/// Decode a single `uint256` return value.
pub fn decode_u256(what: &'static str, data: &[u8]) -> Result<U256, ClientError> {
    U256::abi_decode(data, true).map_err(|e| decode_error(what, e))
}

/// Decode a single `uint8` return value.
pub fn decode_u8(what: &'static str, data: &[u8]) -> Result<u8, ClientError> {
    sol_data::Uint::<8>::abi_decode(data, true).map_err(|e| decode_error(what, e))
}

/// Decode a single `address` return value.
pub fn decode_address(what: &'static str, data: &[u8]) -> Result<Address, ClientError> {
    Address::abi_decode(data, true).map_err(|e| decode_error(what, e))
}

/// Decode a single `bool` return value.
pub fn decode_bool(what: &'static str, data: &[u8]) -> Result<bool, ClientError> {
    bool::abi_decode(data, true).map_err(|e| decode_error(what, e))
}

/// Decode a single `string` return value.
pub fn decode_string(what: &'static str, data: &[u8]) -> Result<String, ClientError> {
    String::abi_decode(data, true).map_err(|e| decode_error(what, e))
}

/// Selector of the standard `Error(string)` revert payload.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Extract the reason from an `Error(string)` revert payload, if present.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    String::abi_decode(&data[4..], true).ok()
}
