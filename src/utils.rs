//! Utility functions for chain tables, parsing and exact-number conversions.
//!
//! This module bridges the human-facing representations (chain names, hex
//! addresses, decimal strings) and the exact types the router computes with
//! (`Address`, `BigUint`, `BigRational`).

use crate::errors::{Result, UtilityError};
use alloy::primitives::Address;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::str::FromStr;

/// Get the numeric chain ID for a given blockchain name.
///
/// # Errors
///
/// Returns an error if the chain name is not recognized or supported
pub fn chain_id(chain: &str) -> Result<u64> {
    match chain {
        "ethereum" => Ok(1),
        "bsc" => Ok(56),
        "unichain" => Ok(130),
        "base" => Ok(8453),
        "arbitrum" => Ok(42161),
        _ => Err(UtilityError::UnsupportedChain {
            chain: chain.to_string(),
        }.into()),
    }
}

/// Get the chain name for a given chain ID.
///
/// This is the reverse operation of `chain_id()`.
pub fn chain_name(chain_id: u64) -> Result<&'static str> {
    match chain_id {
        1 => Ok("ethereum"),
        56 => Ok("bsc"),
        130 => Ok("unichain"),
        8453 => Ok("base"),
        42161 => Ok("arbitrum"),
        _ => Err(UtilityError::UnsupportedChain {
            chain: chain_id.to_string(),
        }.into()),
    }
}

/// Get the wrapped native token address for a chain.
///
/// Gas is paid in the native currency, so the router values gas through the
/// vertex of this token.
///
/// # Errors
///
/// Returns an error if the chain ID is not supported
pub fn wrapped_native_address(chain_id: u64) -> Result<Address> {
    let address_str = match chain_id {
        1 => "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        56 => "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
        130 | 8453 => "0x4200000000000000000000000000000000000006",
        42161 => "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
        _ => return Err(UtilityError::UnsupportedChain {
            chain: chain_id.to_string(),
        }.into()),
    };

    parse_address(address_str)
}

/// Parse a string representation of an Ethereum address.
///
/// Accepts addresses with or without the "0x" prefix.
///
/// # Errors
///
/// Returns an error if the string is not 40 valid hex characters
pub fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s.trim_start_matches("0x"))
        .map_err(|source| UtilityError::AddressParsingFailed {
            input: s.to_string(),
            source,
        }.into())
}

/// Parse a raw integer amount from a decimal string.
pub fn parse_amount(s: &str) -> Result<BigUint> {
    BigUint::from_str(s.trim()).map_err(|_| UtilityError::AmountParsingFailed {
        input: s.to_string(),
    }.into())
}

/// Parse a human-readable amount ("1.5") into raw units with `decimals` precision.
///
/// Fractional digits beyond `decimals` are rejected rather than rounded.
pub fn parse_units(s: &str, decimals: u8) -> Result<BigUint> {
    let trimmed = s.trim();
    let invalid = || UtilityError::AmountParsingFailed { input: s.to_string() };

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if fraction.len() > decimals as usize {
        return Err(invalid().into());
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid().into());
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::from_str(digits).map_err(|_| invalid().into())
}

/// Format raw units as a decimal string with `decimals` precision.
///
/// Trailing zeros of the fractional part are dropped.
pub fn format_units(amount: &BigUint, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Lift a raw amount into an exact fraction.
pub fn to_rational(amount: &BigUint) -> BigRational {
    BigRational::from_integer(BigInt::from(amount.clone()))
}

/// Floor an exact fraction to a raw amount, clamping negatives to zero.
pub fn floor_to_biguint(value: &BigRational) -> BigUint {
    if value.is_negative() {
        return BigUint::zero();
    }
    value.floor().to_integer().to_biguint().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_tables_round_trip() {
        for chain in ["ethereum", "bsc", "unichain", "base", "arbitrum"] {
            let id = chain_id(chain).unwrap();
            assert_eq!(chain_name(id).unwrap(), chain);
            assert!(wrapped_native_address(id).is_ok());
        }
        assert!(chain_id("solana").is_err());
        assert!(wrapped_native_address(10).is_err());
    }

    #[test]
    fn test_parse_address_with_and_without_prefix() {
        let with_prefix = parse_address("0x4200000000000000000000000000000000000006").unwrap();
        let without_prefix = parse_address("4200000000000000000000000000000000000006").unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1.5", 6).unwrap(), BigUint::from(1_500_000u32));
        assert_eq!(parse_units("42", 0).unwrap(), BigUint::from(42u32));
        assert_eq!(parse_units(".25", 2).unwrap(), BigUint::from(25u32));
        assert_eq!(parse_units("0.000", 3).unwrap(), BigUint::zero());
        assert!(parse_units("1.234", 2).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units(".", 18).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(&BigUint::from(1_500_000u32), 6), "1.5");
        assert_eq!(format_units(&BigUint::from(5u32), 3), "0.005");
        assert_eq!(format_units(&BigUint::from(7000u32), 3), "7");
        assert_eq!(format_units(&BigUint::from(12u32), 0), "12");
    }

    #[test]
    fn test_floor_to_biguint_clamps_negative() {
        let negative = BigRational::new(BigInt::from(-7), BigInt::from(2));
        assert_eq!(floor_to_biguint(&negative), BigUint::zero());

        let positive = BigRational::new(BigInt::from(7), BigInt::from(2));
        assert_eq!(floor_to_biguint(&positive), BigUint::from(3u32));
    }
}
