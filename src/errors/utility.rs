//! Utility function errors

use thiserror::Error;

/// Errors that can occur in utility functions
#[derive(Debug, Error)]
pub enum UtilityError {
    #[error("Failed to parse address from string '{input}': {source}")]
    AddressParsingFailed {
        input: String,
        #[source]
        source: alloy::hex::FromHexError,
    },

    #[error("Failed to parse amount from string '{input}'")]
    AmountParsingFailed { input: String },

    #[error("Unsupported chain: {chain}")]
    UnsupportedChain { chain: String },

    #[error("Unknown currency '{reference}'")]
    UnknownCurrency { reference: String },

    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },
}
