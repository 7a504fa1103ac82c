//! Pool quoting errors.
//!
//! Every variant means "this pool cannot serve this amount right now". The
//! route search treats them as a dead edge and carries on.

use alloy::primitives::Address;

/// Errors returned by a pool when it rejects a quote request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("Insufficient liquidity in pool {pool}")]
    InsufficientLiquidity { pool: Address },

    #[error("Amount moves pool {pool} outside of its active range")]
    OutOfRange { pool: Address },

    #[error("Token {token} is not traded by pool {pool}")]
    UnknownToken { pool: Address, token: Address },

    #[error("Zero amount requested from pool {pool}")]
    ZeroAmount { pool: Address },

    #[error("Pool {pool} is in an invalid state: {reason}")]
    InvalidState { pool: Address, reason: String },
}
