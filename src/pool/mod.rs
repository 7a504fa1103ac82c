//! Liquidity pools as a closed set of pricing models.
//!
//! Pools are dispatched through the [`Pool`] enum rather than trait objects:
//! the set of pricing families the router understands is fixed, and every
//! variant provides the same two capabilities:
//!
//! - **Quote**: exact-input (`amount_in → amount_out`) or exact-output
//!   (`amount_out → amount_in`) for a pair of its tokens
//! - **Post-trade state**: the pool value after the quoted trade settled
//!
//! Quoting never mutates a pool. The routing graph replaces the pool held by
//! an edge with the returned post-trade value when a route is applied.
//!
//! # Variants
//!
//! - [`ConstantProductPool`]: `x · y = k` with an input fee
//! - [`ConcentratedPool`]: one active liquidity range, priced on virtual
//!   reserves and bounded by real reserves
//! - [`StablePool`]: n-coin stable-swap invariant with amplification

pub mod concentrated;
pub mod constant_product;
pub mod stable;

pub use concentrated::ConcentratedPool;
pub use constant_product::ConstantProductPool;
pub use stable::StablePool;

use crate::currency::Currency;
use crate::errors::QuoteError;
use crate::QuoteResult;
use crate::trade::TradeType;
use alloy::primitives::Address;
use itertools::Itertools;
use num_bigint::BigUint;
use num_rational::BigRational;
use std::fmt;

/// Basis point denominator used by every fee computation
pub(crate) const FEE_DENOMINATOR: u32 = 10_000;

/// The pricing family of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolType {
    ConstantProduct,
    Concentrated,
    Stable,
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolType::ConstantProduct => "constant-product",
            PoolType::Concentrated => "concentrated",
            PoolType::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// Canonical identity of a pool serving one token pair.
///
/// Token addresses are sorted so the key does not depend on trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub pool: Address,
}

impl PoolKey {
    pub fn new(token_a: Address, token_b: Address, pool: Address) -> Self {
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Self { token0, token1, pool }
    }
}

/// Result of quoting a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolQuote {
    /// Output amount for exact-input quotes, required input for exact-output quotes
    pub amount: BigUint,
    /// The pool as it would be once the quoted trade has settled
    pub pool_after: Pool,
}

/// A liquidity pool of one of the supported pricing families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pool {
    ConstantProduct(ConstantProductPool),
    Concentrated(ConcentratedPool),
    Stable(StablePool),
}

impl Pool {
    /// The on-chain address of this pool
    pub fn address(&self) -> Address {
        match self {
            Pool::ConstantProduct(pool) => pool.address(),
            Pool::Concentrated(pool) => pool.address(),
            Pool::Stable(pool) => pool.address(),
        }
    }

    pub fn pool_type(&self) -> PoolType {
        match self {
            Pool::ConstantProduct(_) => PoolType::ConstantProduct,
            Pool::Concentrated(_) => PoolType::Concentrated,
            Pool::Stable(_) => PoolType::Stable,
        }
    }

    /// All currencies this pool trades
    pub fn tokens(&self) -> &[Currency] {
        match self {
            Pool::ConstantProduct(pool) => pool.tokens(),
            Pool::Concentrated(pool) => pool.tokens(),
            Pool::Stable(pool) => pool.tokens(),
        }
    }

    /// Whether the pool trades `currency`
    pub fn involves(&self, currency: &Currency) -> bool {
        self.tokens().iter().any(|token| token == currency)
    }

    /// Every tradable pair of this pool.
    ///
    /// Two-asset pools yield one pair; an n-asset pool yields every
    /// combination of its tokens.
    pub fn currency_pairs(&self) -> Vec<(Currency, Currency)> {
        self.tokens()
            .iter()
            .cloned()
            .tuple_combinations()
            .collect()
    }

    /// Identity of this pool as the edge between `token_a` and `token_b`
    pub fn key(&self, token_a: &Currency, token_b: &Currency) -> PoolKey {
        PoolKey::new(token_a.canonical_address(), token_b.canonical_address(), self.address())
    }

    /// Quote a trade of `token_in` for `token_out`.
    ///
    /// For [`TradeType::ExactInput`] `amount` is the input and the quote is
    /// the output; for [`TradeType::ExactOutput`] `amount` is the desired
    /// output and the quote is the input required.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] when the pool cannot serve the amount: zero
    /// amounts, unknown tokens, insufficient depth or leaving the active range.
    pub fn quote(
        &self,
        token_in: &Currency,
        token_out: &Currency,
        amount: &BigUint,
        trade_type: TradeType,
    ) -> QuoteResult<PoolQuote> {
        match trade_type {
            TradeType::ExactInput => self.quote_exact_in(token_in, token_out, amount),
            TradeType::ExactOutput => self.quote_exact_out(token_in, token_out, amount),
        }
    }

    fn quote_exact_in(
        &self,
        token_in: &Currency,
        token_out: &Currency,
        amount_in: &BigUint,
    ) -> QuoteResult<PoolQuote> {
        let (amount, pool_after) = match self {
            Pool::ConstantProduct(pool) => {
                let (out, after) = pool.swap_exact_in(token_in, token_out, amount_in)?;
                (out, Pool::ConstantProduct(after))
            }
            Pool::Concentrated(pool) => {
                let (out, after) = pool.swap_exact_in(token_in, token_out, amount_in)?;
                (out, Pool::Concentrated(after))
            }
            Pool::Stable(pool) => {
                let (out, after) = pool.swap_exact_in(token_in, token_out, amount_in)?;
                (out, Pool::Stable(after))
            }
        };
        Ok(PoolQuote { amount, pool_after })
    }

    fn quote_exact_out(
        &self,
        token_in: &Currency,
        token_out: &Currency,
        amount_out: &BigUint,
    ) -> QuoteResult<PoolQuote> {
        let (amount, pool_after) = match self {
            Pool::ConstantProduct(pool) => {
                let (needed, after) = pool.swap_exact_out(token_in, token_out, amount_out)?;
                (needed, Pool::ConstantProduct(after))
            }
            Pool::Concentrated(pool) => {
                let (needed, after) = pool.swap_exact_out(token_in, token_out, amount_out)?;
                (needed, Pool::Concentrated(after))
            }
            Pool::Stable(pool) => {
                let (needed, after) = pool.swap_exact_out(token_in, token_out, amount_out)?;
                (needed, Pool::Stable(after))
            }
        };
        Ok(PoolQuote { amount, pool_after })
    }

    /// Fee-free marginal price: raw units of `quote` per raw unit of `base`.
    ///
    /// Returns `None` if either token is not traded here or the pool holds no
    /// liquidity on one side.
    pub fn mid_price(&self, base: &Currency, quote: &Currency) -> Option<BigRational> {
        match self {
            Pool::ConstantProduct(pool) => pool.mid_price(base, quote),
            Pool::Concentrated(pool) => pool.mid_price(base, quote),
            Pool::Stable(pool) => pool.mid_price(base, quote),
        }
    }
}

impl From<ConstantProductPool> for Pool {
    fn from(pool: ConstantProductPool) -> Self {
        Pool::ConstantProduct(pool)
    }
}

impl From<ConcentratedPool> for Pool {
    fn from(pool: ConcentratedPool) -> Self {
        Pool::Concentrated(pool)
    }
}

impl From<StablePool> for Pool {
    fn from(pool: StablePool) -> Self {
        Pool::Stable(pool)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.tokens().iter().map(|token| token.symbol()).join("/");
        write!(f, "{}({})@{}", self.pool_type(), symbols, self.address())
    }
}

/// Position of `token` among `tokens`, or an `UnknownToken` error.
pub(crate) fn token_index(
    pool: Address,
    tokens: &[Currency],
    token: &Currency,
) -> QuoteResult<usize> {
    tokens
        .iter()
        .position(|candidate| candidate == token)
        .ok_or(QuoteError::UnknownToken {
            pool,
            token: token.canonical_address(),
        })
}

/// Resolve the (in, out) indices of a trade, rejecting same-token swaps.
pub(crate) fn trade_indices(
    pool: Address,
    tokens: &[Currency],
    token_in: &Currency,
    token_out: &Currency,
) -> QuoteResult<(usize, usize)> {
    let i = token_index(pool, tokens, token_in)?;
    let j = token_index(pool, tokens, token_out)?;
    if i == j {
        return Err(QuoteError::InvalidState {
            pool,
            reason: format!("cannot swap {} for itself", token_in.symbol()),
        });
    }
    Ok((i, j))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn currency(byte: u8, symbol: &str) -> Currency {
        Currency::token(1, Address::repeat_byte(byte), 18, symbol)
    }

    pub fn constant_product(
        address_byte: u8,
        token0: &Currency,
        token1: &Currency,
        reserve0: u64,
        reserve1: u64,
    ) -> Pool {
        ConstantProductPool::new(
            Address::repeat_byte(address_byte),
            token0.clone(),
            token1.clone(),
            BigUint::from(reserve0),
            BigUint::from(reserve1),
            30,
        )
        .into()
    }
}
