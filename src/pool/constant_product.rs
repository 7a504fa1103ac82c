//! Constant-product (`x · y = k`) pools.

use super::{trade_indices, FEE_DENOMINATOR};
use crate::currency::Currency;
use crate::errors::QuoteError;
use crate::utils::to_rational;
use alloy::primitives::Address;
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// A two-asset pool pricing on the product of its reserves.
///
/// The fee is taken from the input amount, in basis points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductPool {
    address: Address,
    tokens: [Currency; 2],
    reserves: [BigUint; 2],
    fee_bps: u32,
}

impl ConstantProductPool {
    pub fn new(
        address: Address,
        token0: Currency,
        token1: Currency,
        reserve0: BigUint,
        reserve1: BigUint,
        fee_bps: u32,
    ) -> Self {
        Self {
            address,
            tokens: [token0, token1],
            reserves: [reserve0, reserve1],
            fee_bps,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tokens(&self) -> &[Currency] {
        &self.tokens
    }

    pub fn reserves(&self) -> &[BigUint; 2] {
        &self.reserves
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Fraction of the input that remains after the fee, in basis points.
    fn fee_multiplier(&self) -> Result<u32, QuoteError> {
        FEE_DENOMINATOR
            .checked_sub(self.fee_bps)
            .filter(|multiplier| *multiplier > 0)
            .ok_or_else(|| QuoteError::InvalidState {
                pool: self.address,
                reason: format!("fee of {} bps leaves nothing to trade", self.fee_bps),
            })
    }

    fn check_liquidity(&self, i: usize, j: usize) -> Result<(), QuoteError> {
        if self.reserves[i].is_zero() || self.reserves[j].is_zero() {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }
        Ok(())
    }

    /// Output for an exact input, and the pool after the swap.
    pub fn swap_exact_in(
        &self,
        token_in: &Currency,
        token_out: &Currency,
        amount_in: &BigUint,
    ) -> Result<(BigUint, Self), QuoteError> {
        let (i, j) = trade_indices(self.address, &self.tokens, token_in, token_out)?;
        if amount_in.is_zero() {
            return Err(QuoteError::ZeroAmount { pool: self.address });
        }
        self.check_liquidity(i, j)?;

        let amount_in_with_fee = amount_in * self.fee_multiplier()?;
        let numerator = &amount_in_with_fee * &self.reserves[j];
        let denominator = &self.reserves[i] * FEE_DENOMINATOR + &amount_in_with_fee;
        let amount_out = numerator / denominator;
        if amount_out.is_zero() {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }

        let mut after = self.clone();
        after.reserves[i] += amount_in;
        after.reserves[j] -= &amount_out;
        Ok((amount_out, after))
    }

    /// Required input for an exact output, and the pool after the swap.
    pub fn swap_exact_out(
        &self,
        token_in: &Currency,
        token_out: &Currency,
        amount_out: &BigUint,
    ) -> Result<(BigUint, Self), QuoteError> {
        let (i, j) = trade_indices(self.address, &self.tokens, token_in, token_out)?;
        if amount_out.is_zero() {
            return Err(QuoteError::ZeroAmount { pool: self.address });
        }
        self.check_liquidity(i, j)?;
        if amount_out >= &self.reserves[j] {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }

        let numerator = &self.reserves[i] * amount_out * FEE_DENOMINATOR;
        let denominator = (&self.reserves[j] - amount_out) * self.fee_multiplier()?;
        let amount_in = numerator / denominator + BigUint::one();

        let mut after = self.clone();
        after.reserves[i] += &amount_in;
        after.reserves[j] -= amount_out;
        Ok((amount_in, after))
    }

    /// Reserve ratio `reserve(quote) / reserve(base)`.
    pub fn mid_price(&self, base: &Currency, quote: &Currency) -> Option<BigRational> {
        let (i, j) = trade_indices(self.address, &self.tokens, base, quote).ok()?;
        if self.reserves[i].is_zero() || self.reserves[j].is_zero() {
            return None;
        }
        Some(to_rational(&self.reserves[j]) / to_rational(&self.reserves[i]))
    }
}
