//! Concentrated-liquidity pools reduced to their active range.
//!
//! Within one range a concentrated pool behaves like a constant-product pool
//! over *virtual* reserves: the real token balances plus the amounts implied by
//! the range bounds. Prices follow the virtual reserves, while only the real
//! reserves can actually leave the pool. A trade that would pay out more than
//! the real reserve of the output token crosses the range boundary and is
//! rejected with [`QuoteError::OutOfRange`].

use super::{trade_indices, FEE_DENOMINATOR};
use crate::currency::Currency;
use crate::errors::QuoteError;
use crate::utils::to_rational;
use alloy::primitives::Address;
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Zero};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcentratedPool {
    address: Address,
    tokens: [Currency; 2],
    real_reserves: [BigUint; 2],
    virtual_reserves: [BigUint; 2],
    fee_bps: u32,
}

impl ConcentratedPool {
    /// Create a pool from its real balances and the virtual reserves of its
    /// active range. Virtual reserves are never below the real ones.
    pub fn new(
        address: Address,
        token0: Currency,
        token1: Currency,
        real_reserves: [BigUint; 2],
        virtual_reserves: [BigUint; 2],
        fee_bps: u32,
    ) -> Self {
        Self {
            address,
            tokens: [token0, token1],
            real_reserves,
            virtual_reserves,
            fee_bps,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tokens(&self) -> &[Currency] {
        &self.tokens
    }

    pub fn real_reserves(&self) -> &[BigUint; 2] {
        &self.real_reserves
    }

    pub fn virtual_reserves(&self) -> &[BigUint; 2] {
        &self.virtual_reserves
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn validate(&self, i: usize, j: usize) -> Result<u32, QuoteError> {
        let invalid = |reason: String| QuoteError::InvalidState {
            pool: self.address,
            reason,
        };
        if self
            .virtual_reserves
            .iter()
            .zip(&self.real_reserves)
            .any(|(virtual_reserve, real)| virtual_reserve < real)
        {
            return Err(invalid("virtual reserves below real reserves".to_string()));
        }
        if self.virtual_reserves[i].is_zero() || self.virtual_reserves[j].is_zero() {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }
        FEE_DENOMINATOR
            .checked_sub(self.fee_bps)
            .filter(|multiplier| *multiplier > 0)
            .ok_or_else(|| invalid(format!("fee of {} bps leaves nothing to trade", self.fee_bps)))
    }

    fn settle(&self, i: usize, j: usize, amount_in: &BigUint, amount_out: &BigUint) -> Self {
        let mut after = self.clone();
        after.virtual_reserves[i] += amount_in;
        after.virtual_reserves[j] -= amount_out;
        after.real_reserves[i] += amount_in;
        after.real_reserves[j] -= amount_out;
        after
    }

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
        let multiplier = self.validate(i, j)?;

        let amount_in_with_fee = amount_in * multiplier;
        let numerator = &amount_in_with_fee * &self.virtual_reserves[j];
        let denominator = &self.virtual_reserves[i] * FEE_DENOMINATOR + &amount_in_with_fee;
        let amount_out = numerator / denominator;

        if amount_out.is_zero() {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }
        if amount_out > self.real_reserves[j] {
            return Err(QuoteError::OutOfRange { pool: self.address });
        }

        let after = self.settle(i, j, amount_in, &amount_out);
        Ok((amount_out, after))
    }

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
        let multiplier = self.validate(i, j)?;
        if amount_out > &self.real_reserves[j] {
            return Err(QuoteError::OutOfRange { pool: self.address });
        }
        if amount_out >= &self.virtual_reserves[j] {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }

        let numerator = &self.virtual_reserves[i] * amount_out * FEE_DENOMINATOR;
        let denominator = (&self.virtual_reserves[j] - amount_out) * multiplier;
        let amount_in = numerator / denominator + BigUint::one();

        let after = self.settle(i, j, &amount_in, amount_out);
        Ok((amount_in, after))
    }

    /// Virtual reserve ratio, i.e. the current in-range price.
    pub fn mid_price(&self, base: &Currency, quote: &Currency) -> Option<BigRational> {
        let (i, j) = trade_indices(self.address, &self.tokens, base, quote).ok()?;
        if self.virtual_reserves[i].is_zero() || self.virtual_reserves[j].is_zero() {
            return None;
        }
        Some(to_rational(&self.virtual_reserves[j]) / to_rational(&self.virtual_reserves[i]))
    }
}
