//! Stable-swap pools.
//!
//! Balances are normalised to 18 decimals before entering the invariant
//!
//! ```text
//! A·nⁿ·Σxᵢ + D = A·D·nⁿ + Dⁿ⁺¹ / (nⁿ·Πxᵢ)
//! ```
//!
//! which is solved for `D` and for a single balance `y` by Newton iteration
//! in signed big integers. The fee is charged on the output side.

use super::{trade_indices, FEE_DENOMINATOR};
use crate::currency::Currency;
use crate::errors::QuoteError;
use alloy::primitives::Address;
use num_bigint::{BigInt, BigUint, Sign};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Upper bound on Newton iterations before the pool is declared invalid
const MAX_ITERATIONS: usize = 255;

/// Precision every balance is normalised to
const NORMALISED_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StablePool {
    address: Address,
    tokens: Vec<Currency>,
    balances: Vec<BigUint>,
    amplification: u64,
    fee_bps: u32,
}

impl StablePool {
    pub fn new(
        address: Address,
        tokens: Vec<Currency>,
        balances: Vec<BigUint>,
        amplification: u64,
        fee_bps: u32,
    ) -> Self {
        Self {
            address,
            tokens,
            balances,
            amplification,
            fee_bps,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tokens(&self) -> &[Currency] {
        &self.tokens
    }

    pub fn balances(&self) -> &[BigUint] {
        &self.balances
    }

    pub fn amplification(&self) -> u64 {
        self.amplification
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn invalid(&self, reason: impl Into<String>) -> QuoteError {
        QuoteError::InvalidState {
            pool: self.address,
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), QuoteError> {
        if self.tokens.len() < 2 || self.tokens.len() != self.balances.len() {
            return Err(self.invalid(format!(
                "{} tokens with {} balances",
                self.tokens.len(),
                self.balances.len()
            )));
        }
        if self.amplification == 0 {
            return Err(self.invalid("zero amplification"));
        }
        if self.fee_bps >= FEE_DENOMINATOR {
            return Err(self.invalid(format!("fee of {} bps", self.fee_bps)));
        }
        if self.balances.iter().any(Zero::is_zero) {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }
        Ok(())
    }

    /// Multiplier bringing one raw unit of token `index` to 18 decimals.
    fn rate(&self, index: usize) -> Result<BigInt, QuoteError> {
        let decimals = self.tokens[index].decimals();
        let shift = NORMALISED_DECIMALS.checked_sub(decimals).ok_or_else(|| {
            self.invalid(format!(
                "{} has {} decimals, more than {}",
                self.tokens[index].symbol(),
                decimals,
                NORMALISED_DECIMALS
            ))
        })?;
        Ok(BigInt::from(10u32).pow(u32::from(shift)))
    }

    fn normalised_balances(&self) -> Result<Vec<BigInt>, QuoteError> {
        self.balances
            .iter()
            .enumerate()
            .map(|(index, balance)| Ok(BigInt::from(balance.clone()) * self.rate(index)?))
            .collect()
    }

    /// Solve the invariant for `D` given normalised balances.
    fn compute_d(&self, xp: &[BigInt]) -> Result<BigInt, QuoteError> {
        let n = BigInt::from(xp.len());
        let sum: BigInt = xp.iter().sum();
        if sum.is_zero() {
            return Ok(BigInt::zero());
        }

        let ann = BigInt::from(self.amplification) * &n;
        let mut d = sum.clone();
        for _ in 0..MAX_ITERATIONS {
            let mut d_product = d.clone();
            for x in xp {
                d_product = d_product * &d / (x * &n);
            }
            let previous = d.clone();
            let numerator = (&ann * &sum + &d_product * &n) * &d;
            let denominator = (&ann - BigInt::one()) * &d + (&n + BigInt::one()) * &d_product;
            d = numerator / denominator;
            if (&d - &previous).abs() <= BigInt::one() {
                return Ok(d);
            }
        }
        Err(self.invalid("invariant did not converge"))
    }

    /// Solve for the balance of coin `j` once coin `i` holds `x`.
    fn compute_y(&self, i: usize, j: usize, x: &BigInt, xp: &[BigInt]) -> Result<BigInt, QuoteError> {
        let n = BigInt::from(xp.len());
        let d = self.compute_d(xp)?;
        let ann = BigInt::from(self.amplification) * &n;

        let mut c = d.clone();
        let mut sum = BigInt::zero();
        for (k, balance) in xp.iter().enumerate() {
            let value = if k == i {
                x
            } else if k != j {
                balance
            } else {
                continue;
            };
            if !value.is_positive() {
                return Err(QuoteError::InsufficientLiquidity { pool: self.address });
            }
            sum += value;
            c = c * &d / (value * &n);
        }
        c = c * &d / (&ann * &n);
        let b = sum + &d / &ann;

        let mut y = d.clone();
        for _ in 0..MAX_ITERATIONS {
            let previous = y.clone();
            let denominator = BigInt::from(2) * &y + &b - &d;
            if !denominator.is_positive() {
                return Err(self.invalid("degenerate balance solution"));
            }
            y = (&y * &y + &c) / denominator;
            if (&y - &previous).abs() <= BigInt::one() {
                return Ok(y);
            }
        }
        Err(self.invalid("balance did not converge"))
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
        self.validate()?;

        let xp = self.normalised_balances()?;
        let x = &xp[i] + BigInt::from(amount_in.clone()) * self.rate(i)?;
        let y = self.compute_y(i, j, &x, &xp)?;
        let dy = &xp[j] - y - BigInt::one();
        let fee = &dy * self.fee_bps / FEE_DENOMINATOR;
        let amount_out = ((dy - fee) / self.rate(j)?)
            .to_biguint()
            .filter(|amount| !amount.is_zero() && amount < &self.balances[j])
            .ok_or(QuoteError::InsufficientLiquidity { pool: self.address })?;

        let mut after = self.clone();
        after.balances[i] += amount_in;
        after.balances[j] -= &amount_out;
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
        self.validate()?;
        if amount_out >= &self.balances[j] {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }

        let xp = self.normalised_balances()?;
        let dy = BigInt::from(amount_out.clone()) * self.rate(j)?;
        let dy_with_fee = dy * FEE_DENOMINATOR / (FEE_DENOMINATOR - self.fee_bps) + BigInt::one();
        if dy_with_fee >= xp[j] {
            return Err(QuoteError::InsufficientLiquidity { pool: self.address });
        }

        let y = &xp[j] - dy_with_fee;
        let x = self.compute_y(j, i, &y, &xp)?;
        let dx = x - &xp[i] + BigInt::one();
        let rate_in = self.rate(i)?;
        let amount_in = ceil_div(&dx, &rate_in)
            .to_biguint()
            .filter(|amount| !amount.is_zero())
            .ok_or(QuoteError::InsufficientLiquidity { pool: self.address })?;

        let mut after = self.clone();
        after.balances[i] += &amount_in;
        after.balances[j] -= amount_out;
        Ok((amount_in, after))
    }

    /// Peg price between two coins: the ratio of their decimal scales.
    pub fn mid_price(&self, base: &Currency, quote: &Currency) -> Option<BigRational> {
        let (i, j) = trade_indices(self.address, &self.tokens, base, quote).ok()?;
        if self.balances[i].is_zero() || self.balances[j].is_zero() {
            return None;
        }
        let scale = |decimals: u8| BigInt::from(10u32).pow(u32::from(decimals));
        Some(BigRational::new(
            scale(self.tokens[j].decimals()),
            scale(self.tokens[i].decimals()),
        ))
    }
}

fn ceil_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    if numerator.sign() == Sign::Minus {
        return numerator / denominator;
    }
    (numerator + denominator - BigInt::one()) / denominator
}
