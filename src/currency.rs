//! Currencies and currency-tagged amounts.
//!
//! A currency is identified on the routing graph by its canonical address:
//! the token address for ERC-20 style tokens, or the wrapped token address for
//! a chain's native currency. ETH and WETH therefore share one vertex.

use alloy::primitives::Address;
use num_bigint::BigUint;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A tradable asset.
#[derive(Debug, Clone)]
pub struct Currency {
    chain_id: u64,
    address: Address,
    decimals: u8,
    symbol: String,
    /// Set for native currencies: the address of the wrapped token
    wrapped: Option<Address>,
}

impl Currency {
    /// Create an ERC-20 style token.
    pub fn token(chain_id: u64, address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            wrapped: None,
        }
    }

    /// Create a chain's native currency, routed through its wrapped token.
    pub fn native(chain_id: u64, wrapped: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address: Address::ZERO,
            decimals,
            symbol: symbol.into(),
            wrapped: Some(wrapped),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The currency's own address (zero for native currencies)
    pub fn address(&self) -> Address {
        self.address
    }

    /// The address this currency is identified by on the routing graph
    pub fn canonical_address(&self) -> Address {
        self.wrapped.unwrap_or(self.address)
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_native(&self) -> bool {
        self.wrapped.is_some()
    }

    /// Whether `self` sorts before `other` by canonical address.
    pub fn sorts_before(&self, other: &Currency) -> bool {
        self.canonical_address() < other.canonical_address()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.canonical_address() == other.canonical_address()
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.canonical_address().hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// A raw amount of a specific currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub amount: BigUint,
}

impl CurrencyAmount {
    pub fn new(currency: Currency, amount: impl Into<BigUint>) -> Self {
        Self {
            currency,
            amount: amount.into(),
        }
    }

    /// Render the amount in whole units of its currency.
    pub fn to_exact(&self) -> String {
        crate::utils::format_units(&self.amount, self.currency.decimals())
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.currency.symbol())
    }
}
