//! JSON pool snapshots.
//!
//! A snapshot lists the currencies of one chain and the pools trading them.
//! Pools name their tokens by symbol or address, are tagged by `type`, and
//! carry amounts as decimal strings so they survive any JSON parser.
//!
//! ```json
//! {
//!   "chain_id": 1,
//!   "currencies": [
//!     { "symbol": "WETH", "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18 },
//!     { "symbol": "USDC", "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": 6 }
//!   ],
//!   "pools": [
//!     { "type": "constant-product", "address": "0x…", "tokens": ["USDC", "WETH"],
//!       "reserves": ["2000000000000", "1000000000000000000000"], "fee_bps": 30 }
//!   ]
//! }
//! ```

use crate::builders::RoutingGraphBuilder;
use crate::currency::Currency;
use crate::errors::{Result, UtilityError};
use crate::graph::RoutingGraph;
use crate::pool::{ConcentratedPool, ConstantProductPool, Pool, StablePool};
use crate::utils::{parse_address, parse_amount};
use alloy::primitives::Address;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A currency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    pub symbol: String,
    /// Token address, zero for a native currency
    pub address: String,
    pub decimals: u8,
    /// Wrapped token address, set only for a native currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<String>,
}

impl CurrencySnapshot {
    fn to_currency(&self, chain_id: u64) -> Result<Currency> {
        let currency = match &self.wrapped {
            Some(wrapped) => {
                Currency::native(chain_id, parse_address(wrapped)?, self.decimals, &self.symbol)
            }
            None => Currency::token(chain_id, parse_address(&self.address)?, self.decimals, &self.symbol),
        };
        Ok(currency)
    }

    fn matches(&self, reference: &str) -> bool {
        let Ok(address) = parse_address(reference) else {
            return self.symbol.eq_ignore_ascii_case(reference);
        };
        let same = |entry: &str| parse_address(entry).map(|parsed| parsed == address).unwrap_or(false);
        same(&self.address) || self.wrapped.as_deref().is_some_and(same)
    }
}

/// A pool entry, tagged by pool type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PoolSnapshot {
    ConstantProduct {
        address: String,
        tokens: Vec<String>,
        reserves: Vec<String>,
        fee_bps: u32,
    },
    Concentrated {
        address: String,
        tokens: Vec<String>,
        real_reserves: Vec<String>,
        virtual_reserves: Vec<String>,
        fee_bps: u32,
    },
    Stable {
        address: String,
        tokens: Vec<String>,
        balances: Vec<String>,
        amplification: u64,
        fee_bps: u32,
    },
}

impl PoolSnapshot {
    pub fn address(&self) -> &str {
        match self {
            PoolSnapshot::ConstantProduct { address, .. }
            | PoolSnapshot::Concentrated { address, .. }
            | PoolSnapshot::Stable { address, .. } => address,
        }
    }
}

/// Currencies and pools of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub chain_id: u64,
    pub currencies: Vec<CurrencySnapshot>,
    pub pools: Vec<PoolSnapshot>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        tracing::debug!(
            chain_id = snapshot.chain_id,
            currencies = snapshot.currencies.len(),
            pools = snapshot.pools.len(),
            "Snapshot decoded"
        );
        Ok(snapshot)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading pool snapshot");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Resolve a currency by symbol (case-insensitive) or address.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCurrency` if no entry matches
    pub fn currency(&self, reference: &str) -> Result<Currency> {
        self.currencies
            .iter()
            .find(|entry| entry.matches(reference))
            .ok_or_else(|| UtilityError::UnknownCurrency {
                reference: reference.to_string(),
            })?
            .to_currency(self.chain_id)
    }

    pub fn currencies(&self) -> Result<Vec<Currency>> {
        self.currencies
            .iter()
            .map(|entry| entry.to_currency(self.chain_id))
            .collect()
    }

    /// Decode every pool entry.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown token reference, an unparseable amount,
    /// or token and amount lists that do not fit the pool type
    pub fn pools(&self) -> Result<Vec<Pool>> {
        self.pools.iter().map(|entry| self.decode_pool(entry)).collect()
    }

    /// Build a routing graph holding every currency and pool.
    pub fn graph(&self) -> Result<RoutingGraph> {
        RoutingGraphBuilder::new()
            .add_pools(self.pools()?)
            .build()
    }

    fn decode_pool(&self, entry: &PoolSnapshot) -> Result<Pool> {
        let address = &parse_address(entry.address())?;
        let pool: Pool = match entry {
            PoolSnapshot::ConstantProduct {
                tokens,
                reserves,
                fee_bps,
                ..
            } => {
                let [token0, token1] = self.pair(address, tokens)?;
                let [reserve0, reserve1] = pair_amounts(address, "reserves", reserves)?;
                ConstantProductPool::new(*address, token0, token1, reserve0, reserve1, *fee_bps).into()
            }
            PoolSnapshot::Concentrated {
                tokens,
                real_reserves,
                virtual_reserves,
                fee_bps,
                ..
            } => {
                let [token0, token1] = self.pair(address, tokens)?;
                ConcentratedPool::new(
                    *address,
                    token0,
                    token1,
                    pair_amounts(address, "real_reserves", real_reserves)?,
                    pair_amounts(address, "virtual_reserves", virtual_reserves)?,
                    *fee_bps,
                )
                .into()
            }
            PoolSnapshot::Stable {
                tokens,
                balances,
                amplification,
                fee_bps,
                ..
            } => {
                if tokens.len() != balances.len() {
                    return Err(invalid(format!(
                        "pool {} lists {} tokens but {} balances",
                        address,
                        tokens.len(),
                        balances.len()
                    )));
                }
                let tokens = tokens
                    .iter()
                    .map(|token| self.currency(token))
                    .collect::<Result<Vec<_>>>()?;
                let balances = amounts(balances)?;
                StablePool::new(*address, tokens, balances, *amplification, *fee_bps).into()
            }
        };
        Ok(pool)
    }

    fn pair(&self, pool: &Address, tokens: &[String]) -> Result<[Currency; 2]> {
        match tokens {
            [token0, token1] => Ok([self.currency(token0)?, self.currency(token1)?]),
            _ => Err(invalid(format!(
                "pool {} must list exactly 2 tokens, got {}",
                pool,
                tokens.len()
            ))),
        }
    }
}

fn amounts(values: &[String]) -> Result<Vec<BigUint>> {
    values.iter().map(|value| parse_amount(value)).collect()
}

fn pair_amounts(pool: &Address, field: &str, values: &[String]) -> Result<[BigUint; 2]> {
    let parsed = amounts(values)?;
    <[BigUint; 2]>::try_from(parsed).map_err(|parsed| {
        invalid(format!(
            "pool {} must list exactly 2 {}, got {}",
            pool,
            field,
            parsed.len()
        ))
    })
}

fn invalid(reason: String) -> crate::errors::RouterError {
    UtilityError::InvalidSnapshot { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RouterError;
    use crate::pool::PoolType;

    const SNAPSHOT: &str = r#"{
        "chain_id": 1,
        "currencies": [
            { "symbol": "USDC", "address": "0x1111111111111111111111111111111111111111", "decimals": 6 },
            { "symbol": "DAI", "address": "0x2222222222222222222222222222222222222222", "decimals": 18 },
            { "symbol": "USDT", "address": "0x3333333333333333333333333333333333333333", "decimals": 6 },
            { "symbol": "WETH", "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18 },
            { "symbol": "ETH", "address": "0x0000000000000000000000000000000000000000", "decimals": 18,
              "wrapped": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2" }
        ],
        "pools": [
            { "type": "constant-product", "address": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
              "tokens": ["USDC", "WETH"], "reserves": ["2000000000000", "1000000000000000000000"], "fee_bps": 30 },
            { "type": "concentrated", "address": "0xa2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2",
              "tokens": ["DAI", "WETH"], "real_reserves": ["1000000000000000000000", "500000000000000000"],
              "virtual_reserves": ["20000000000000000000000", "10000000000000000000"], "fee_bps": 5 },
            { "type": "stable", "address": "0xa3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3",
              "tokens": ["USDC", "DAI", "USDT"],
              "balances": ["1000000000000", "1000000000000000000000000", "1000000000000"],
              "amplification": 200, "fee_bps": 4 }
        ]
    }"#;

    #[test]
    fn test_snapshot_decodes_all_pool_types() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();

        let pools = snapshot.pools().unwrap();
        let types: Vec<PoolType> = pools.iter().map(Pool::pool_type).collect();
        assert_eq!(
            types,
            vec![PoolType::ConstantProduct, PoolType::Concentrated, PoolType::Stable]
        );

        let graph = snapshot.graph().unwrap();
        assert_eq!(graph.vertex_count(), 4);
        // one edge per two-asset pool plus three for the stable pool
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_currency_lookup() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();

        let usdc = snapshot.currency("usdc").unwrap();
        assert_eq!(usdc.decimals(), 6);
        assert_eq!(
            snapshot.currency("0x2222222222222222222222222222222222222222").unwrap().symbol(),
            "DAI"
        );

        let eth = snapshot.currency("ETH").unwrap();
        assert!(eth.is_native());
        assert_eq!(eth, snapshot.currency("WETH").unwrap());

        let err = snapshot.currency("SHIB").unwrap_err();
        assert!(matches!(
            err,
            RouterError::Utility(UtilityError::UnknownCurrency { ref reference }) if reference == "SHIB"
        ));
    }

    #[test]
    fn test_snapshot_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let snapshot = Snapshot::from_file(file.path()).unwrap();
        assert_eq!(snapshot.chain_id, 1);
        assert_eq!(snapshot.currencies().unwrap().len(), 5);

        let missing = Snapshot::from_file(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(missing, RouterError::Io(_)));
    }

    #[test]
    fn test_malformed_pools_are_rejected() {
        let mut snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        snapshot.pools = vec![PoolSnapshot::ConstantProduct {
            address: "0xa4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4".to_string(),
            tokens: vec!["USDC".to_string()],
            reserves: vec!["1".to_string(), "2".to_string()],
            fee_bps: 30,
        }];
        assert!(matches!(
            snapshot.pools().unwrap_err(),
            RouterError::Utility(UtilityError::InvalidSnapshot { .. })
        ));

        snapshot.pools = vec![PoolSnapshot::ConstantProduct {
            address: "0xa4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4a4".to_string(),
            tokens: vec!["USDC".to_string(), "DAI".to_string()],
            reserves: vec!["1".to_string(), "lots".to_string()],
            fee_bps: 30,
        }];
        assert!(matches!(
            snapshot.pools().unwrap_err(),
            RouterError::Utility(UtilityError::AmountParsingFailed { .. })
        ));

        assert!(matches!(
            Snapshot::from_json("{ \"chain_id\": 1 }").unwrap_err(),
            RouterError::Serialization(_)
        ));
    }
}
