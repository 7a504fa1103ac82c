//! Gas-unit estimation and gas-price retrieval.

use crate::errors::RouteError;
use crate::RouteResult;
use crate::pool::PoolType;
use futures::future::BoxFuture;
use futures::FutureExt;
use num_bigint::BigUint;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Gas units charged for one swap through a pool of each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasModel {
    pub constant_product: u64,
    pub concentrated: u64,
    pub stable: u64,
}

impl GasModel {
    pub const DEFAULT_CONSTANT_PRODUCT_GAS: u64 = 90_000;
    pub const DEFAULT_CONCENTRATED_GAS: u64 = 110_000;
    pub const DEFAULT_STABLE_GAS: u64 = 180_000;

    /// Gas units for one hop through a pool of `pool_type`
    pub fn estimate(&self, pool_type: PoolType) -> u64 {
        match pool_type {
            PoolType::ConstantProduct => self.constant_product,
            PoolType::Concentrated => self.concentrated,
            PoolType::Stable => self.stable,
        }
    }
}

impl Default for GasModel {
    fn default() -> Self {
        Self {
            constant_product: Self::DEFAULT_CONSTANT_PRODUCT_GAS,
            concentrated: Self::DEFAULT_CONCENTRATED_GAS,
            stable: Self::DEFAULT_STABLE_GAS,
        }
    }
}

/// Future returned by a dynamic gas-price provider
pub type GasPriceFuture = BoxFuture<'static, anyhow::Result<BigUint>>;

/// Where the gas price (in wei of the chain's native currency) comes from.
#[derive(Clone)]
pub enum GasPriceSource {
    /// A known gas price
    Fixed(BigUint),
    /// An async provider, called once per routing call
    Dynamic(Arc<dyn Fn() -> GasPriceFuture + Send + Sync>),
}

impl GasPriceSource {
    pub fn fixed(wei: impl Into<BigUint>) -> Self {
        GasPriceSource::Fixed(wei.into())
    }

    /// Wrap an async gas-price provider such as an RPC `eth_gasPrice` call.
    pub fn dynamic<F, Fut>(provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<BigUint>> + Send + 'static,
    {
        GasPriceSource::Dynamic(Arc::new(move || provider().boxed()))
    }

    /// Resolve the gas price.
    ///
    /// # Errors
    ///
    /// Returns `GasPriceUnavailable` if a dynamic provider fails
    pub async fn resolve(&self) -> RouteResult<BigUint> {
        match self {
            GasPriceSource::Fixed(price) => Ok(price.clone()),
            GasPriceSource::Dynamic(provider) => {
                let price = provider().await.map_err(|error| {
                    tracing::error!(error = %error, "Gas price provider failed");
                    RouteError::GasPriceUnavailable {
                        reason: error.to_string(),
                    }
                })?;
                tracing::debug!(gas_price = %price, "Resolved dynamic gas price");
                Ok(price)
            }
        }
    }
}

impl Default for GasPriceSource {
    fn default() -> Self {
        GasPriceSource::Fixed(BigUint::default())
    }
}

impl fmt::Debug for GasPriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasPriceSource::Fixed(price) => f.debug_tuple("Fixed").field(price).finish(),
            GasPriceSource::Dynamic(_) => f.write_str("Dynamic(<provider>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_gas_model_defaults_per_pool_type() {
        let model = GasModel::default();
        assert_eq!(model.estimate(PoolType::ConstantProduct), 90_000);
        assert_eq!(model.estimate(PoolType::Concentrated), 110_000);
        assert_eq!(model.estimate(PoolType::Stable), 180_000);
    }

    #[tokio::test]
    async fn test_dynamic_source_is_called_on_each_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let source = GasPriceSource::dynamic(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(BigUint::from(25_000_000_000u64))
            }
        });

        assert_eq!(source.resolve().await.unwrap(), BigUint::from(25_000_000_000u64));
        assert_eq!(source.resolve().await.unwrap(), BigUint::from(25_000_000_000u64));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_provider_maps_to_unavailable() {
        let source = GasPriceSource::dynamic(|| async { Err(anyhow::anyhow!("rpc down")) });

        let err = source.resolve().await.unwrap_err();
        assert!(matches!(err, RouteError::GasPriceUnavailable { ref reason } if reason.contains("rpc down")));
        assert_eq!(format!("{:?}", source), "Dynamic(<provider>)");
    }
}
