//! Merging stream routes that trade through the same pools.

use super::Route;
use crate::pool::PoolKey;

/// Merge routes with an identical ordered pool path.
///
/// Shares, amounts and gas figures of merged routes are summed. Routes keep
/// the order in which their path first appeared; the merged route keeps the
/// pool states quoted for the first stream on that path.
pub fn merge_routes(routes: Vec<Route>) -> Vec<Route> {
    let mut merged: Vec<(Vec<PoolKey>, Route)> = Vec::with_capacity(routes.len());

    for route in routes {
        let keys = route.pool_keys();
        match merged.iter_mut().find(|(existing, _)| *existing == keys) {
            Some((_, target)) => absorb(target, route),
            None => merged.push((keys, route)),
        }
    }

    tracing::debug!(routes = merged.len(), "Merged stream routes");
    merged.into_iter().map(|(_, route)| route).collect()
}

fn absorb(target: &mut Route, route: Route) {
    target.share += route.share;
    target.input_amount += route.input_amount;
    target.output_amount += route.output_amount;
    target.input_amount_with_gas_adjusted += route.input_amount_with_gas_adjusted;
    target.output_amount_with_gas_adjusted += route.output_amount_with_gas_adjusted;
    target.gas_estimate += route.gas_estimate;
    target.gas_cost_in_base += route.gas_cost_in_base;
    target.gas_cost_in_quote += route.gas_cost_in_quote;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::test_utils::{constant_product, currency};
    use crate::pool::Pool;
    use crate::route::RouteType;
    use crate::trade::TradeType;
    use num_bigint::{BigInt, BigUint};
    use num_rational::BigRational;
    use num_traits::One;

    fn route(pools: Vec<Pool>, path: Vec<crate::currency::Currency>, share: (i64, i64), output: u32) -> Route {
        Route {
            route_type: RouteType::ConstantProduct,
            trade_type: TradeType::ExactInput,
            path,
            pools,
            share: BigRational::new(BigInt::from(share.0), BigInt::from(share.1)),
            input_amount: BigUint::from(50u32),
            output_amount: BigUint::from(output),
            input_amount_with_gas_adjusted: BigUint::from(50u32),
            output_amount_with_gas_adjusted: BigUint::from(output),
            gas_estimate: 90_000,
            gas_cost_in_base: BigUint::from(1u32),
            gas_cost_in_quote: BigUint::from(1u32),
        }
    }

    #[test]
    fn test_same_pool_path_is_merged() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let pool = constant_product(0xa1, &a, &b, 1_000, 1_000);
        let path = vec![a.clone(), b.clone()];

        let merged = merge_routes(vec![
            route(vec![pool.clone()], path.clone(), (1, 2), 45),
            route(vec![pool], path, (1, 2), 41),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].share, BigRational::one());
        assert_eq!(merged[0].input_amount, BigUint::from(100u32));
        assert_eq!(merged[0].output_amount, BigUint::from(86u32));
        assert_eq!(merged[0].gas_estimate, 180_000);
        assert_eq!(merged[0].gas_cost_in_quote, BigUint::from(2u32));
    }

    #[test]
    fn test_different_pool_paths_stay_distinct() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let first = constant_product(0xa1, &a, &b, 1_000, 1_000);
        let second = constant_product(0xa2, &a, &b, 1_000, 1_000);
        let path = vec![a.clone(), b.clone()];

        let merged = merge_routes(vec![
            route(vec![first], path.clone(), (1, 3), 30),
            route(vec![second.clone()], path.clone(), (1, 3), 30),
            route(vec![second], path, (1, 3), 29),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].pools[0].address(), alloy::primitives::Address::repeat_byte(0xa1));
        assert_eq!(merged[1].share, BigRational::new(BigInt::from(2), BigInt::from(3)));
    }
}
