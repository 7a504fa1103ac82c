//! Entry point: best trade for a request over a routing graph.
//!
//! A routing call validates the request, splits the amount into streams and
//! routes the streams strictly one after another. Every stream is applied to
//! the graph before the next one is searched, so later streams see the price
//! impact of earlier ones. The graph is taken by `&mut`, which rules out a
//! concurrent call observing or advancing the same pools mid-trade.
//!
//! The call either returns a complete [`Trade`] or a single error. With a
//! deadline configured, the whole call is bounded by it; a call that times out
//! may leave the graph partially advanced.

use crate::config::RouterConfig;
use crate::currency::{Currency, CurrencyAmount};
use crate::errors::{Result, RouteError, RouterError};
use crate::gas::{GasModel, GasPriceSource};
use crate::graph::RoutingGraph;
use crate::pool::Pool;
use crate::price::PriceCalculator;
use crate::quoter::{LocalQuoter, PoolQuoter};
use crate::route::{merge_routes, RouteSearch};
use crate::split::{split_amount, Streams};
use crate::trade::{Trade, TradeType};
use crate::RouteResult;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// What to trade.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    /// Input amount for exact-input, output amount for exact-output
    pub amount: CurrencyAmount,
    /// The other side of the trade
    pub quote_currency: Currency,
    pub trade_type: TradeType,
    pub streams: Streams,
    pub gas_price: GasPriceSource,
    /// Maximum pools per route, at least 1
    pub max_hops: usize,
}

impl TradeRequest {
    /// A single-stream request with zero gas price and default hop limit.
    pub fn new(amount: CurrencyAmount, quote_currency: Currency, trade_type: TradeType) -> Self {
        Self {
            amount,
            quote_currency,
            trade_type,
            streams: Streams::default(),
            gas_price: GasPriceSource::default(),
            max_hops: RouterConfig::DEFAULT_MAX_HOPS,
        }
    }

    /// Currency paid into the trade
    pub fn input_currency(&self) -> &Currency {
        match self.trade_type {
            TradeType::ExactInput => &self.amount.currency,
            TradeType::ExactOutput => &self.quote_currency,
        }
    }

    /// Currency received from the trade
    pub fn output_currency(&self) -> &Currency {
        match self.trade_type {
            TradeType::ExactInput => &self.quote_currency,
            TradeType::ExactOutput => &self.amount.currency,
        }
    }

    pub(crate) fn validate(&self) -> RouteResult<()> {
        if self.max_hops == 0 {
            return Err(RouteError::InvalidMaxHops {
                max_hops: self.max_hops,
            });
        }
        if self.amount.currency == self.quote_currency {
            return Err(RouteError::IdenticalCurrencies {
                address: self.quote_currency.canonical_address(),
            });
        }
        Ok(())
    }
}

/// Finds best trades, quoting pools through `Q`.
#[derive(Debug, Clone, Default)]
pub struct Router<Q = LocalQuoter> {
    quoter: Q,
    gas_model: GasModel,
    timeout: Option<Duration>,
}

impl Router<LocalQuoter> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router using the configured gas model and deadline.
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            quoter: LocalQuoter,
            gas_model: config.gas_model,
            timeout: config.timeout,
        }
    }
}

impl<Q: PoolQuoter> Router<Q> {
    /// Replace the quote provider.
    pub fn with_quoter<R: PoolQuoter>(self, quoter: R) -> Router<R> {
        Router {
            quoter,
            gas_model: self.gas_model,
            timeout: self.timeout,
        }
    }

    pub fn with_gas_model(mut self, gas_model: GasModel) -> Self {
        self.gas_model = gas_model;
        self
    }

    /// Bound every routing call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn quoter(&self) -> &Q {
        &self.quoter
    }

    pub fn gas_model(&self) -> &GasModel {
        &self.gas_model
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Find the best trade for `request`, advancing `graph` by the trade.
    ///
    /// The graph keeps the post-trade pool state afterwards; pass a fresh
    /// graph to quote against untouched pools.
    ///
    /// # Errors
    ///
    /// - `InvalidMaxHops`, `IdenticalCurrencies`, `InvalidStreams` for a bad request
    /// - `InvalidGraph` if either currency is not in the graph
    /// - `GasPriceUnavailable` if the gas price provider fails
    /// - `NoStreamRoute` if any stream cannot be routed
    /// - `Timeout` if the configured deadline passes
    pub async fn find_best_trade(
        &self,
        graph: &mut RoutingGraph,
        request: &TradeRequest,
    ) -> Result<Trade> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "find_best_trade",
            request_id = %request_id,
            trade_type = %request.trade_type,
            amount = %request.amount,
            quote = %request.quote_currency,
        );

        let routing = self.route(graph, request).instrument(span);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, routing).await.map_err(|_| {
                let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(request_id = %request_id, timeout_ms = timeout_ms, "Routing call timed out");
                RouterError::from(RouteError::Timeout { timeout_ms })
            })?,
            None => routing.await,
        }
    }

    /// Build a graph from `pools`, then find the best trade on it.
    ///
    /// The advanced graph is returned with the trade so it can be reused.
    pub async fn find_best_trade_from_pools<I>(
        &self,
        pools: I,
        request: &TradeRequest,
    ) -> Result<(Trade, RoutingGraph)>
    where
        I: IntoIterator<Item = Pool>,
    {
        let mut graph = RoutingGraph::from_pools(pools)?;
        let trade = self.find_best_trade(&mut graph, request).await?;
        Ok((trade, graph))
    }

    async fn route(&self, graph: &mut RoutingGraph, request: &TradeRequest) -> Result<Trade> {
        request.validate()?;

        let start = graph.find_vertex(&request.amount.currency)?;
        let finish = graph.find_vertex(&request.quote_currency)?;
        let shares = split_amount(&request.amount.amount, &request.streams)?;
        let gas_price = request.gas_price.resolve().await?;
        let prices = PriceCalculator::new(graph, start, gas_price);

        tracing::info!(
            streams = shares.len(),
            max_hops = request.max_hops,
            "Routing trade"
        );

        let mut routes = Vec::with_capacity(shares.len());
        for (index, share) in shares.iter().enumerate() {
            let search = RouteSearch::new(
                graph,
                &self.quoter,
                &self.gas_model,
                &prices,
                request.trade_type,
                request.max_hops,
            );
            let route = match search.search(start, finish, share).await {
                Ok(route) => route,
                Err(RouterError::Route(source)) => {
                    tracing::warn!(stream = index, amount = %share.amount, error = %source, "Stream could not be routed");
                    return Err(RouteError::NoStreamRoute {
                        stream: index,
                        amount: share.amount.to_string(),
                        source: Box::new(source),
                    }
                    .into());
                }
                Err(other) => return Err(other),
            };

            tracing::debug!(
                stream = index,
                percent = share.percent(),
                route = %route,
                "Stream routed"
            );
            graph.apply_route(&route, &self.quoter).await?;
            routes.push(route);
        }

        let routes = merge_routes(routes);
        let trade = Trade::from_routes(
            request.trade_type,
            &request.amount,
            &request.quote_currency,
            routes,
        );

        tracing::info!(
            input = %trade.input_amount,
            output = %trade.output_amount,
            gas_estimate = trade.gas_estimate,
            routes = trade.routes.len(),
            "Best trade found"
        );
        Ok(trade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{GraphError, QuoteError};
    use crate::pool::test_utils::{constant_product, currency};
    use crate::pool::{ConstantProductPool, PoolQuote};
    use crate::quoter::QuoteRequest;
    use crate::utils::wrapped_native_address;
    use alloy::primitives::Address;
    use num_bigint::BigUint;
    use num_rational::BigRational;
    use num_traits::One;
    use std::future::Future;

    fn abc() -> (Currency, Currency, Currency) {
        (currency(0x01, "A"), currency(0x02, "B"), currency(0x03, "C"))
    }

    fn chain(a: &Currency, b: &Currency, c: &Currency) -> Vec<Pool> {
        vec![
            constant_product(0xa1, a, b, 1_000_000, 1_000_000),
            constant_product(0xa2, b, c, 1_000_000, 1_000_000),
        ]
    }

    fn exact_in(amount: u32, from: &Currency, to: &Currency) -> TradeRequest {
        TradeRequest::new(
            CurrencyAmount::new(from.clone(), amount),
            to.clone(),
            TradeType::ExactInput,
        )
    }

    #[tokio::test]
    async fn test_two_hop_scenario() {
        let (a, b, c) = abc();
        let mut request = exact_in(100, &a, &c);
        request.max_hops = 2;

        let (trade, _) = Router::new()
            .find_best_trade_from_pools(chain(&a, &b, &c), &request)
            .await
            .unwrap();

        assert_eq!(trade.routes.len(), 1);
        let route = &trade.routes[0];
        assert_eq!(route.path, vec![a.clone(), b, c.clone()]);
        let pools: Vec<Address> = route.pools.iter().map(Pool::address).collect();
        assert_eq!(pools, vec![Address::repeat_byte(0xa1), Address::repeat_byte(0xa2)]);
        assert_eq!(route.share, BigRational::one());
        assert!((route.percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(trade.input_amount, CurrencyAmount::new(a, 100u32));
        assert_eq!(trade.output_amount.currency, c);
    }

    #[tokio::test]
    async fn test_single_hop_limit_finds_no_route() {
        let (a, b, c) = abc();
        let mut request = exact_in(100, &a, &c);
        request.max_hops = 1;

        let err = Router::new()
            .find_best_trade_from_pools(chain(&a, &b, &c), &request)
            .await
            .unwrap_err();

        assert!(err.is_no_route());
        match err {
            RouterError::Route(RouteError::NoStreamRoute { stream, source, .. }) => {
                assert_eq!(stream, 0);
                assert!(matches!(*source, RouteError::NoRouteFound { max_hops: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_streams_over_one_pool_merge_into_one_route() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let pool = constant_product(0xa1, &a, &b, 1_000_000, 1_000_000);
        let mut request = exact_in(10_000, &a, &b);
        request.streams = Streams::Count(3);

        let (trade, _) = Router::new()
            .find_best_trade_from_pools(vec![pool.clone()], &request)
            .await
            .unwrap();

        assert_eq!(trade.routes.len(), 1);
        assert_eq!(trade.routes[0].share, BigRational::one());
        assert_eq!(trade.routes[0].input_amount, BigUint::from(10_000u32));
        assert_eq!(trade.input_amount.amount, BigUint::from(10_000u32));

        // price impact carries over between streams
        let single = pool
            .quote(&a, &b, &BigUint::from(3_333u32), TradeType::ExactInput)
            .unwrap()
            .amount;
        assert!(trade.output_amount.amount < single * 3u32 + 1u32);
    }

    #[tokio::test]
    async fn test_equal_streams_through_one_pool_lose_to_price_impact() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let pools = vec![constant_product(0xa1, &a, &b, 1_000_000, 1_000_000)];
        let mut request = exact_in(10_000, &a, &b);
        request.streams = Streams::Count(2);

        let mut graph = RoutingGraph::from_pools(pools.clone()).unwrap();
        let start = graph.find_vertex(&a).unwrap();
        let finish = graph.find_vertex(&b).unwrap();
        let shares = split_amount(&request.amount.amount, &request.streams).unwrap();
        assert_eq!(shares[0].amount, shares[1].amount);
        let prices = PriceCalculator::new(&graph, start, BigUint::default());
        let gas_model = GasModel::default();

        let mut streams = Vec::new();
        for share in &shares {
            let route = RouteSearch::new(
                &graph,
                &LocalQuoter,
                &gas_model,
                &prices,
                TradeType::ExactInput,
                request.max_hops,
            )
            .search(start, finish, share)
            .await
            .unwrap();
            graph.apply_route(&route, &LocalQuoter).await.unwrap();
            streams.push(route);
        }
        let (first, second) = (&streams[0], &streams[1]);
        assert!(second.output_amount <= first.output_amount);

        let (trade, _) = Router::new()
            .find_best_trade_from_pools(pools, &request)
            .await
            .unwrap();
        assert_eq!(trade.routes.len(), 1);
        assert_eq!(
            trade.output_amount.amount,
            &first.output_amount + &second.output_amount
        );
        assert!(trade.output_amount.amount < &first.output_amount * 2u32);
    }

    #[tokio::test]
    async fn test_second_stream_sees_first_stream_impact() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let pools = vec![
            constant_product(0xa1, &a, &b, 1_000_000, 1_000_000),
            constant_product(0xa2, &a, &b, 1_000_000, 1_000_000),
        ];
        let mut request = exact_in(20_000, &a, &b);
        request.streams = Streams::Count(2);

        let (trade, graph) = Router::new()
            .find_best_trade_from_pools(pools, &request)
            .await
            .unwrap();

        // the first stream drains the first pool, so the second takes the twin
        assert_eq!(trade.routes.len(), 2);
        assert_eq!(trade.routes[0].pools[0].address(), Address::repeat_byte(0xa1));
        assert_eq!(trade.routes[1].pools[0].address(), Address::repeat_byte(0xa2));
        assert_eq!(trade.routes[0].output_amount, trade.routes[1].output_amount);
        assert!(graph.edges().iter().all(|edge| match edge.pool() {
            Pool::ConstantProduct(pool) => pool.reserves()[0] == BigUint::from(1_010_000u32),
            _ => false,
        }));
    }

    #[tokio::test]
    async fn test_reused_graph_carries_state_forward() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let mut graph =
            RoutingGraph::from_pools(vec![constant_product(0xa1, &a, &b, 1_000_000, 1_000_000)])
                .unwrap();
        let request = exact_in(10_000, &a, &b);
        let router = Router::new();

        let first = router.find_best_trade(&mut graph, &request).await.unwrap();
        let second = router.find_best_trade(&mut graph, &request).await.unwrap();

        assert!(second.output_amount.amount < first.output_amount.amount);
    }

    #[tokio::test]
    async fn test_only_path_pools_change() {
        let (a, b, c) = abc();
        let d = currency(0x04, "D");
        let pools = vec![
            constant_product(0xa1, &a, &b, 1_000_000, 1_000_000),
            constant_product(0xa2, &b, &c, 1_000_000, 1_000_000),
            constant_product(0xa3, &c, &d, 1_000_000, 1_000_000),
        ];
        let mut graph = RoutingGraph::from_pools(pools.clone()).unwrap();

        Router::new()
            .find_best_trade(&mut graph, &exact_in(1_000, &a, &b))
            .await
            .unwrap();

        assert_ne!(graph.edges()[0].pool(), &pools[0]);
        assert_eq!(graph.edges()[1].pool(), &pools[1]);
        assert_eq!(graph.edges()[2].pool(), &pools[2]);
    }

    #[tokio::test]
    async fn test_exact_output_trade() {
        let (a, b, c) = abc();
        let mut request = TradeRequest::new(
            CurrencyAmount::new(c.clone(), 500u32),
            a.clone(),
            TradeType::ExactOutput,
        );
        request.max_hops = 2;

        let (trade, _) = Router::new()
            .find_best_trade_from_pools(chain(&a, &b, &c), &request)
            .await
            .unwrap();

        assert_eq!(request.input_currency(), &a);
        assert_eq!(trade.output_amount, CurrencyAmount::new(c.clone(), 500u32));
        assert_eq!(trade.input_amount.currency, a);
        assert!(trade.input_amount.amount > BigUint::from(500u32));
        assert_eq!(trade.routes[0].path, vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let (a, b, c) = abc();
        let router = Router::new();
        let mut graph = RoutingGraph::from_pools(chain(&a, &b, &c)).unwrap();

        let same = exact_in(100, &a, &a);
        let err = router.find_best_trade(&mut graph, &same).await.unwrap_err();
        assert!(matches!(err, RouterError::Route(RouteError::IdenticalCurrencies { .. })));

        let mut zero_hops = exact_in(100, &a, &c);
        zero_hops.max_hops = 0;
        let err = router.find_best_trade(&mut graph, &zero_hops).await.unwrap_err();
        assert!(matches!(err, RouterError::Route(RouteError::InvalidMaxHops { .. })));

        let unknown = exact_in(100, &a, &currency(0x09, "Z"));
        let err = router.find_best_trade(&mut graph, &unknown).await.unwrap_err();
        assert!(matches!(err, RouterError::Graph(GraphError::InvalidGraph { .. })));

        let mut bad_streams = exact_in(100, &a, &c);
        bad_streams.streams = Streams::Weights(vec![]);
        let err = router.find_best_trade(&mut graph, &bad_streams).await.unwrap_err();
        assert!(matches!(err, RouterError::Route(RouteError::InvalidStreams { .. })));
    }

    #[tokio::test]
    async fn test_failing_gas_price_aborts_the_call() {
        let (a, b, c) = abc();
        let mut request = exact_in(100, &a, &c);
        request.gas_price = GasPriceSource::dynamic(|| async { Err(anyhow::anyhow!("no rpc")) });

        let err = Router::new()
            .find_best_trade_from_pools(chain(&a, &b, &c), &request)
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::Route(RouteError::GasPriceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_gas_cost_favours_fewer_hops() {
        let usdc = Currency::token(1, Address::repeat_byte(0x11), 6, "USDC");
        let dai = Currency::token(1, Address::repeat_byte(0x12), 6, "DAI");
        let x = Currency::token(1, Address::repeat_byte(0x13), 6, "X");
        let weth = Currency::token(1, wrapped_native_address(1).unwrap(), 18, "WETH");
        let million = BigUint::from(1_000_000_000_000u64);
        let pool = |byte: u8, t0: &Currency, t1: &Currency, r0: BigUint, r1: BigUint, fee: u32| -> Pool {
            ConstantProductPool::new(Address::repeat_byte(byte), t0.clone(), t1.clone(), r0, r1, fee).into()
        };
        let pools = vec![
            pool(0xa1, &usdc, &dai, million.clone(), million.clone(), 100),
            pool(0xa2, &usdc, &x, million.clone(), million.clone(), 30),
            pool(0xa3, &x, &dai, million.clone(), million.clone(), 30),
            // 1 WETH = 2000 USDC
            pool(
                0xa4,
                &usdc,
                &weth,
                BigUint::from(2_000_000_000_000u64),
                BigUint::from(1_000u32) * BigUint::from(10u32).pow(18),
                30,
            ),
        ];
        let mut request = exact_in(1_000_000_000, &usdc, &dai);
        request.max_hops = 2;

        let (free_gas, _) = Router::new()
            .find_best_trade_from_pools(pools.clone(), &request)
            .await
            .unwrap();
        assert_eq!(free_gas.routes[0].path, vec![usdc.clone(), x, dai.clone()]);

        // 1000 gwei makes each hop cost about 180 USDC
        request.gas_price = GasPriceSource::fixed(1_000_000_000_000u64);
        let (expensive_gas, _) = Router::new()
            .find_best_trade_from_pools(pools, &request)
            .await
            .unwrap();
        let route = &expensive_gas.routes[0];
        assert_eq!(route.path, vec![usdc, dai]);
        assert_eq!(route.gas_estimate, GasModel::DEFAULT_CONSTANT_PRODUCT_GAS);
        assert!(route.gas_cost_in_quote > BigUint::from(170_000_000u32));
        assert!(expensive_gas.output_amount_with_gas_adjusted.amount < expensive_gas.output_amount.amount);
    }

    /// Quotes like the local quoter, after a delay.
    struct SlowQuoter(Duration);

    impl PoolQuoter for SlowQuoter {
        fn quote(
            &self,
            request: QuoteRequest<'_>,
        ) -> impl Future<Output = std::result::Result<PoolQuote, QuoteError>> + Send {
            let delay = self.0;
            let result = request.pool.quote(
                request.token_in,
                request.token_out,
                request.amount,
                request.trade_type,
            );
            async move {
                tokio::time::sleep(delay).await;
                result
            }
        }
    }

    #[tokio::test]
    async fn test_deadline_surfaces_timeout() {
        let (a, b, c) = abc();
        let mut request = exact_in(100, &a, &c);
        request.max_hops = 2;
        let router = Router::new()
            .with_quoter(SlowQuoter(Duration::from_millis(500)))
            .with_timeout(Some(Duration::from_millis(20)));

        let err = router
            .find_best_trade_from_pools(chain(&a, &b, &c), &request)
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::Route(RouteError::Timeout { timeout_ms: 20 })));
    }
}
