//! Pool quoting as a suspending operation.
//!
//! The route search never prices a pool directly: it asks a [`PoolQuoter`],
//! which may answer from the in-memory pool state ([`LocalQuoter`]) or from an
//! external simulation service. Quotes for the edges of one expansion round are
//! awaited together, so an implementation backed by network calls gets
//! concurrency for free.

use crate::currency::Currency;
use crate::QuoteResult;
use crate::pool::{Pool, PoolQuote};
use crate::trade::TradeType;
use num_bigint::BigUint;
use std::future::Future;

/// One quote request against one pool.
#[derive(Debug, Clone, Copy)]
pub struct QuoteRequest<'a> {
    pub pool: &'a Pool,
    pub token_in: &'a Currency,
    pub token_out: &'a Currency,
    /// Input for exact-input quotes, desired output for exact-output quotes
    pub amount: &'a BigUint,
    pub trade_type: TradeType,
}

/// Provider of pool quotes.
///
/// Implementations must not mutate any shared pool state: the post-trade pool
/// is returned in [`PoolQuote::pool_after`] and only written back to the graph
/// when a route is applied.
pub trait PoolQuoter: Send + Sync {
    fn quote(
        &self,
        request: QuoteRequest<'_>,
    ) -> impl Future<Output = QuoteResult<PoolQuote>> + Send;
}

/// Quotes pools from their in-memory state using the reference pricing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalQuoter;

impl PoolQuoter for LocalQuoter {
    fn quote(
        &self,
        request: QuoteRequest<'_>,
    ) -> impl Future<Output = QuoteResult<PoolQuote>> + Send {
        futures::future::ready(request.pool.quote(
            request.token_in,
            request.token_out,
            request.amount,
            request.trade_type,
        ))
    }
}
