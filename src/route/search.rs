//! Best-route search for one stream.
//!
//! A Dijkstra variant that maximises realised value instead of minimising
//! distance. Every vertex keeps the best amount reached so far and the
//! predecessor edge that produced it; the comparable figure used to rank
//! vertices is that amount valued in base currency, net of gas.
//!
//! # Algorithm
//!
//! 1. Start at the base vertex with the stream amount, zero gas, zero hops
//! 2. Pop the best frontier vertex (highest net value for exact-input, lowest
//!    net cost for exact-output; ties go to the earliest tracked vertex)
//! 3. Stop at the finish vertex and walk predecessors back to the start
//! 4. Otherwise quote every edge to an unprocessed neighbour, concurrently,
//!    and relax the neighbours' records one by one
//!
//! A vertex at the hop limit is popped and settled but never expanded, so it
//! stays excluded for the rest of the search.

use super::{Route, RouteType};
use crate::errors::{GraphError, Result, RouteError};
use crate::gas::GasModel;
use crate::graph::{EdgeId, RoutingGraph, VertexId};
use crate::pool::PoolType;
use crate::price::PriceCalculator;
use crate::quoter::{PoolQuoter, QuoteRequest};
use crate::split::StreamShare;
use crate::trade::TradeType;
use crate::utils::{floor_to_biguint, to_rational};
use futures::future::join_all;
use num_bigint::BigUint;
use num_rational::BigRational;
use std::collections::{HashMap, HashSet};

/// Best result recorded for a vertex.
#[derive(Debug, Clone)]
struct VertexRecord {
    hops: usize,
    gas_spent: u64,
    /// Raw amount of the vertex's currency reached (exact-input) or needed
    /// (exact-output)
    best_amount: BigUint,
    best_source: Option<EdgeId>,
    /// `best_amount` in base units, net of gas
    best_quote: BigRational,
}

/// An edge worth quoting from the vertex being expanded.
struct Candidate {
    edge_id: EdgeId,
    neighbour: VertexId,
}

/// One search over a fixed graph state.
pub struct RouteSearch<'a, Q> {
    graph: &'a RoutingGraph,
    quoter: &'a Q,
    gas_model: &'a GasModel,
    prices: &'a PriceCalculator,
    trade_type: TradeType,
    max_hops: usize,
}

impl<'a, Q: PoolQuoter> RouteSearch<'a, Q> {
    pub fn new(
        graph: &'a RoutingGraph,
        quoter: &'a Q,
        gas_model: &'a GasModel,
        prices: &'a PriceCalculator,
        trade_type: TradeType,
        max_hops: usize,
    ) -> Self {
        Self {
            graph,
            quoter,
            gas_model,
            prices,
            trade_type,
            max_hops,
        }
    }

    /// Find the best route from `start` to `finish` for one stream.
    ///
    /// For exact-input, `start` holds the input currency and the stream amount
    /// is spent there. For exact-output, `start` holds the output currency and
    /// the search walks towards the input currency at `finish`.
    ///
    /// # Errors
    ///
    /// - `NoRouteFound` if the frontier empties before `finish` is reached
    /// - `InvalidRoute` / `InvalidEdge` if reconstruction hits an inconsistency
    pub async fn search(
        &self,
        start: VertexId,
        finish: VertexId,
        stream: &StreamShare,
    ) -> Result<Route> {
        let mut records: HashMap<VertexId, VertexRecord> = HashMap::new();
        records.insert(
            start,
            VertexRecord {
                hops: 0,
                gas_spent: 0,
                best_amount: stream.amount.clone(),
                best_source: None,
                best_quote: to_rational(&stream.amount),
            },
        );
        let mut frontier: Vec<VertexId> = vec![start];
        let mut processed: HashSet<VertexId> = HashSet::new();

        loop {
            let Some(position) = self.select_best(&frontier, &records) else {
                return Err(self.no_route(start, finish));
            };
            let current = frontier.remove(position);
            processed.insert(current);

            if current == finish {
                return self.reconstruct(start, finish, &records, stream);
            }

            let Some(record) = records.get(&current).cloned() else {
                continue;
            };
            if record.hops >= self.max_hops {
                tracing::trace!(vertex = current, hops = record.hops, "Hop limit reached, not expanding");
                continue;
            }

            let candidates = self.candidates(current, &record, &records, &processed)?;
            self.relax(current, &record, candidates, &mut records, &mut frontier)
                .await?;
        }
    }

    /// Frontier position of the best vertex; the first one wins ties.
    fn select_best(
        &self,
        frontier: &[VertexId],
        records: &HashMap<VertexId, VertexRecord>,
    ) -> Option<usize> {
        let mut best: Option<(usize, &BigRational)> = None;
        for (position, vertex) in frontier.iter().enumerate() {
            let Some(record) = records.get(vertex) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, incumbent)) => self.improves(&record.best_quote, incumbent),
            };
            if better {
                best = Some((position, &record.best_quote));
            }
        }
        best.map(|(position, _)| position)
    }

    /// Whether `candidate` strictly beats `incumbent` in this trade direction.
    fn improves(&self, candidate: &BigRational, incumbent: &BigRational) -> bool {
        match self.trade_type {
            TradeType::ExactInput => candidate > incumbent,
            TradeType::ExactOutput => candidate < incumbent,
        }
    }

    /// Edges from `current` to unprocessed neighbours that may be quoted.
    fn candidates(
        &self,
        current: VertexId,
        record: &VertexRecord,
        records: &HashMap<VertexId, VertexRecord>,
        processed: &HashSet<VertexId>,
    ) -> Result<Vec<Candidate>> {
        // exact-output keeps one pool family along a route
        let required_type: Option<PoolType> = match (self.trade_type, record.best_source) {
            (TradeType::ExactOutput, Some(source)) => Some(self.graph.edge(source)?.pool_type()),
            _ => None,
        };

        let mut candidates = Vec::new();
        for (edge_id, neighbour) in self.graph.adjacent(current)? {
            if processed.contains(&neighbour) {
                continue;
            }
            if let Some(required) = required_type {
                if self.graph.edge(edge_id)?.pool_type() != required {
                    continue;
                }
            }
            candidates.push(Candidate { edge_id, neighbour });
        }

        tracing::trace!(
            vertex = current,
            candidates = candidates.len(),
            tracked = records.len(),
            "Expanding vertex"
        );
        Ok(candidates)
    }

    /// Quote all candidates together, then update records one at a time.
    async fn relax(
        &self,
        current: VertexId,
        record: &VertexRecord,
        candidates: Vec<Candidate>,
        records: &mut HashMap<VertexId, VertexRecord>,
        frontier: &mut Vec<VertexId>,
    ) -> Result<()> {
        let here = self.graph.vertex(current)?.currency();

        let mut requests = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let edge = self.graph.edge(candidate.edge_id)?;
            let there = self.graph.vertex(candidate.neighbour)?.currency();
            // exact-output walks from the output currency towards the input
            let (token_in, token_out) = match self.trade_type {
                TradeType::ExactInput => (here, there),
                TradeType::ExactOutput => (there, here),
            };
            requests.push(self.quoter.quote(QuoteRequest {
                pool: edge.pool(),
                token_in,
                token_out,
                amount: &record.best_amount,
                trade_type: self.trade_type,
            }));
        }
        let quotes = join_all(requests).await;

        for (candidate, quote) in candidates.into_iter().zip(quotes) {
            let edge = self.graph.edge(candidate.edge_id)?;
            let quote = match quote {
                Ok(quote) => quote,
                Err(error) => {
                    tracing::trace!(
                        pool = %edge.pool().address(),
                        error = %error,
                        "Skipping edge whose pool rejected the quote"
                    );
                    continue;
                }
            };

            let Some(value) = self.prices.value_in_base(candidate.neighbour, &quote.amount) else {
                tracing::trace!(vertex = candidate.neighbour, "Skipping unpriced neighbour");
                continue;
            };
            let gas_spent = record.gas_spent + self.gas_model.estimate(edge.pool_type());
            let gas_in_base = self.prices.gas_cost_in_base(gas_spent);
            let comparable = match self.trade_type {
                TradeType::ExactInput => value - gas_in_base,
                TradeType::ExactOutput => value + gas_in_base,
            };

            let tracked = records.get(&candidate.neighbour);
            let update = match tracked {
                None => true,
                Some(existing) => self.improves(&comparable, &existing.best_quote),
            };
            if !update {
                continue;
            }
            if tracked.is_none() {
                frontier.push(candidate.neighbour);
            }

            tracing::trace!(
                from = current,
                to = candidate.neighbour,
                pool = %edge.pool().address(),
                amount = %quote.amount,
                gas = gas_spent,
                "Improved vertex record"
            );
            records.insert(
                candidate.neighbour,
                VertexRecord {
                    hops: record.hops + 1,
                    gas_spent,
                    best_amount: quote.amount,
                    best_source: Some(candidate.edge_id),
                    best_quote: comparable,
                },
            );
        }

        Ok(())
    }

    /// Walk predecessor edges from `finish` back to `start` and price the route.
    fn reconstruct(
        &self,
        start: VertexId,
        finish: VertexId,
        records: &HashMap<VertexId, VertexRecord>,
        stream: &StreamShare,
    ) -> Result<Route> {
        let invalid = |reason: String| GraphError::InvalidRoute { reason };

        // finish first, start last
        let mut vertices = vec![finish];
        let mut edges: Vec<EdgeId> = Vec::new();
        let mut cursor = finish;
        while let Some(edge_id) = records.get(&cursor).and_then(|record| record.best_source) {
            if edges.len() >= self.graph.vertex_count() {
                return Err(invalid("predecessor chain does not terminate".to_string()).into());
            }
            cursor = self.graph.neighbour(edge_id, cursor)?;
            edges.push(edge_id);
            vertices.push(cursor);
        }
        if cursor != start {
            return Err(invalid(format!(
                "predecessor chain ends at vertex {} instead of {}",
                cursor, start
            ))
            .into());
        }

        // paths read input -> output
        if self.trade_type.is_exact_input() {
            vertices.reverse();
            edges.reverse();
        }

        let path = vertices
            .iter()
            .map(|&vertex| self.graph.vertex(vertex).map(|v| v.currency().clone()))
            .collect::<Result<Vec<_>>>()?;
        let pools = edges
            .iter()
            .map(|&edge_id| self.graph.edge(edge_id).map(|edge| edge.pool().clone()))
            .collect::<Result<Vec<_>>>()?;

        let record = records
            .get(&finish)
            .ok_or_else(|| invalid("finish vertex has no record".to_string()))?;
        let quote = record.best_amount.clone();
        let gas_estimate = record.gas_spent;
        let gas_cost_in_base = floor_to_biguint(&self.prices.gas_cost_in_base(gas_estimate));
        let gas_cost_in_quote = floor_to_biguint(&self.prices.gas_cost_in(finish, gas_estimate));

        let (input_amount, output_amount, input_adjusted, output_adjusted) = match self.trade_type {
            TradeType::ExactInput => {
                let adjusted = if quote > gas_cost_in_quote {
                    &quote - &gas_cost_in_quote
                } else {
                    BigUint::default()
                };
                (stream.amount.clone(), quote, stream.amount.clone(), adjusted)
            }
            TradeType::ExactOutput => {
                let adjusted = &quote + &gas_cost_in_quote;
                (quote, stream.amount.clone(), adjusted, stream.amount.clone())
            }
        };

        let route = Route {
            route_type: RouteType::of(&pools),
            trade_type: self.trade_type,
            path,
            pools,
            share: stream.share.clone(),
            input_amount,
            output_amount,
            input_amount_with_gas_adjusted: input_adjusted,
            output_amount_with_gas_adjusted: output_adjusted,
            gas_estimate,
            gas_cost_in_base,
            gas_cost_in_quote,
        };

        tracing::debug!(
            route = %route,
            "Found best route for stream"
        );
        Ok(route)
    }

    fn no_route(&self, start: VertexId, finish: VertexId) -> crate::errors::RouterError {
        let address = |vertex: VertexId| {
            self.graph
                .vertex(vertex)
                .map(|v| v.currency().canonical_address())
                .unwrap_or_default()
        };
        tracing::debug!(start = start, finish = finish, max_hops = self.max_hops, "Frontier exhausted");
        RouteError::NoRouteFound {
            from: address(start),
            to: address(finish),
            max_hops: self.max_hops,
        }
        .into()
    }
}
