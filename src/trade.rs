//! Trade direction and the aggregate result of one routing call.

use crate::currency::{Currency, CurrencyAmount};
use crate::route::Route;
use num_bigint::BigUint;
use std::fmt;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// The input amount is fixed; maximise the output
    ExactInput,
    /// The output amount is fixed; minimise the input
    ExactOutput,
}

impl TradeType {
    pub fn is_exact_input(self) -> bool {
        matches!(self, TradeType::ExactInput)
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::ExactInput => f.write_str("exact-input"),
            TradeType::ExactOutput => f.write_str("exact-output"),
        }
    }
}

/// The best trade found for a request, summed over its routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub trade_type: TradeType,
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
    pub input_amount_with_gas_adjusted: CurrencyAmount,
    pub output_amount_with_gas_adjusted: CurrencyAmount,
    pub gas_estimate: u64,
    /// Gas cost in the requested amount's currency
    pub gas_cost_in_base: CurrencyAmount,
    /// Gas cost in the quote currency
    pub gas_cost_in_quote: CurrencyAmount,
    pub routes: Vec<Route>,
}

impl Trade {
    /// Aggregate `routes` into a trade.
    ///
    /// `amount` is the requested amount (input for exact-input, output for
    /// exact-output) and is reported unchanged; the other side is the sum of
    /// the route quotes.
    pub fn from_routes(
        trade_type: TradeType,
        amount: &CurrencyAmount,
        quote_currency: &Currency,
        routes: Vec<Route>,
    ) -> Self {
        let input_total = total(&routes, |route| &route.input_amount);
        let output_total = total(&routes, |route| &route.output_amount);
        let input_adjusted = total(&routes, |route| &route.input_amount_with_gas_adjusted);
        let output_adjusted = total(&routes, |route| &route.output_amount_with_gas_adjusted);
        let gas_cost_in_base = total(&routes, |route| &route.gas_cost_in_base);
        let gas_cost_in_quote = total(&routes, |route| &route.gas_cost_in_quote);
        let gas_estimate = routes.iter().map(|route| route.gas_estimate).sum();

        let base = amount.currency.clone();
        let quote = quote_currency.clone();
        let (input_amount, output_amount, input_adjusted, output_adjusted) = match trade_type {
            TradeType::ExactInput => (
                amount.clone(),
                CurrencyAmount::new(quote.clone(), output_total),
                CurrencyAmount::new(base.clone(), input_adjusted),
                CurrencyAmount::new(quote.clone(), output_adjusted),
            ),
            TradeType::ExactOutput => (
                CurrencyAmount::new(quote.clone(), input_total),
                amount.clone(),
                CurrencyAmount::new(quote.clone(), input_adjusted),
                CurrencyAmount::new(base.clone(), output_adjusted),
            ),
        };

        Self {
            trade_type,
            input_amount,
            output_amount,
            input_amount_with_gas_adjusted: input_adjusted,
            output_amount_with_gas_adjusted: output_adjusted,
            gas_estimate,
            gas_cost_in_base: CurrencyAmount::new(base, gas_cost_in_base),
            gas_cost_in_quote: CurrencyAmount::new(quote, gas_cost_in_quote),
            routes,
        }
    }
}

fn total<'a>(routes: &'a [Route], field: impl Fn(&'a Route) -> &'a BigUint) -> BigUint {
    routes.iter().map(field).sum()
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} trade: {} -> {} ({} gas, gas cost {})",
            self.trade_type, self.input_amount, self.output_amount, self.gas_estimate, self.gas_cost_in_quote
        )?;
        for route in &self.routes {
            writeln!(f, "  {}", route)?;
        }
        Ok(())
    }
}
