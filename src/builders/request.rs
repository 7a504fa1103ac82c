//! Builder pattern for TradeRequest

use crate::config::RouterConfig;
use crate::currency::{Currency, CurrencyAmount};
use crate::errors::Result;
use crate::gas::GasPriceSource;
use crate::router::TradeRequest;
use crate::split::Streams;
use crate::trade::TradeType;

/// Builder for TradeRequest with validation at build time
#[derive(Debug, Clone)]
pub struct TradeRequestBuilder {
    request: TradeRequest,
}

impl TradeRequestBuilder {
    /// Start an exact-input request trading `amount` into `quote_currency`.
    pub fn new(amount: CurrencyAmount, quote_currency: Currency) -> Self {
        Self {
            request: TradeRequest::new(amount, quote_currency, TradeType::ExactInput),
        }
    }

    /// Take hop limit and streams from `config`.
    pub fn with_config(mut self, config: &RouterConfig) -> Self {
        self.request.max_hops = config.max_hops;
        self.request.streams = config.streams.clone();
        self
    }

    pub fn trade_type(mut self, trade_type: TradeType) -> Self {
        self.request.trade_type = trade_type;
        self
    }

    /// The amount is what is paid in
    pub fn exact_input(self) -> Self {
        self.trade_type(TradeType::ExactInput)
    }

    /// The amount is what must come out
    pub fn exact_output(self) -> Self {
        self.trade_type(TradeType::ExactOutput)
    }

    pub fn streams(mut self, streams: Streams) -> Self {
        self.request.streams = streams;
        self
    }

    pub fn gas_price(mut self, gas_price: GasPriceSource) -> Self {
        self.request.gas_price = gas_price;
        self
    }

    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.request.max_hops = max_hops;
        self
    }

    /// Build the TradeRequest
    ///
    /// # Errors
    ///
    /// Returns an error for a zero hop limit, identical currencies, or streams
    /// that cannot split the amount
    pub fn build(self) -> Result<TradeRequest> {
        self.request.validate()?;
        crate::split::split_amount(&self.request.amount.amount, &self.request.streams)?;
        Ok(self.request)
    }
}
