use clap::Parser;
use std::path::PathBuf;
use stream_router::errors::Result;
use stream_router::utils::parse_units;
use stream_router::{RouterConfig, Streams, TradeType};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Find the best trade over a pool snapshot", long_about = None)]
pub struct Args {
    #[clap(long, env = "ROUTER_SNAPSHOT", help = "Path to a JSON pool snapshot")]
    pub snapshot: PathBuf,

    #[clap(long, help = "Currency to pay, by symbol or address (e.g., USDC)")]
    pub token_in: String,

    #[clap(long, help = "Currency to receive, by symbol or address (e.g., WETH)")]
    pub token_out: String,

    #[clap(long, help = "Amount in whole units (e.g., 1.5); the input for exact-in, the output for exact-out")]
    pub amount: String,

    #[clap(long, help = "Treat the amount as the exact output instead of the exact input")]
    pub exact_out: bool,

    #[clap(long, env = "ROUTER_STREAMS", help = "Stream count (e.g., 4) or weights (e.g., 1,1,2)")]
    pub streams: Option<String>,

    #[clap(long, env = "ROUTER_MAX_HOPS", help = "Maximum pools per route")]
    pub max_hops: Option<usize>,

    #[clap(long, env = "ROUTER_GAS_PRICE_GWEI", default_value = "0", help = "Gas price in gwei")]
    pub gas_price_gwei: String,

    #[clap(long, help = "Append the trade to this CSV file")]
    pub csv: Option<PathBuf>,
}

impl Args {
    pub fn trade_type(&self) -> TradeType {
        if self.exact_out {
            TradeType::ExactOutput
        } else {
            TradeType::ExactInput
        }
    }

    /// Gas price in wei
    pub fn gas_price(&self) -> Result<num_bigint::BigUint> {
        parse_units(&self.gas_price_gwei, 9)
    }

    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<RouterConfig> {
        let mut config = RouterConfig::from_env()?;
        if let Some(ref streams) = self.streams {
            config.streams = streams.parse::<Streams>()?;
        }
        if let Some(max_hops) = self.max_hops {
            config.max_hops = max_hops;
        }

        tracing::debug!(
            max_hops = config.max_hops,
            streams = %config.streams,
            "Configuration resolved from environment and arguments"
        );
        Ok(config)
    }
}
