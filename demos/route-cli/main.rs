pub mod cli;
pub mod report;

use clap::Parser;
use stream_router::errors::Result;
use stream_router::utils::parse_units;
use stream_router::{CurrencyAmount, GasPriceSource, Router, Snapshot, TradeRequestBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .init();

    let args = cli::Args::parse();
    let config = args.config()?;

    let snapshot = Snapshot::from_file(&args.snapshot)?;
    let token_in = snapshot.currency(&args.token_in)?;
    let token_out = snapshot.currency(&args.token_out)?;
    let mut graph = snapshot.graph()?;

    let trade_type = args.trade_type();
    let (amount_currency, quote_currency) = if trade_type.is_exact_input() {
        (token_in, token_out)
    } else {
        (token_out, token_in)
    };
    let amount = parse_units(&args.amount, amount_currency.decimals())?;

    let request = TradeRequestBuilder::new(CurrencyAmount::new(amount_currency, amount), quote_currency)
        .with_config(&config)
        .trade_type(trade_type)
        .gas_price(GasPriceSource::fixed(args.gas_price()?))
        .build()?;

    tracing::info!(
        pools = graph.pool_count(),
        currencies = graph.vertex_count(),
        "Routing over snapshot"
    );

    let router = Router::from_config(&config);
    let trade = match router.find_best_trade(&mut graph, &request).await {
        Ok(trade) => trade,
        Err(e) => {
            if e.is_no_route() {
                tracing::warn!("No route found, try raising --max-hops or lowering --streams");
            }
            tracing::error!(error = %e, "Routing failed");
            return Err(e);
        }
    };

    println!("{}", trade);

    if let Some(ref path) = args.csv {
        report::append(path, &report::TradeRecord::new(&trade))?;
    }

    Ok(())
}
