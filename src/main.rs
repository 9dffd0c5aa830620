use clap::Parser;
use sma_trader::cli::{Cli, Commands};
use sma_trader::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::from_toml(include_str!("../config.toml.example"))?
        }
    };

    sma_trader::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Run(args) => {
            tracing::info!("Starting paper trading mode");
            args.execute(&config).await?;
        }
        Commands::Capture(args) => {
            tracing::info!("Starting data capture mode");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {} via {}", config.feed.symbol, display_url(&config.feed.url));
            println!(
                "  Strategy: SMA {}/{} threshold={}",
                config.strategy.short_period, config.strategy.long_period, config.strategy.threshold
            );
            println!(
                "  Backtest: balance={} commission={}%",
                config.backtest.initial_balance,
                config.backtest.commission_rate * rust_decimal_macros::dec!(100)
            );
            println!(
                "  Live: every {}s, {} retries, orders in {}",
                config.live.polling_interval_secs,
                config.live.max_retries,
                config.live.orders_dir.display()
            );
            println!("  Data: {}", config.data.dir.display());
        }
    }

    Ok(())
}

fn display_url(url: &str) -> &str {
    if url.is_empty() {
        "(no endpoint)"
    } else {
        url
    }
}
