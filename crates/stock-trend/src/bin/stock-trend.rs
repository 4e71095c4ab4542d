//! Stock trend CLI
//!
//! Asks for one ticker symbol and runs the full trend pipeline for it.
//!
//! # Usage
//!
//! ```bash
//! # Credentials, from the environment or a .env file
//! export NEWS_API_KEY="..."
//! export GROQ_API_KEY="..."
//!
//! cargo run --bin stock-trend -p stock-trend
//! ```

use stock_trend::{StockConfig, TrendPipeline};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

fn read_symbol() -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter stock ticker symbol: ")?;
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG
    let dotenv = trend_utils::load_dotenv();
    trend_utils::init_tracing("warn");
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Environment file loaded");
    }

    let config = StockConfig::builder().with_env_keys().build()?;
    let pipeline = TrendPipeline::from_config(&config)?;
    info!(model = %config.model, output_dir = %config.output_dir.display(), "Configuration loaded");

    let mut stdout = io::stdout();
    tokio::select! {
        result = async {
            let input = tokio::task::spawn_blocking(read_symbol).await??;
            pipeline.run(&input, &mut stdout).await?;
            anyhow::Ok(())
        } => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\nProcess interrupted by user. Exiting gracefully.");
            // Runtime shutdown would block on a pending stdin read.
            std::process::exit(0);
        }
    }

    Ok(())
}
