//! cadeirad — the cadeiras catalog daemon.
//!
//! Single binary that assembles:
//! - Configuration (flags, environment, `.env`, optional TOML file)
//! - Tracing subscriber
//! - Postgres pool (or an in-memory table)
//! - REST API
//!
//! # Usage
//!
//! ```text
//! DB_HOST=localhost DB_USER=app DB_DATABASE=loja cadeirad --port 3000
//! cadeirad --in-memory
//! ```

mod config;
mod logging;
mod server;

use clap::Parser;

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let settings = Settings::load(&cli)?;
    server::run(settings).await
}
