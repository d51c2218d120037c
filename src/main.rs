use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::{AppContext, Result};
use tributary::cli::{self, Cli, Command};
use tributary::session::Session;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        println!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut session = Session::load()?;
    let ctx = AppContext::new(&session.db_url)?;

    let command = Command::parse(&cli.command, &cli.args)?;
    cli::dispatch(&ctx, &mut session, command).await
}
