//! Main application entry point.

use clap::Parser;
use versedeck_app::Cli;

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Starting VerseDeck");

    let cli = Cli::parse();
    if let Err(e) = versedeck_app::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
