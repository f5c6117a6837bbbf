use clap::{Parser, Subcommand};

use crate::commands;
use crate::utils;

#[derive(Parser)]
#[command(name = "markethub")]
#[command(about = "Unified market data API for stocks, crypto and news", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server
    Serve {
        /// Port to listen on (overrides the PORT environment variable)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check provider connectivity
    Doctor,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or_else(utils::get_port);
            commands::serve::run(port).await;
        }
        Commands::Doctor => {
            commands::doctor::run().await;
        }
    }
}
