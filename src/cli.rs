use clap::{Parser, Subcommand};
use log::info;
use rporter::clients::errors::Result;

use crate::porter;

#[derive(Parser)]
#[command(name = "rporter")]
#[command(version, about = "Add exported playlist tracks to your Apple Music library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Add {},
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Add {} => {
            add_tracks().await?;
        }
    }
    Ok(())
}

async fn add_tracks() -> Result<()> {
    info!("Building config ...");
    let config = porter::ConfigBuilder::new().build()?;
    let porter = porter::Porter::new(config);
    porter.run().await
}
