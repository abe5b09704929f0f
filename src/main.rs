mod cli;
mod porter;
mod prompt;

use rporter::clients::errors::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up PORTER_* overrides from a local .env, then configure logging
    dotenvy::dotenv().ok();
    env_logger::init();

    cli::run().await
}
