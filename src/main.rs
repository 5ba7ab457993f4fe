mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};

use attachbox::api;
use attachbox::config::Config;
use attachbox::event::S3Event;
use attachbox::observability::Metrics;
use attachbox::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Missing bucket or webhook endpoint aborts here, before any batch is accepted
    let config = Config::load()?;

    match cli.command {
        Commands::Serve(args) => {
            let address = args.address.unwrap_or(config.server.bind_addr);
            api::run(config, address).await?;
        }
        Commands::Process(args) => {
            let raw = std::fs::read_to_string(&args.event_file)?;
            let event: S3Event = serde_json::from_str(&raw)?;

            let metrics = Arc::new(Metrics::new());
            let pipeline = Pipeline::from_config(&config, metrics)?;
            let report = pipeline.run(event.into_records()).await;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
