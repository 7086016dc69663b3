//! Splunk command-line client.
//!
//! A thin front end over the SDK: log in, or fetch a collection and print
//! its entities as JSON lines.

use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use splunk_sdk::config::{Args, Command, Config};
use splunk_sdk::error::Result;
use splunk_sdk::sdk::{ArgumentSet, EntityCollection, Resource, ResourceName};
use splunk_sdk::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = Config::from_args(&args)?;
    debug!("Splunk SDK v{}", VERSION);
    debug!("Configuration: {:?}", config);

    let context = config.connect().await?;
    info!("Connected to {}", context);

    match args.command {
        Command::Login => {
            println!("{}", context.credential().unwrap_or_default());
        }
        Command::List { resource, args } => {
            let params: ArgumentSet = args.into_iter().collect();
            let mut collection: EntityCollection<Resource> = EntityCollection::new(
                context.clone(),
                config.namespace(),
                ResourceName::parse(&resource),
                (!params.is_empty()).then_some(&params),
            );

            collection.update().await?;
            info!("Fetched {} entities from {}", collection.len()?, resource);

            for entity in collection.iter()? {
                println!("{}", serde_json::to_string(entity)?);
            }
        }
    }

    context.dispose();
    Ok(())
}
