use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use clap::Parser;
use dotenv::dotenv;
use log::info;

use lorry::geo::Bounds;
use lorry::store::SpatialStore;
use lorry::update::{GraphUpdateService, InvalidationProducer, UpdateConsumer};
use lorry::Config;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Serves the graph-update consumer until interrupted.
#[derive(Parser, Debug)]
#[command(name = "consume", about = "Apply map/restriction updates from the event stream")]
struct Args {
    /// Region to hold in memory, as "lat1,lon1,lat2,lon2".
    #[arg(long, default_value = "32.0,-125.0,42.0,-114.0")]
    region: String,
}

#[tokio::main]
async fn main() -> lorry::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let region: Bounds = match args.region.parse() {
        Ok(bounds) => bounds,
        Err(reason) => {
            eprintln!("invalid --region: {reason}");
            std::process::exit(1);
        }
    };

    let config = Config::from_env()?;
    let store = Arc::new(SpatialStore::connect(&config.store).await?);

    let initial = store.load_graph_for_region(region).await?;
    info!("serving {initial:?}");
    let graph = Arc::new(ArcSwap::from_pointee(initial));

    let producer = InvalidationProducer::new(&config.broker)?;
    let service = Arc::new(GraphUpdateService::new(graph, store, Some(producer)));
    let consumer = UpdateConsumer::new(&config.broker, service)?;

    let task = tokio::spawn(async move { consumer.run().await });

    tokio::signal::ctrl_c().await.expect("signal handler");
    info!("interrupt received; draining for {SHUTDOWN_GRACE:?}");
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    task.abort();

    Ok(())
}
