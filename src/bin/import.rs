use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use log::warn;

use lorry::import::{Extract, Importer};
use lorry::store::SpatialStore;
use lorry::Config;

/// Runs the two-pass extract import against the spatial store.
#[derive(Parser, Debug)]
#[command(name = "import", about = "Import a raw map extract into the routing tables")]
struct Args {
    /// Path to the `.osm.pbf` extract.
    extract: PathBuf,
}

#[tokio::main]
async fn main() -> lorry::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let store = Arc::new(SpatialStore::connect(&config.store).await?);
    let importer = Arc::new(Importer::new(store));
    let extract = Extract::open(&args.extract)?;

    tokio::select! {
        result = importer.run(&extract) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; partial progress is preserved, re-run to continue");
        }
    }

    Ok(())
}
