use std::path::PathBuf;

use clap::Parser;
use dotenv::dotenv;
use log::error;

use lorry::geo::Bounds;
use lorry::store::SpatialStore;
use lorry::viz::{self, OutputFormat, VizOptions, VizScope};
use lorry::Config;

/// Renders a slice of the road network for operator debugging.
#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render part of the road network via graphviz")]
struct Args {
    /// Where to write the rendered image.
    #[arg(long)]
    output: PathBuf,

    /// png, svg or pdf.
    #[arg(long, default_value = "png")]
    format: String,

    /// Cap on rendered nodes.
    #[arg(long, default_value_t = 5_000)]
    max_nodes: i64,

    /// Scope by region, as "lat1,lon1,lat2,lon2".
    #[arg(long)]
    region: Option<String>,

    /// Scope by zip code instead of a region.
    #[arg(long)]
    zip: Option<String>,

    /// Radius in miles around --zip.
    #[arg(long, default_value_t = 10.0)]
    radius: f64,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let format: OutputFormat = match args.format.parse() {
        Ok(format) => format,
        Err(_) => fatal(format!(
            "unsupported --format {:?}; expected png, svg or pdf",
            args.format
        )),
    };

    let scope = match (&args.region, &args.zip) {
        (Some(region), _) => match region.parse::<Bounds>() {
            Ok(bounds) => VizScope::Region(bounds),
            Err(reason) => fatal(format!("invalid --region: {reason}")),
        },
        (None, Some(zip)) => VizScope::Zip {
            code: zip.clone(),
            radius_miles: args.radius,
        },
        (None, None) => fatal("either --region or --zip must be provided".to_string()),
    };

    let options = VizOptions {
        output: args.output,
        format,
        max_nodes: args.max_nodes,
        scope,
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => fatal(e.to_string()),
    };

    let store = match SpatialStore::connect(&config.store).await {
        Ok(store) => store,
        Err(e) => fatal(format!("spatial store unreachable: {e}")),
    };

    if let Err(e) = viz::render(&store, &options).await {
        fatal(e.to_string());
    }
}

fn fatal(message: String) -> ! {
    error!("{message}");
    eprintln!("visualize: {message}");
    std::process::exit(1);
}
