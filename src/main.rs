//! regrid - resample gridded fields onto target points
//!
//! This is the batch entry point: it reads one JSON request, resamples all
//! of its fields with a shared interpolator and writes the result as JSON.

use anyhow::Context;
use tracing::{error, info};

use regrid::{init_tracing, log_error, Config, InterpolatorCache, RegridRequest};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, args) = Config::load().context("Failed to load configuration")?;

    init_tracing(&config.log_level);
    info!("Starting regrid v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let method = config.method()?;
    let options = config.build_options()?;

    info!("Reading request: {:?}", args.request);
    let text = std::fs::read_to_string(&args.request)
        .with_context(|| format!("Failed to read request {}", args.request.display()))?;
    let request = RegridRequest::from_json(&text)?;

    info!(
        method = %method,
        fields = request.fields.len(),
        targets = request.targets.len(),
        "Resampling fields"
    );

    let mut cache = InterpolatorCache::new(options);
    let response = request
        .run(&mut cache, method, args.rotation)
        .map_err(|e| {
            log_error(&e, "regrid");
            e
        })?;

    let json = serde_json::to_string_pretty(&response)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
