use std::time::Duration;

use anyhow::Result;
use cityroads::{OverpassSource, Pipeline, Settings, load_cities};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::FetchArgs) -> Result<()> {
    let cities = load_cities(&args.input, &args.encoding)?;
    info!(count = cities.len(), input = %args.input.display(), "loaded cities");

    let source = OverpassSource::new(
        args.overpass_url.as_str(),
        args.network_type.into(),
        args.timeout_secs,
        args.max_query_area,
    )?;
    let settings = Settings {
        output_dir: args.output.clone(),
        log_name: args.log_name.clone(),
        tolerance: args.tolerance,
        delay: Duration::from_secs(args.delay_secs),
    };

    let summary = Pipeline::new(source, settings).run(&cities)?;
    eprintln!(
        "[fetch] {} processed ({} ok, {} failed), {} skipped",
        summary.processed, summary.succeeded, summary.failed, summary.skipped,
    );
    Ok(())
}
