use anyhow::{Context, Result};
use clap::Parser;

use crime_stats::config::{OutputFormat, Settings};
use crime_stats::{pipeline, report};

fn main() -> Result<()> {
    env_logger::init();

    let settings = Settings::parse();
    let format = settings.format;
    let config = settings.into_config().context("invalid configuration")?;
    log::info!(
        "Crime Stats v{} reading {}",
        env!("CARGO_PKG_VERSION"),
        config.sources.incidents.display()
    );

    let analysis = pipeline::run(&config).context("summarising crime data")?;

    let output = match format {
        OutputFormat::Table => report::render_tables(&analysis)?,
        OutputFormat::Json => report::render_json(&analysis)?,
    };
    println!("{output}");
    Ok(())
}
