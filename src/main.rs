use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3wal::app::{self, Request};
use m3wal::cli::Args;
use m3wal::config::{ConfigFile, RunConfig};
use m3wal::pipeline::generate::MaterialGenerator;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => ConfigFile::default_path()?,
    };
    let file = ConfigFile::load_or_create(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let config = RunConfig::resolve(file, args.overrides())?;
    tracing::debug!(?config, "resolved config");

    let request = Request {
        wallpaper: args.wallpaper.clone(),
        json_output: args.output.clone(),
    };
    let summary = app::run(&config, &request, &MaterialGenerator, &mut io::stdout().lock())?;

    let generated = summary.templates.iter().filter(|r| r.outcome.is_done()).count();
    if generated > 0 {
        println!("\n✨ Generated {generated} config files");
    }
    if summary.failures() > 0 {
        eprintln!("{} step(s) failed, see above", summary.failures());
    }
    Ok(())
}
