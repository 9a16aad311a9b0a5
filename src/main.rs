use anyhow::{Context, Result};
use clap::Parser;
use pendulum::{PngPlotter, SignalReducer, config::Config};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Dataset description (TOML).
    #[arg(long)]
    config: PathBuf,

    /// Overrides `output.plot_file`.
    #[arg(long)]
    plot_file: Option<PathBuf>,

    /// Overrides `output.table_file`.
    #[arg(long)]
    table_file: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to construct cfg")?;
    log::info!("{cfg:#?}");

    let cycle = cfg.cycle_analysis().context("failed to construct cycle")?;
    let plot_file = args.plot_file.unwrap_or(cfg.output.plot_file);
    let table_file = args.table_file.or(cfg.output.table_file);

    let mut reducer = SignalReducer::new(PngPlotter::new(plot_file), std::io::stdout().lock());
    let table = reducer
        .reduce(&cfg.location, &cfg.format, cycle.as_ref(), cfg.set_count)
        .context("failed to reduce dataset")?;

    if let Some(table_file) = table_file {
        table
            .save_csv(&table_file)
            .context("failed to save table")?;
        log::info!("wrote {table_file:?}");
    }

    Ok(())
}
