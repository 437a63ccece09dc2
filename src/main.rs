use anyhow::{Context, Result};
use clap::Parser;
use confique::Config;
use niadc::{SessionConfig, Status};
use simplelog::{LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Analog data-acquisition sessions streamed to CSV")]
struct Args {
    /// Path to the session config file.
    #[arg(short, long, default_value = "niadc.toml")]
    config: PathBuf,

    /// Log file path; the TUI owns the terminal, so logs go to a file.
    #[arg(long, default_value = "niadc.log")]
    log_file: PathBuf,

    /// Print an annotated config template and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.dump_config {
        print!(
            "{}",
            confique::toml::template::<SessionConfig>(confique::toml::FormatOptions::default())
        );
        return Ok(());
    }

    WriteLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("creating log file {}", args.log_file.display()))?,
    )?;

    let config = SessionConfig::builder()
        .env()
        .file(&args.config)
        .load()
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    config.validate()?;

    let mut terminal = ratatui::init();
    let result = Status::new(config).run(&mut terminal);
    ratatui::restore();
    result
}
