pub mod audit;
pub mod audit_cmd;
pub mod clean;
pub mod cli;
pub mod config;
pub mod context;
pub mod data;
pub mod dates;
pub mod discover;
pub mod engine;
pub mod error;
pub mod frame;
pub mod header;
pub mod io_utils;
pub mod normalize;
pub mod profile;
pub mod profile_cmd;
pub mod report;
pub mod runlog;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::{Cli, Commands, ReadOptions},
    config::CleanConfig,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_tidy", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Profile(args) => profile_cmd::execute(&args),
        Commands::Audit(args) => audit_cmd::execute(&args),
    }
}

/// Config file (if any) with command-line overrides applied.
pub(crate) fn load_config(options: &ReadOptions) -> Result<CleanConfig> {
    let mut config = CleanConfig::load_or_default(options.config.as_deref())?;
    if let Some(sample_rows) = options.sample_rows {
        config.profile_sample_rows = sample_rows;
    }
    debug!("Effective configuration: {config:?}");
    Ok(config)
}
