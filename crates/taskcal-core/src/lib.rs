pub mod cli;
pub mod commands;
pub mod config;
pub mod events;
pub mod import;
pub mod normalize;
pub mod render;
pub mod section;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting taskcal");

    let cfg = config::Config::load(cli.config.as_deref())?;
    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let mut store = store::Store::open(&data_dir)?;
    let mut renderer = render::Renderer::new(&cfg)?;

    commands::dispatch(&mut store, &mut renderer, cli.command)
}
