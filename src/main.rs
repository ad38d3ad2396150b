//! postfeed - RSS feeds for a rendered blog, one per language.

#![allow(dead_code)]

mod cli;
mod config;
mod feed;
mod logger;
mod post;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Err(e) = run(&cli) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SiteConfig::load(cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_feeds(&config).map(|_| ()),
        Commands::Check { json, .. } => cli::check::check_feeds(&config, *json),
    }
}
