// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! logdex command line binary
//!
//! `search` prints the byte ranges of matching records, `ingest` appends
//! stdin lines through an indexed appender, `generations` lists what is on
//! disk. Diagnostics go to stderr, results to stdout.

mod args;
mod config;
mod generations;
mod ingest;
mod search;

use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;

use args::{Cli, Command};
use config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Search(args) => {
            let search = config.search_config(&args);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            search::run(search, &args, &mut out)
        }
        Command::Ingest(args) => {
            let appender = config.appender_config(&args);
            let input = BufReader::new(io::stdin());
            ingest::run(appender, &args, input).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Generations(args) => {
            let location = config.location_config(&args.location);
            generations::run(&location, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
