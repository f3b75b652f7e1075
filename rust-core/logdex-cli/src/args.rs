// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logdex_index::Analyzer;
use logdex_query::Charset;

/// logdex - keyword search over rotating log files, resolved to byte ranges.
#[derive(Parser, Debug)]
#[command(name = "logdex", version, about)]
pub struct Cli {
    /// TOML configuration file with `[appender]` and `[search]` sections.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the log records matching a query.
    Search(SearchArgs),
    /// Append lines from stdin as indexed log records.
    Ingest(IngestArgs),
    /// List the generations on disk.
    Generations(GenerationArgs),
}

/// Options shared by every command that locates generations.
#[derive(Args, Debug, Default)]
pub struct LocationArgs {
    /// Live log file; generations are named after it.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Highest frozen generation kept.
    #[arg(long)]
    pub max_backup_index: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query expression, e.g. `session42` or `fields.user:alice`.
    pub expression: String,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Character set of the log files.
    #[arg(long)]
    pub charset: Option<Charset>,

    /// Only scan these generations, in this order.
    #[arg(long = "generation", short = 'g')]
    pub generations: Vec<u32>,

    /// Print file banners around each generation's hits.
    #[arg(long)]
    pub debug: bool,

    /// Print hits as JSON lines instead of raw text.
    #[arg(long, conflicts_with = "debug")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Record identifier for lines without an identifier token.
    #[arg(long, default_value = "ingest")]
    pub record_id: String,

    /// `KEY=value` token whose value identifies the record.
    #[arg(long, default_value = "id")]
    pub id_key: String,

    /// Also index the line text and its `KEY=value` tokens.
    #[arg(long)]
    pub message: bool,

    /// Live file size that triggers rotation, in bytes.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Background commit period, in milliseconds.
    #[arg(long)]
    pub flush_interval_millis: Option<u64>,

    /// Analyzer for newly created indexes.
    #[arg(long)]
    pub analyzer: Option<Analyzer>,

    /// Truncate the live generation instead of appending to it.
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Args, Debug)]
pub struct GenerationArgs {
    #[command(flatten)]
    pub location: LocationArgs,
}
