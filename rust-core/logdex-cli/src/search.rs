// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! `logdex search`: print matching records.

use std::io::Write;
use std::process::ExitCode;

use colored::Colorize;
use logdex_query::{QueryError, RangeHit, RangeQueryEngine, SearchConfig};

use crate::args::SearchArgs;

const BANNER: &str = "******************";
const LAST_RECORD_NOTICE: &str = "This is the last record of the log file so printing until EOF";
const ROLLED_OVER_WARNING: &str =
    "WARNING: log file has been rolled over! Don't trust the search results and re-run the query";

/// Exit status when a rotation interrupted the scan.
pub const EXIT_STALE: u8 = 3;

pub fn run(config: SearchConfig, args: &SearchArgs, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let engine = RangeQueryEngine::new(config);
    let result = if args.generations.is_empty() {
        engine.search(&args.expression)
    } else {
        engine.search_generations(&args.expression, args.generations.iter().copied())
    };

    match result {
        Ok(outcome) => {
            render(&engine, &outcome.hits, args, out)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(QueryError::StaleScan { partial, .. }) => {
            render(&engine, &partial, args, out)?;
            writeln!(out)?;
            for _ in 0..10 {
                writeln!(out, "***************************")?;
            }
            writeln!(out, "{}", ROLLED_OVER_WARNING.yellow().bold())?;
            Ok(ExitCode::from(EXIT_STALE))
        }
        Err(err) => Err(err.into()),
    }
}

fn render(
    engine: &RangeQueryEngine,
    hits: &[RangeHit],
    args: &SearchArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if args.json {
        for hit in hits {
            serde_json::to_writer(&mut *out, hit)?;
            writeln!(out)?;
        }
        return Ok(());
    }

    for group in hits.chunk_by(|a, b| a.generation == b.generation) {
        let log = engine.generations().layout().log_path(group[0].generation);
        if args.debug {
            writeln!(out)?;
            writeln!(out, "{BANNER} Start of File: {} {BANNER}", log.display())?;
            writeln!(out)?;
        }
        for hit in group {
            if hit.last_record {
                writeln!(out, "{LAST_RECORD_NOTICE}")?;
            }
            write!(out, "{}", hit.text)?;
        }
        if args.debug {
            writeln!(out)?;
            writeln!(out, "{BANNER} End of File: {} {BANNER}", log.display())?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
