// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! `logdex generations`: show what is on disk.

use std::io::Write;

use logdex_generations::{GenerationLayout, GenerationSet};
use logdex_index::IndexSnapshot;
use logdex_query::SearchConfig;

pub fn run(config: &SearchConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let set = GenerationSet::new(GenerationLayout::new(&config.log_path), config.max_backup_index);
    writeln!(out, "{:>4}  {:>12}  {:>10}  {}", "gen", "log bytes", "entries", "log file")?;
    for info in set.list()? {
        if info.is_absent() {
            continue;
        }
        let size = info
            .log_size
            .map_or_else(|| "missing".to_string(), |s| s.to_string());
        let entries = if info.index_exists {
            match IndexSnapshot::open(&info.index_path) {
                Ok(snapshot) => snapshot.num_entries().to_string(),
                Err(err) => format!("error: {err}"),
            }
        } else {
            "missing".to_string()
        };
        writeln!(
            out,
            "{:>4}  {:>12}  {:>10}  {}",
            info.generation,
            size,
            entries,
            info.log_path.display()
        )?;
    }
    Ok(())
}
