// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! `logdex ingest`: append stdin lines as indexed records.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use logdex_appender::{
    AppenderConfig, AppenderStatsSnapshot, Committer, IndexedAppender, LogRecord, MessageFieldHook,
};
use tracing::info;

use crate::args::IngestArgs;

/// Build the record for one input line.
///
/// `KEY=value` tokens become context values; the one named `id_key`
/// identifies the record.
pub fn parse_line(line: &str, id_key: &str, fallback_id: &str) -> LogRecord {
    let mut record = LogRecord::new(format!("{line}\n"));
    for token in line.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            if !key.is_empty() && !value.is_empty() {
                record = record.with_context(key, value);
            }
        }
    }
    let id = record
        .context
        .get(id_key)
        .cloned()
        .unwrap_or_else(|| fallback_id.to_string());
    record.with_context_id(id)
}

/// Append every line of `input`, committing in the background and once more
/// at the end.
pub async fn run<R>(config: AppenderConfig, args: &IngestArgs, input: R) -> anyhow::Result<AppenderStatsSnapshot>
where
    R: BufRead + Send + 'static,
{
    let log_path = config.log_path.clone();
    let builder = IndexedAppender::builder(config);
    let builder = if args.message {
        builder.field_hook(MessageFieldHook)
    } else {
        builder
    };
    let appender = Arc::new(
        builder
            .open()
            .with_context(|| format!("opening {}", log_path.display()))?,
    );
    let committer = Committer::start(appender.clone());

    let writer = appender.clone();
    let id_key = args.id_key.clone();
    let fallback = args.record_id.clone();
    let appended = tokio::task::spawn_blocking(move || -> anyhow::Result<u64> {
        let mut count = 0;
        for line in input.lines() {
            let line = line.context("reading input")?;
            writer.append_record(&parse_line(&line, &id_key, &fallback))?;
            count += 1;
        }
        Ok(count)
    })
    .await
    .context("ingest task failed")?;

    committer.shutdown().await?;
    appender.close()?;
    let appended = appended?;

    let stats = appender.stats();
    info!(
        appended,
        indexed = stats.indexed,
        rotations = stats.rotations,
        "Ingest finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::LocationArgs;
    use logdex_query::{RangeQueryEngine, SearchConfig};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn ingest_args(message: bool) -> IngestArgs {
        IngestArgs {
            location: LocationArgs::default(),
            record_id: "ingest".to_string(),
            id_key: "id".to_string(),
            message,
            max_file_size: None,
            flush_interval_millis: None,
            analyzer: None,
            truncate: false,
        }
    }

    #[test]
    fn test_parse_line_picks_identifier() {
        let record = parse_line("login id=sess7 user=bob", "id", "fallback");
        assert_eq!(record.context_id.as_deref(), Some("sess7"));
        assert_eq!(record.context.get("user").map(String::as_str), Some("bob"));
        assert_eq!(record.body, b"login id=sess7 user=bob\n");

        let plain = parse_line("no tokens here", "id", "fallback");
        assert_eq!(plain.context_id.as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn test_ingest_then_search() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("app.log");
        let config = AppenderConfig::new(&log_path).with_max_file_size(40);
        let input = Cursor::new("start id=r1\nwork id=r2 user=ann\nmore id=r1\nend id=r3\n");

        let stats = run(config, &ingest_args(true), input).await.unwrap();
        assert_eq!(stats.records, 4);
        assert_eq!(stats.indexed, 4);
        assert!(stats.rotations >= 1);

        let engine = RangeQueryEngine::new(SearchConfig::new(&log_path).with_max_backup_index(1));
        let outcome = engine.search("fields.user:ann").unwrap();
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].text, "work id=r2 user=ann\n");
    }
}
