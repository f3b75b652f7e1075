// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Offset Index - Read-only snapshots
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// An `IndexSnapshot` is a point-in-time view of a generation's committed
// entries. Matches come back ordered by insertion timestamp (offset breaks
// ties), and the full offset list lets callers infer where each record ends.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tantivy::collector::DocSetCollector;
use tantivy::query::Query;
use tantivy::schema::Value;
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, Searcher, TantivyDocument};
use tracing::debug;

use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};
use crate::schema::{register_tokenizers, tokenizer_manager, Analyzer, IndexSchema, FIELD_OFFSET};
use crate::store::index_exists;

/// Parse `expression` without touching any index, so syntax errors surface
/// before a caller has produced output.
pub fn parse_query(expression: &str, analyzer: Analyzer) -> IndexResult<Box<dyn Query>> {
    let schema = IndexSchema::build(analyzer);
    schema
        .query_parser(tokenizer_manager())
        .parse_query(expression)
        .map_err(|e| IndexError::QuerySyntax {
            expression: expression.to_string(),
            reason: e.to_string(),
        })
}

/// Open `path` read-only and run `expression` against it.
pub fn query(path: impl AsRef<Path>, expression: &str) -> IndexResult<IndexMatches> {
    IndexSnapshot::open(path)?.query(expression)
}

/// A read-only, point-in-time view of an offset index.
pub struct IndexSnapshot {
    path: PathBuf,
    index: Index,
    schema: IndexSchema,
    searcher: Searcher,
    // Keeps the searcher's segments pinned.
    _reader: IndexReader,
}

impl IndexSnapshot {
    /// Open the committed state of the index at `path`.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !index_exists(&path) {
            return Err(IndexError::NotFound(path));
        }

        let index = Index::open_in_dir(&path).map_err(|e| IndexError::from_tantivy(&path, e))?;
        register_tokenizers(&index);
        let schema =
            IndexSchema::from_schema(index.schema()).map_err(|e| IndexError::from_tantivy(&path, e))?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::from_tantivy(&path, e))?;
        let searcher = reader.searcher();

        Ok(Self {
            path,
            index,
            schema,
            searcher,
            _reader: reader,
        })
    }

    /// Number of committed entries in this snapshot.
    pub fn num_entries(&self) -> u64 {
        self.searcher.num_docs()
    }

    /// Run a query expression. Bare terms search `record_id` and `message`.
    pub fn query(&self, expression: &str) -> IndexResult<IndexMatches> {
        let parser = self.schema.query_parser(self.index.tokenizers().clone());
        let parsed = parser
            .parse_query(expression)
            .map_err(|e| IndexError::QuerySyntax {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;
        self.search(parsed.as_ref())
    }

    /// Run an already parsed query.
    pub fn search(&self, query: &dyn Query) -> IndexResult<IndexMatches> {
        let addresses = self
            .searcher
            .search(query, &DocSetCollector)
            .map_err(|e| IndexError::from_tantivy(&self.path, e))?;

        let mut entries = addresses
            .into_iter()
            .map(|address| self.load_entry(address))
            .collect::<IndexResult<Vec<_>>>()?;
        entries.sort_by_key(|e| (e.timestamp_millis, e.offset));

        debug!(
            path = %self.path.display(),
            matches = entries.len(),
            "Queried offset index"
        );

        Ok(IndexMatches {
            entries: entries.into_iter(),
        })
    }

    /// Every committed record start offset, ascending.
    ///
    /// This is the full, unfiltered ordering of the generation's records;
    /// the record beginning at `offsets[i]` ends where `offsets[i + 1]`
    /// begins.
    pub fn offsets(&self) -> IndexResult<Vec<u64>> {
        let mut offsets = Vec::with_capacity(self.searcher.num_docs() as usize);
        for segment in self.searcher.segment_readers() {
            let column = segment
                .fast_fields()
                .u64(FIELD_OFFSET)
                .map_err(|e| IndexError::from_tantivy(&self.path, e))?;
            for doc in segment.doc_ids_alive() {
                if let Some(offset) = column.first(doc) {
                    offsets.push(offset);
                }
            }
        }
        offsets.sort_unstable();
        Ok(offsets)
    }

    /// The index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entry(&self, address: DocAddress) -> IndexResult<IndexEntry> {
        let doc: TantivyDocument = self
            .searcher
            .doc(address)
            .map_err(|e| IndexError::from_tantivy(&self.path, e))?;

        let record_id = doc
            .get_first(self.schema.record_id)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let offset = doc
            .get_first(self.schema.offset)
            .and_then(|v| v.as_u64())
            .ok_or(IndexError::MalformedEntry("offset"))?;
        let timestamp_millis = doc
            .get_first(self.schema.timestamp)
            .and_then(|v| v.as_u64())
            .ok_or(IndexError::MalformedEntry("timestamp_millis"))?;
        let fields = match doc
            .get_first(self.schema.fields_stored)
            .and_then(|v| v.as_str())
        {
            Some(json) => serde_json::from_str(json)?,
            None => BTreeMap::new(),
        };

        Ok(IndexEntry {
            record_id,
            offset,
            timestamp_millis,
            message: None,
            fields,
        })
    }
}

/// Matching entries of one query, ordered by timestamp ascending.
///
/// Finite and consumed once; run the query again for a fresh sequence.
#[derive(Debug)]
pub struct IndexMatches {
    entries: std::vec::IntoIter<IndexEntry>,
}

impl Iterator for IndexMatches {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for IndexMatches {}
