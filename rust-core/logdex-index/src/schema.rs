// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Tantivy schema for offset indexes and the analyzer choice baked into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tantivy::query::QueryParser;
use tantivy::schema::{
    Field, IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, TextOptions, FAST,
    INDEXED, STORED, STRING,
};
use tantivy::tokenizer::{TextAnalyzer, TokenizerManager, WhitespaceTokenizer};
use tantivy::Index;

pub const FIELD_RECORD_ID: &str = "record_id";
pub const FIELD_OFFSET: &str = "offset";
pub const FIELD_TIMESTAMP: &str = "timestamp_millis";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_FIELDS: &str = "fields";
/// Stored-only JSON copy of the custom fields, read back verbatim.
pub const FIELD_FIELDS_STORED: &str = "fields_stored";

const WHITESPACE_TOKENIZER: &str = "whitespace";

/// Tokenization applied to the message and custom fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    /// Split on whitespace, keep case and punctuation.
    #[default]
    Whitespace,
    /// The whole value is a single token.
    Raw,
    /// Tantivy's default tokenizer: split on non-alphanumerics, lower-case.
    Default,
}

impl Analyzer {
    /// Name of the Tantivy tokenizer this analyzer maps to.
    pub fn tokenizer_name(self) -> &'static str {
        match self {
            Analyzer::Whitespace => WHITESPACE_TOKENIZER,
            Analyzer::Raw => "raw",
            Analyzer::Default => "default",
        }
    }
}

impl fmt::Display for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Analyzer::Whitespace => "whitespace",
            Analyzer::Raw => "raw",
            Analyzer::Default => "default",
        };
        f.write_str(name)
    }
}

impl FromStr for Analyzer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whitespace" => Ok(Analyzer::Whitespace),
            "raw" | "keyword" => Ok(Analyzer::Raw),
            "default" | "simple" => Ok(Analyzer::Default),
            other => Err(format!("unknown analyzer: {other}")),
        }
    }
}

/// Tokenizer manager with every analyzer the schema may reference.
pub fn tokenizer_manager() -> TokenizerManager {
    let manager = TokenizerManager::default();
    manager.register(
        WHITESPACE_TOKENIZER,
        TextAnalyzer::from(WhitespaceTokenizer::default()),
    );
    manager
}

/// Register the analyzers on an opened index. Indexes created with a custom
/// tokenizer name cannot be written or queried without this.
pub(crate) fn register_tokenizers(index: &Index) {
    index.tokenizers().register(
        WHITESPACE_TOKENIZER,
        TextAnalyzer::from(WhitespaceTokenizer::default()),
    );
}

/// Resolved field handles for an offset index.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    pub(crate) record_id: Field,
    pub(crate) offset: Field,
    pub(crate) timestamp: Field,
    pub(crate) message: Field,
    pub(crate) fields: Field,
    pub(crate) fields_stored: Field,
    pub(crate) schema: Schema,
}

impl IndexSchema {
    /// Build a fresh schema whose text fields use `analyzer`.
    pub fn build(analyzer: Analyzer) -> Self {
        let mut builder = Schema::builder();

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(analyzer.tokenizer_name())
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);

        let record_id = builder.add_text_field(FIELD_RECORD_ID, STRING | STORED);
        let offset = builder.add_u64_field(FIELD_OFFSET, INDEXED | STORED | FAST);
        let timestamp = builder.add_u64_field(FIELD_TIMESTAMP, INDEXED | STORED | FAST);
        let message = builder.add_text_field(
            FIELD_MESSAGE,
            TextOptions::default().set_indexing_options(text_indexing.clone()),
        );
        let fields = builder.add_json_field(
            FIELD_FIELDS,
            JsonObjectOptions::default().set_indexing_options(text_indexing),
        );
        let fields_stored = builder.add_text_field(FIELD_FIELDS_STORED, STORED);
        let schema = builder.build();

        Self {
            record_id,
            offset,
            timestamp,
            message,
            fields,
            fields_stored,
            schema,
        }
    }

    /// Resolve field handles from an existing index's schema.
    ///
    /// Fails with a Tantivy schema error when a field is missing, which the
    /// caller classifies as a corrupt index.
    pub fn from_schema(schema: Schema) -> tantivy::Result<Self> {
        Ok(Self {
            record_id: schema.get_field(FIELD_RECORD_ID)?,
            offset: schema.get_field(FIELD_OFFSET)?,
            timestamp: schema.get_field(FIELD_TIMESTAMP)?,
            message: schema.get_field(FIELD_MESSAGE)?,
            fields: schema.get_field(FIELD_FIELDS)?,
            fields_stored: schema.get_field(FIELD_FIELDS_STORED)?,
            schema,
        })
    }

    /// The underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Query parser searching `record_id` and `message` for bare terms.
    pub fn query_parser(&self, tokenizers: TokenizerManager) -> QueryParser {
        QueryParser::new(
            self.schema.clone(),
            vec![self.record_id, self.message],
            tokenizers,
        )
    }
}
