//! In-memory full-text index over flattened control records.
//!
//! Each record is indexed on its title, full text and joined group path.
//! Query tokens match indexed tokens by prefix and by bounded edit distance
//! at the same time; all tokens must match. The index is rebuilt from
//! scratch for every record set and never persisted.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};
use tracing::{debug, info};

use crate::types::{ControlRecord, ParseOutcome};
use crate::{Error, Result};

/// Analyzer for every searchable field. Unlike tantivy's `default`, it keeps
/// tokens of any length so long compound words stay searchable.
const TEXT_ANALYZER: &str = "gsx_text";

/// Separator used when indexing a group path as one text field.
pub const GROUP_PATH_SEPARATOR: &str = " / ";

/// Allowed edit distance as a fraction of the query token length.
const FUZZY_RATIO: f64 = 0.2;

/// Largest edit distance the automaton supports.
const MAX_EDIT_DISTANCE: u8 = 2;

const TITLE_BOOST: f32 = 2.0;

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// A ranked match returned by [`SearchIndex::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Record id; resolve the full record through the live record set
    pub id: String,
    pub score: f32,
    /// Position of the record in the indexed set
    pub ordinal: usize,
}

/// Optional restrictions applied to a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Case-insensitive substring of the joined group path
    pub group: Option<String>,
    /// Maximum number of hits
    pub limit: Option<usize>,
}

impl SearchFilters {
    /// Filter on a group path substring; blank input means no filter.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.group = if group.trim().is_empty() {
            None
        } else {
            Some(group)
        };
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Fuzzy/prefix search over one record set.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    id_field: Field,
    title_field: Field,
    full_text_field: Field,
    group_path_field: Field,
    ordinal_field: Field,
    num_records: usize,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("num_records", &self.num_records)
            .finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Build an index over `records`.
    pub fn build(records: &[ControlRecord]) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let id_field = schema_builder.add_text_field("id", STRING | STORED);
        let title_field = schema_builder.add_text_field("title", searchable_text());
        let full_text_field = schema_builder.add_text_field("full_text", searchable_text());
        let group_path_field =
            schema_builder.add_text_field("group_path", searchable_text().set_stored());
        let ordinal_field = schema_builder.add_u64_field("ordinal", STORED);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        index.tokenizers().register(TEXT_ANALYZER, text_analyzer());
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        for (ordinal, record) in records.iter().enumerate() {
            let doc = doc!(
                id_field => record.id.as_str(),
                title_field => record.title.as_str(),
                full_text_field => record.full_text.as_str(),
                group_path_field => record.joined_path(GROUP_PATH_SEPARATOR),
                ordinal_field => ordinal as u64
            );
            writer
                .add_document(doc)
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        info!("Indexed {} control records", records.len());

        Ok(Self {
            index,
            reader,
            id_field,
            title_field,
            full_text_field,
            group_path_field,
            ordinal_field,
            num_records: records.len(),
        })
    }

    /// Number of indexed records.
    pub const fn len(&self) -> usize {
        self.num_records
    }

    pub const fn is_empty(&self) -> bool {
        self.num_records == 0
    }

    /// Run a query.
    ///
    /// A blank query matches every record. Hits are ordered by descending
    /// score; equal scores keep catalog order.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<SearchHit>> {
        if self.num_records == 0 {
            return Ok(Vec::new());
        }

        let Some(tantivy_query) = self.build_query(query)? else {
            debug!("query '{query}' produced no tokens");
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(self.num_records))
            .map_err(|e| Error::Index(format!("Search failed: {e}")))?;

        let group_needle = filters.group.as_deref().map(str::to_lowercase);
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;

            if let Some(needle) = &group_needle {
                let path = self.field_text(&doc, self.group_path_field)?;
                if !path.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }

            let ordinal = doc
                .get_first(self.ordinal_field)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| Error::Index("Ordinal not found in document".into()))?;

            hits.push(SearchHit {
                id: self.field_text(&doc, self.id_field)?,
                score,
                ordinal: usize::try_from(ordinal)
                    .map_err(|e| Error::Index(format!("Invalid ordinal: {e}")))?,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        });
        if let Some(limit) = filters.limit {
            hits.truncate(limit);
        }

        debug!("Found {} hits for query '{query}'", hits.len());
        Ok(hits)
    }

    /// `None` when a non-blank query yields no searchable tokens.
    fn build_query(&self, query: &str) -> Result<Option<Box<dyn Query>>> {
        if query.trim().is_empty() {
            return Ok(Some(Box::new(AllQuery)));
        }

        let tokens = self.tokenize(query)?;
        if tokens.is_empty() {
            return Ok(None);
        }

        let per_token: Vec<(Occur, Box<dyn Query>)> = tokens
            .iter()
            .map(|token| (Occur::Must, self.token_query(token)))
            .collect();
        Ok(Some(Box::new(BooleanQuery::new(per_token))))
    }

    /// Any field may satisfy the token by prefix, edit distance or exact match.
    fn token_query(&self, token: &str) -> Box<dyn Query> {
        let distance = edit_distance_for(token);
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for field in [self.title_field, self.full_text_field, self.group_path_field] {
            let term = Term::from_field_text(field, token);
            let fuzzy: Box<dyn Query> =
                Box::new(FuzzyTermQuery::new_prefix(term.clone(), distance, true));
            let exact: Box<dyn Query> =
                Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));

            if field == self.title_field {
                clauses.push((Occur::Should, Box::new(BoostQuery::new(fuzzy, TITLE_BOOST))));
                clauses.push((Occur::Should, Box::new(BoostQuery::new(exact, TITLE_BOOST))));
            } else {
                clauses.push((Occur::Should, fuzzy));
                clauses.push((Occur::Should, exact));
            }
        }

        Box::new(BooleanQuery::new(clauses))
    }

    /// Split query text the same way indexed text is split.
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.full_text_field)?;
        Ok(tokenize_with(&mut analyzer, text))
    }

    fn field_text(&self, doc: &TantivyDocument, field: Field) -> Result<String> {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string)
            .ok_or_else(|| Error::Index("Field not found in document".into()))
    }
}

fn text_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .build()
}

fn searchable_text() -> TextOptions {
    TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(TEXT_ANALYZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    )
}

fn tokenize_with(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut stream = analyzer.token_stream(text);
    stream.process(&mut |token| tokens.push(token.text.clone()));
    tokens
}

/// Edit distance allowed for a query token.
fn edit_distance_for(token: &str) -> u8 {
    let scaled = (token.chars().count() as f64 * FUZZY_RATIO).round();
    if scaled >= f64::from(MAX_EDIT_DISTANCE) {
        MAX_EDIT_DISTANCE
    } else if scaled >= 1.0 {
        1
    } else {
        0
    }
}

/// A search hit resolved against its record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRecord<'a> {
    pub record: &'a ControlRecord,
    pub score: f32,
}

/// Records, parse warnings and the index built over them.
///
/// Replaced wholesale whenever a new payload is parsed.
#[derive(Debug)]
pub struct CatalogSession {
    records: Vec<ControlRecord>,
    warnings: Vec<String>,
    by_id: HashMap<String, usize>,
    index: SearchIndex,
}

impl CatalogSession {
    /// Index the records of a parse outcome.
    pub fn new(outcome: ParseOutcome) -> Result<Self> {
        let index = SearchIndex::build(&outcome.controls)?;
        let by_id = outcome
            .controls
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id.clone(), i))
            .collect();
        Ok(Self {
            records: outcome.controls,
            warnings: outcome.warnings,
            by_id,
            index,
        })
    }

    pub fn records(&self) -> &[ControlRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Query the index and resolve hits to records.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<RankedRecord<'_>>> {
        let hits = self.index.search(query, filters)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                self.records.get(hit.ordinal).map(|record| RankedRecord {
                    record,
                    score: hit.score,
                })
            })
            .collect())
    }

    /// Look a record up by id; with duplicate ids the last one wins.
    pub fn get(&self, id: &str) -> Option<&ControlRecord> {
        self.by_id.get(id).and_then(|&i| self.records.get(i))
    }

    /// Records for `ids` in the given order, skipping unknown ids.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&ControlRecord> {
        ids.iter().filter_map(|id| self.get(id.as_ref())).collect()
    }

    /// Distinct group path segments, sorted.
    pub fn groups(&self) -> Vec<&str> {
        self.records
            .iter()
            .flat_map(|record| record.group_path.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
