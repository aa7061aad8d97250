//! Catalog flattening.
//!
//! Turns an arbitrary JSON payload into a flat list of [`ControlRecord`]s,
//! accumulating the title path of enclosing groups and parent controls.
//! Malformed input never produces an error: problems are reported as
//! warnings next to whatever records could be recovered.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::extract::collect_text;
use crate::types::{Catalog, CatalogControl, CatalogGroup, ControlRecord, ParseOutcome};

/// Default limit for group and control nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const MISSING_ROOT: &str = "Missing \"catalog\" root property";
const INVALID_ROOT: &str = "Invalid catalog structure";
const MISSING_ID: &str = "Encountered control without ID; generated synthetic ID.";
const UNTITLED: &str = "Untitled control";

/// Source of synthetic ids for controls that lack one.
///
/// Called once per id-less control. Uniqueness against ids already present
/// in the payload is best effort only.
pub trait IdSource: Send + Sync {
    /// Produce the next synthetic id.
    fn next_id(&self) -> String;
}

/// UUID backed ids of the form `control-<11 base36 chars>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> String {
        const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut n = Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(11);
        for _ in 0..11 {
            suffix.push(char::from(ALPHABET[(n % 36) as usize]));
            n /= 36;
        }
        format!("control-{suffix}")
    }
}

/// Deterministic ids `control-1`, `control-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    next: AtomicU64,
}

impl SequentialIdSource {
    /// Start counting at 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("control-{n}")
    }
}

/// Flattens catalog payloads into control records.
pub struct CatalogParser {
    ids: Box<dyn IdSource>,
    max_depth: usize,
}

impl std::fmt::Debug for CatalogParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogParser")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Default for CatalogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogParser {
    /// Parser with random synthetic ids and the default depth limit.
    pub fn new() -> Self {
        Self::with_id_source(RandomIdSource)
    }

    /// Parser drawing synthetic ids from `ids`.
    pub fn with_id_source(ids: impl IdSource + 'static) -> Self {
        Self {
            ids: Box::new(ids),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit nesting of groups and controls; at least one level is always read.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Parse a decoded payload.
    pub fn parse(&self, payload: &Value) -> ParseOutcome {
        let Some(root) = payload.as_object() else {
            return ParseOutcome::failed(MISSING_ROOT);
        };
        let Some(catalog) = root.get("catalog") else {
            return ParseOutcome::failed(MISSING_ROOT);
        };
        if !catalog.is_object() {
            return ParseOutcome::failed(INVALID_ROOT);
        }

        let catalog: Catalog = match serde_json::from_value(catalog.clone()) {
            Ok(catalog) => catalog,
            Err(err) => {
                debug!("catalog object rejected: {err}");
                return ParseOutcome::failed(INVALID_ROOT);
            },
        };

        let outcome = self.flatten(catalog);
        debug!(
            records = outcome.controls.len(),
            warnings = outcome.warnings.len(),
            "flattened catalog"
        );
        outcome
    }

    /// Parse raw payload text; undecodable JSON becomes a warning.
    pub fn parse_str(&self, payload: &str) -> ParseOutcome {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => self.parse(&value),
            Err(err) => ParseOutcome::failed(format!("Invalid JSON payload: {err}")),
        }
    }

    fn flatten(&self, catalog: Catalog) -> ParseOutcome {
        let mut walk = Walk {
            parser: self,
            records: Vec::new(),
            warnings: Vec::new(),
        };
        walk.controls(catalog.controls, &[], 1);
        walk.groups(catalog.groups, &[], 1);
        ParseOutcome {
            controls: walk.records,
            warnings: walk.warnings,
        }
    }
}

/// State of one depth-first traversal.
struct Walk<'p> {
    parser: &'p CatalogParser,
    records: Vec<ControlRecord>,
    warnings: Vec<String>,
}

impl Walk<'_> {
    /// Flatten `controls`, which sit at nesting level `depth`.
    fn controls(&mut self, controls: Vec<CatalogControl>, path: &[String], depth: usize) {
        for mut control in controls {
            let children = std::mem::take(&mut control.controls);

            // Ids are kept byte for byte; only blank ones are replaced.
            let id = match control.id.as_deref().filter(|id| !id.trim().is_empty()) {
                Some(id) => id.to_string(),
                None => {
                    self.warnings.push(MISSING_ID.to_string());
                    self.parser.ids.next_id()
                },
            };
            let title = trimmed(control.title.as_deref()).map_or_else(
                || {
                    if id.is_empty() {
                        UNTITLED.to_string()
                    } else {
                        id.clone()
                    }
                },
                ToString::to_string,
            );

            let extracted = collect_text(&control);
            let full_text = if extracted.is_empty() {
                title.clone()
            } else {
                format!("{title} {extracted}")
            };

            let mut child_path = path.to_vec();
            child_path.push(title.clone());

            self.records.push(ControlRecord {
                id,
                title,
                group_path: path.to_vec(),
                full_text,
                control,
            });

            if children.is_empty() {
                continue;
            }
            if depth >= self.parser.max_depth {
                self.skip(&child_path);
                continue;
            }
            self.controls(children, &child_path, depth + 1);
        }
    }

    /// Walk `groups` pre-order; a group's own controls come before its subgroups.
    fn groups(&mut self, groups: Vec<CatalogGroup>, path: &[String], depth: usize) {
        for group in groups {
            let mut group_path = path.to_vec();
            if let Some(title) = trimmed(group.title.as_deref()) {
                group_path.push(title.to_string());
            }

            if group.controls.is_empty() && group.groups.is_empty() {
                continue;
            }
            if depth >= self.parser.max_depth {
                self.skip(&group_path);
                continue;
            }
            self.controls(group.controls, &group_path, depth + 1);
            self.groups(group.groups, &group_path, depth + 1);
        }
    }

    fn skip(&mut self, path: &[String]) {
        let under = path.last().map_or("catalog", String::as_str);
        self.warnings.push(format!(
            "Maximum nesting depth ({}) exceeded under '{under}'; nested entries skipped.",
            self.parser.max_depth
        ));
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a decoded payload with the default parser.
pub fn parse_catalog(payload: &Value) -> ParseOutcome {
    CatalogParser::new().parse(payload)
}

/// Parse raw payload text with the default parser.
pub fn parse_catalog_str(payload: &str) -> ParseOutcome {
    CatalogParser::new().parse_str(payload)
}
