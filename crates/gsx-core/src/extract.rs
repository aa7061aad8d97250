//! Searchable text extraction and detail/preview helpers.
//!
//! [`collect_text`] decides what a control contributes to the search index
//! besides its title, so it directly determines search recall. The remaining
//! helpers derive display text for result lists and detail views from the
//! same control data.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::types::{CatalogControl, ControlRecord};

/// Part names that only describe document structure.
const STRUCTURAL_PART_NAMES: [&str; 2] = ["statement", "guidance"];

/// Maximum preview length in characters.
pub const PREVIEW_MAX_CHARS: usize = 160;

/// Class label that carries no information for readers.
const DEFAULT_CLASS: &str = "normal-SdT";

/// Parameter insertion marker, e.g. `{{ insert: param, freq }}`
#[allow(clippy::unwrap_used)]
static INSERT_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*insert:\s*param\s*,\s*([^\s}]+)\s*\}\}").unwrap());

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Derive the searchable text of a control.
///
/// Concatenates, separated by single spaces: the class label, the values of
/// `tags` properties, parameter labels and prose, and for each part its
/// title, its name (unless it is `statement` or `guidance`) and its prose.
pub fn collect_text(control: &CatalogControl) -> String {
    let mut segments: Vec<&str> = Vec::new();

    if let Some(class) = non_empty(control.class.as_deref()) {
        segments.push(class);
    }

    for prop in &control.props {
        if prop.name.as_deref() == Some("tags") {
            if let Some(value) = non_empty(prop.value.as_deref()) {
                segments.push(value);
            }
        }
    }

    for param in &control.params {
        if let Some(label) = non_empty(param.label.as_deref()) {
            segments.push(label);
        }
        if let Some(prose) = non_empty(param.prose.as_deref()) {
            segments.push(prose);
        }
    }

    for part in &control.parts {
        if let Some(title) = non_empty(part.title.as_deref()) {
            segments.push(title);
        }
        if let Some(name) = non_empty(part.name.as_deref()) {
            if !is_structural(name) {
                segments.push(name);
            }
        }
        if let Some(prose) = non_empty(part.prose.as_deref()) {
            segments.push(prose);
        }
    }

    segments.join(" ").trim().to_string()
}

fn is_structural(name: &str) -> bool {
    STRUCTURAL_PART_NAMES
        .iter()
        .any(|token| name.eq_ignore_ascii_case(token))
}

/// Prose of all parts, trimmed, joined by a blank line.
pub fn main_text(control: &CatalogControl) -> String {
    control
        .parts
        .iter()
        .filter_map(|part| part.prose.as_deref().map(str::trim))
        .filter(|prose| !prose.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prose of the first `statement` part, falling back to the first `guidance` part.
pub fn primary_prose(control: &CatalogControl) -> Option<&str> {
    let prose_of = |wanted: &str| {
        control
            .parts
            .iter()
            .find(|part| part.name.as_deref() == Some(wanted))
            .and_then(|part| part.prose.as_deref())
    };
    prose_of("statement").or_else(|| prose_of("guidance"))
}

/// Replace `{{ insert: param, <id> }}` markers with parameter labels.
///
/// Unknown parameters and parameters with a blank label render as `[<id>]`.
pub fn resolve_param_inserts(prose: &str, control: &CatalogControl) -> String {
    INSERT_PARAM_RE
        .replace_all(prose, |caps: &Captures<'_>| {
            let param_id = &caps[1];
            control
                .params
                .iter()
                .find(|param| param.id.as_deref() == Some(param_id))
                .and_then(|param| param.label.as_deref())
                .filter(|label| !label.trim().is_empty())
                .map_or_else(|| format!("[{param_id}]"), ToString::to_string)
        })
        .into_owned()
}

/// Short single-line excerpt for result lists.
///
/// Uses the primary prose with parameter inserts resolved, or the record's
/// full text when the control has no statement or guidance.
pub fn preview(record: &ControlRecord) -> String {
    let resolved = primary_prose(&record.control)
        .map(|prose| resolve_param_inserts(prose, &record.control))
        .filter(|text| !text.trim().is_empty());
    let source = resolved.as_deref().unwrap_or(&record.full_text);
    truncate_with_ellipsis(source, PREVIEW_MAX_CHARS)
}

/// Collapse whitespace and cut `text` to at most `max_chars` characters.
///
/// The cut happens at the last space when that space lies beyond 60% of the
/// limit; otherwise mid-word.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max_chars {
        return normalized;
    }

    let cut: String = normalized.chars().take(max_chars).collect();
    let threshold = max_chars * 6 / 10;
    let final_cut = match cut.rfind(' ') {
        Some(byte_idx) if cut[..byte_idx].chars().count() > threshold => &cut[..byte_idx],
        _ => cut.as_str(),
    };
    format!("{}…", final_cut.trim_end())
}

/// Human readable label for a property name.
pub fn property_label(name: &str) -> &str {
    match name {
        "alt-identifier" => "Alt-ID",
        "effort_level" => "Aufwandsstufe",
        "tags" => "Tags",
        "target_objects" => "Zielobjekte",
        "documentation" => "Dokumentation",
        "ergebnis" => "Ergebnis",
        "präzisierung" => "Präzisierung",
        "handlungsworte" => "Handlungswort",
        "modalverb" => "Modalverb",
        "" => "Eigenschaft",
        other => other,
    }
}

/// Class label worth showing next to a title, if any.
pub fn class_badge(control: &CatalogControl) -> Option<&str> {
    non_empty(control.class.as_deref()).filter(|class| *class != DEFAULT_CLASS)
}

/// One labelled line of a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailEntry {
    pub label: String,
    pub text: String,
}

/// Structured detail view of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDetail {
    pub id: String,
    pub title: String,
    pub group_path: Vec<String>,
    pub class: Option<String>,
    pub main_text: String,
    pub parts: Vec<DetailEntry>,
    pub params: Vec<DetailEntry>,
    pub properties: Vec<DetailEntry>,
}

impl ControlDetail {
    /// Build the detail view for `record`.
    pub fn from_record(record: &ControlRecord) -> Self {
        let control = &record.control;

        let parts = control
            .parts
            .iter()
            .map(|part| DetailEntry {
                label: non_empty(part.name.as_deref())
                    .or_else(|| non_empty(part.title.as_deref()))
                    .unwrap_or("Part")
                    .to_string(),
                text: non_empty(part.prose.as_deref())
                    .map_or_else(|| "–".to_string(), |p| resolve_param_inserts(p, control)),
            })
            .collect();

        let params = control
            .params
            .iter()
            .map(|param| DetailEntry {
                label: non_empty(param.label.as_deref())
                    .or_else(|| non_empty(param.id.as_deref()))
                    .unwrap_or("Parameter")
                    .to_string(),
                text: param.prose.clone().unwrap_or_default(),
            })
            .collect();

        let properties = control
            .props
            .iter()
            .map(|prop| DetailEntry {
                label: property_label(prop.name.as_deref().unwrap_or_default()).to_string(),
                text: non_empty(prop.value.as_deref()).unwrap_or("–").to_string(),
            })
            .collect();

        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            group_path: record.group_path.clone(),
            class: class_badge(control).map(ToString::to_string),
            main_text: resolve_param_inserts(&main_text(control), control),
            parts,
            params,
            properties,
        }
    }
}
