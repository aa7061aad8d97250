//! Record set comparison.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::types::ControlRecord;

/// Classification of one id across two record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl ChangeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record field taking part in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangedField {
    Title,
    FullText,
    GroupPath,
}

impl ChangedField {
    pub const ALL: [Self; 3] = [Self::Title, Self::FullText, Self::GroupPath];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::FullText => "fullText",
            Self::GroupPath => "groupPath",
        }
    }

    fn differs(self, before: &ControlRecord, after: &ControlRecord) -> bool {
        match self {
            Self::Title => before.title != after.title,
            Self::FullText => before.full_text != after.full_text,
            // Paths compare by their joined form, not element-wise.
            Self::GroupPath => before.joined_path(" > ") != after.joined_path(" > "),
        }
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison result for a single id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChange<'a> {
    pub id: &'a str,
    pub status: ChangeStatus,
    /// Empty unless the id is present on both sides
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed_fields: Vec<ChangedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<&'a ControlRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<&'a ControlRecord>,
}

/// Per-status counts of a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub const fn total(&self) -> usize {
        self.added + self.removed + self.changed + self.unchanged
    }

    /// True when nothing was added, removed or changed.
    pub const fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.changed == 0
    }
}

/// Index records by id; a later duplicate replaces an earlier one but keeps its position.
fn by_id(records: &[ControlRecord]) -> (Vec<&str>, HashMap<&str, &ControlRecord>) {
    let mut order = Vec::new();
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        if map.insert(record.id.as_str(), record).is_none() {
            order.push(record.id.as_str());
        }
    }
    (order, map)
}

/// Classify every id present in `before` or `after`.
///
/// Ids appear in first-seen order of `before`, followed by ids that only
/// `after` contains.
pub fn diff<'a>(before: &'a [ControlRecord], after: &'a [ControlRecord]) -> Vec<ControlChange<'a>> {
    let (before_order, before_map) = by_id(before);
    let (after_order, after_map) = by_id(after);

    let ids = before_order.into_iter().chain(
        after_order
            .into_iter()
            .filter(|id| !before_map.contains_key(id)),
    );

    ids.map(|id| {
        let previous = before_map.get(id).copied();
        let next = after_map.get(id).copied();
        match (previous, next) {
            (Some(prev), Some(next)) => {
                let changed_fields: Vec<ChangedField> = ChangedField::ALL
                    .into_iter()
                    .filter(|field| field.differs(prev, next))
                    .collect();
                let status = if changed_fields.is_empty() {
                    ChangeStatus::Unchanged
                } else {
                    ChangeStatus::Changed
                };
                ControlChange {
                    id,
                    status,
                    changed_fields,
                    before: Some(prev),
                    after: Some(next),
                }
            },
            (Some(prev), None) => ControlChange {
                id,
                status: ChangeStatus::Removed,
                changed_fields: Vec::new(),
                before: Some(prev),
                after: None,
            },
            (None, next) => ControlChange {
                id,
                status: ChangeStatus::Added,
                changed_fields: Vec::new(),
                before: None,
                after: next,
            },
        }
    })
    .collect()
}

/// Count changes per status.
pub fn summarize(changes: &[ControlChange<'_>]) -> DiffSummary {
    changes
        .iter()
        .fold(DiffSummary::default(), |mut summary, change| {
            match change.status {
                ChangeStatus::Added => summary.added += 1,
                ChangeStatus::Removed => summary.removed += 1,
                ChangeStatus::Changed => summary.changed += 1,
                ChangeStatus::Unchanged => summary.unchanged += 1,
            }
            summary
        })
}
