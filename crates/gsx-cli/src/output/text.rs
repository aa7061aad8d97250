//! Text output formatting

use colored::Colorize;
use gsx_core::export::EXPORT_PATH_SEPARATOR;
use gsx_core::{CachedCatalog, ChangeStatus, ControlChange, ControlDetail, DiffSummary};
use std::fmt::Write as _;

use super::formatter::SearchReport;

pub struct TextFormatter;

impl TextFormatter {
    /// Search results in the brief, colorized layout
    pub fn search_results(report: &SearchReport<'_>) -> String {
        let mut out = String::new();

        if report.rows.is_empty() {
            match report.group {
                Some(group) if report.query.is_empty() => {
                    let _ = writeln!(out, "No controls found in group '{group}'");
                },
                _ => {
                    let _ = writeln!(out, "No results found for '{}'", report.query);
                },
            }
            return out;
        }

        for (idx, row) in report.rows.iter().enumerate() {
            let rank = idx + 1;
            let mut heading = format!(
                "◆ {rank}. {} ─ {}",
                row.id.bold(),
                row.title,
            );
            if let Some(class) = row.class {
                let _ = write!(heading, " [{}]", class.yellow());
            }
            let _ = writeln!(out, "{heading}  {}", format!("{:.2}", row.score).bright_blue());

            if !row.group_path.is_empty() {
                let path = row.group_path.join(EXPORT_PATH_SEPARATOR);
                let _ = writeln!(out, "  in {}", path.bright_black());
            }
            if !row.preview.is_empty() {
                let _ = writeln!(out, "  {}", row.preview);
            }
            out.push('\n');
        }

        let summary = if report.rows.len() < report.total {
            format!(
                "Showing {} of {} results",
                report.rows.len(),
                report.total
            )
        } else {
            format!("{} results", report.total)
        };
        let _ = writeln!(out, "{}", summary.bright_black());
        out
    }

    /// Full detail view of one control
    pub fn detail(detail: &ControlDetail) -> String {
        let mut out = String::new();
        let _ = write!(out, "{} {}", detail.title.bold(), format!("({})", detail.id).bright_black());
        if let Some(class) = &detail.class {
            let _ = write!(out, " [{}]", class.yellow());
        }
        out.push('\n');

        if !detail.group_path.is_empty() {
            let path = detail.group_path.join(EXPORT_PATH_SEPARATOR);
            let _ = writeln!(out, "{} {path}", "Pfad:".bright_black());
        }

        if !detail.main_text.is_empty() {
            let _ = writeln!(out, "\n{}", detail.main_text);
        }

        for (heading, entries) in [
            ("Teile", &detail.parts),
            ("Parameter", &detail.params),
            ("Eigenschaften", &detail.properties),
        ] {
            if entries.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{}", heading.cyan().bold());
            for entry in entries {
                let _ = writeln!(out, "  {}: {}", entry.label.bold(), entry.text);
            }
        }
        out
    }

    /// Diff summary followed by one line per reported change
    pub fn diff(changes: &[ControlChange<'_>], summary: &DiffSummary, show_unchanged: bool) -> String {
        let mut out = String::new();

        for change in changes {
            let (marker, shown) = match change.status {
                ChangeStatus::Added => ("+".green(), change.after),
                ChangeStatus::Removed => ("-".red(), change.before),
                ChangeStatus::Changed => ("~".yellow(), change.after),
                ChangeStatus::Unchanged if show_unchanged => (" ".normal(), change.after),
                ChangeStatus::Unchanged => continue,
            };
            let title = shown.map_or("", |record| record.title.as_str());
            let _ = write!(out, "{marker} {} {title}", change.id.bold());
            if !change.changed_fields.is_empty() {
                let fields: Vec<&str> = change
                    .changed_fields
                    .iter()
                    .map(|field| field.as_str())
                    .collect();
                let _ = write!(out, " {}", format!("({})", fields.join(", ")).bright_black());
            }
            out.push('\n');
        }

        if summary.is_identical() {
            let _ = writeln!(out, "{} No differences ({} controls)", "✓".green(), summary.total());
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "{} added, {} removed, {} changed, {} unchanged",
                summary.added.to_string().green(),
                summary.removed.to_string().red(),
                summary.changed.to_string().yellow(),
                summary.unchanged
            );
        }
        out
    }

    /// One group title per line
    pub fn groups(groups: &[&str]) -> String {
        if groups.is_empty() {
            return "No groups found\n".to_string();
        }
        let mut out = String::new();
        for group in groups {
            let _ = writeln!(out, "{group}");
        }
        out
    }

    /// Cached catalogs with their fetch time
    pub fn cache_entries(entries: &[CachedCatalog]) -> String {
        if entries.is_empty() {
            return format!("{} Cache is empty\n", "ℹ".blue());
        }
        let mut out = String::new();
        for entry in entries {
            let fetched = entry.fetched_at.format("%Y-%m-%d %H:%M:%S UTC");
            let _ = writeln!(out, "{}", entry.url.bold());
            let _ = writeln!(out, "  {} {fetched}", "fetched".bright_black());
            let _ = writeln!(out, "  {} {}", "sha256".bright_black(), entry.sha256);
        }
        out
    }

    /// Parse warnings, one per line, for stderr
    pub fn warnings(warnings: &[String]) -> String {
        let mut out = String::new();
        for warning in warnings {
            let _ = writeln!(out, "{} {warning}", "⚠".yellow());
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::SearchRow;
    use gsx_core::{ChangedField, ControlRecord, diff, summarize};

    fn plain() {
        colored::control::set_override(false);
    }

    fn record(id: &str, title: &str, path: &[&str]) -> ControlRecord {
        ControlRecord {
            id: id.to_string(),
            title: title.to_string(),
            group_path: path.iter().map(ToString::to_string).collect(),
            full_text: title.to_string(),
            control: gsx_core::CatalogControl::default(),
        }
    }

    #[test]
    fn test_search_results_layout() {
        plain();
        let path = vec!["Betrieb".to_string(), "Datensicherung".to_string()];
        let report = SearchReport {
            query: "backup",
            group: None,
            total: 3,
            rows: vec![SearchRow {
                id: "OPS.1",
                title: "Backups",
                group_path: &path,
                score: 1.5,
                class: Some("erhöht"),
                preview: "Backups SOLLTEN getestet werden.".to_string(),
            }],
            warnings: &[],
        };

        let text = TextFormatter::search_results(&report);
        assert!(text.starts_with("◆ 1. OPS.1 ─ Backups [erhöht]  1.50\n"));
        assert!(text.contains("  in Betrieb > Datensicherung\n"));
        assert!(text.contains("  Backups SOLLTEN getestet werden.\n"));
        assert!(text.ends_with("Showing 1 of 3 results\n"));
    }

    #[test]
    fn test_empty_results() {
        plain();
        let report = SearchReport {
            query: "",
            group: Some("Netz"),
            total: 0,
            rows: Vec::new(),
            warnings: &[],
        };
        assert_eq!(
            TextFormatter::search_results(&report),
            "No controls found in group 'Netz'\n"
        );

        let report = SearchReport {
            query: "zzz",
            group: None,
            ..report
        };
        assert_eq!(
            TextFormatter::search_results(&report),
            "No results found for 'zzz'\n"
        );
    }

    #[test]
    fn test_diff_hides_unchanged_by_default() {
        plain();
        let before = vec![record("A", "Alpha", &[]), record("B", "Beta", &[])];
        let after = vec![record("A", "Alpha", &[]), record("B", "Beta", &["Neu"]), record("C", "Gamma", &[])];
        let changes = diff(&before, &after);
        let summary = summarize(&changes);
        assert_eq!(changes[1].changed_fields, vec![ChangedField::GroupPath]);

        let text = TextFormatter::diff(&changes, &summary, false);
        assert!(!text.contains("A Alpha"));
        assert!(text.contains("~ B Beta (groupPath)\n"));
        assert!(text.contains("+ C Gamma\n"));
        assert!(text.ends_with("1 added, 0 removed, 1 changed, 1 unchanged\n"));

        let all = TextFormatter::diff(&changes, &summary, true);
        assert!(all.contains("  A Alpha\n"));
    }

    #[test]
    fn test_identical_diff() {
        plain();
        let records = vec![record("A", "Alpha", &[])];
        let changes = diff(&records, &records);
        let text = TextFormatter::diff(&changes, &summarize(&changes), false);
        assert_eq!(text, "✓ No differences (1 controls)\n");
    }

    #[test]
    fn test_detail_sections() {
        plain();
        let detail = ControlDetail {
            id: "OPS.1".to_string(),
            title: "Backups".to_string(),
            group_path: vec!["Betrieb".to_string()],
            class: None,
            main_text: "Backups SOLLTEN getestet werden.".to_string(),
            parts: Vec::new(),
            params: Vec::new(),
            properties: vec![gsx_core::extract::DetailEntry {
                label: "Tags".to_string(),
                text: "Datensicherung".to_string(),
            }],
        };
        let text = TextFormatter::detail(&detail);
        assert!(text.starts_with("Backups (OPS.1)\nPfad: Betrieb\n"));
        assert!(text.contains("\nEigenschaften\n  Tags: Datensicherung\n"));
        assert!(!text.contains("Teile"));
    }
}
