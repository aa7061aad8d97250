//! CSV and Markdown renderings of a record subset.
//!
//! Both formats are byte-exact: CSV starts with a UTF-8 byte order mark and
//! uses CRLF line endings, Markdown uses plain `\n`.

use crate::types::ControlRecord;

/// Default CSV delimiter.
pub const CSV_DELIMITER: char = ';';

/// Separator for group paths in exported documents.
pub const EXPORT_PATH_SEPARATOR: &str = " > ";

/// Suggested file name for CSV exports.
pub const CSV_FILE_NAME: &str = "grundschutz-controls.csv";

/// Suggested file name for Markdown exports.
pub const MARKDOWN_FILE_NAME: &str = "grundschutz-controls.md";

const CSV_HEADER: [&str; 4] = ["id", "title", "groupPath", "fullText"];
const CRLF: &str = "\r\n";
const BOM: char = '\u{feff}';

const MARKDOWN_TITLE: &str = "# Grundschutz++ OSCAL Controls";
const NO_DETAILS: &str = "_Keine Details verfügbar_";

/// Render records as `;`-separated CSV.
pub fn export_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ControlRecord>,
{
    export_csv_with_delimiter(records, CSV_DELIMITER)
}

/// Render records as CSV with a custom delimiter.
pub fn export_csv_with_delimiter<'a, I>(records: I, delimiter: char) -> String
where
    I: IntoIterator<Item = &'a ControlRecord>,
{
    let separator = delimiter.to_string();
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&CSV_HEADER.join(&separator));
    out.push_str(CRLF);

    for record in records {
        let path = record.joined_path(EXPORT_PATH_SEPARATOR);
        let cells = [
            record.id.as_str(),
            record.title.as_str(),
            path.as_str(),
            record.full_text.as_str(),
        ];
        let row: Vec<String> = cells
            .iter()
            .map(|cell| escape_csv(cell, delimiter))
            .collect();
        out.push_str(&row.join(&separator));
        out.push_str(CRLF);
    }
    out
}

/// Quotes are always doubled; the cell is wrapped only when it needs it.
fn escape_csv(value: &str, delimiter: char) -> String {
    let escaped = value.replace('"', "\"\"");
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Render records as a Markdown document.
pub fn export_markdown<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ControlRecord>,
{
    let mut lines: Vec<String> = vec![MARKDOWN_TITLE.to_string(), String::new()];
    for record in records {
        lines.push(format!("## {} ({})", record.title, record.id));
        if !record.group_path.is_empty() {
            lines.push(format!(
                "*Pfad:* {}",
                record.joined_path(EXPORT_PATH_SEPARATOR)
            ));
        }
        lines.push(String::new());
        lines.push(if record.full_text.is_empty() {
            NO_DETAILS.to_string()
        } else {
            record.full_text.clone()
        });
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogControl;
    use pretty_assertions::assert_eq;

    fn record(id: &str, title: &str, path: &[&str], full_text: &str) -> ControlRecord {
        ControlRecord {
            id: id.to_string(),
            title: title.to_string(),
            group_path: path.iter().map(ToString::to_string).collect(),
            full_text: full_text.to_string(),
            control: CatalogControl::default(),
        }
    }

    fn sample() -> Vec<ControlRecord> {
        vec![
            record("CTRL-1", "First Control", &["Group A"], "First control prose"),
            record(
                "CTRL-2",
                "Second Control",
                &["Group B", "Sub B"],
                "Second control prose; with delimiter",
            ),
        ]
    }

    #[test]
    fn test_csv_layout() {
        let csv = export_csv(&sample());
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("id;title;groupPath;fullText"));
        assert!(csv.contains("Group B > Sub B"));
        assert!(csv.contains("\"Second control prose; with delimiter\""));
        assert!(csv.ends_with("\r\n"));
        assert_eq!(
            csv,
            "\u{feff}id;title;groupPath;fullText\r\n\
             CTRL-1;First Control;Group A;First control prose\r\n\
             CTRL-2;Second Control;Group B > Sub B;\"Second control prose; with delimiter\"\r\n"
        );
    }

    #[test]
    fn test_csv_every_line_ends_with_crlf() {
        let csv = export_csv(&sample());
        let body = csv.trim_start_matches('\u{feff}');
        let lines: Vec<&str> = body.split_inclusive('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.ends_with("\r\n")));
    }

    #[test]
    fn test_csv_quote_and_newline_escaping() {
        let records = vec![record("Q", "Say \"hi\"", &[], "line one\nline two")];
        let csv = export_csv(&records);
        assert!(csv.contains("Q;\"Say \"\"hi\"\"\";;\"line one\nline two\"\r\n"));
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(
            export_csv(&Vec::<ControlRecord>::new()),
            "\u{feff}id;title;groupPath;fullText\r\n"
        );
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let csv = export_csv_with_delimiter(&sample(), ',');
        assert!(csv.contains("id,title,groupPath,fullText"));
        assert!(csv.contains("Second control prose; with delimiter\r\n"));
    }

    #[test]
    fn test_markdown_layout() {
        let md = export_markdown(&sample());
        assert!(md.contains("## First Control (CTRL-1)"));
        assert!(md.contains("*Pfad:* Group B > Sub B"));
        assert!(md.contains("Second control prose"));
        assert_eq!(
            md,
            "# Grundschutz++ OSCAL Controls\n\n\
             ## First Control (CTRL-1)\n*Pfad:* Group A\n\nFirst control prose\n\n\
             ## Second Control (CTRL-2)\n*Pfad:* Group B > Sub B\n\nSecond control prose; with delimiter\n"
        );
    }

    #[test]
    fn test_markdown_placeholder_and_no_path() {
        let md = export_markdown(&[record("X", "Bare", &[], "")]);
        assert_eq!(
            md,
            "# Grundschutz++ OSCAL Controls\n\n## Bare (X)\n\n_Keine Details verfügbar_\n"
        );
    }

    #[test]
    fn test_markdown_empty_is_title_only() {
        assert_eq!(
            export_markdown(&Vec::<ControlRecord>::new()),
            "# Grundschutz++ OSCAL Controls\n"
        );
    }
}
