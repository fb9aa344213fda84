//! Table and JSON rendering for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Render rows as a table, or as a JSON array.
///
/// An empty table renders as `empty_message`; an empty JSON list stays `[]`
/// so scripts never have to special-case it.
pub fn render_list<T: Serialize + Tabled>(
    items: &[T],
    format: OutputFormat,
    empty_message: &str,
) -> String {
    match format {
        OutputFormat::Table if items.is_empty() => empty_message.to_string(),
        OutputFormat::Table => Table::new(items).to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
        }
    }
}

/// Print rows in the selected format.
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat, empty_message: &str) {
    println!("{}", render_list(items, format, empty_message));
}

/// Render a single value. Tables fall back to its pretty `Debug` form.
pub fn render_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format!("{item:#?}"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Print a single value in the selected format.
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    println!("{}", render_item(item, format));
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Errors go to stderr so JSON on stdout stays parseable.
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print an indented `key: value` line.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{key}:"), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Tabled)]
    struct Row {
        key: String,
        email: String,
    }

    fn rows() -> Vec<Row> {
        vec![Row {
            key: "3f2a9c1e".to_string(),
            email: "a@x.com".to_string(),
        }]
    }

    #[test]
    fn test_empty_table_uses_caller_message() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(
            render_list(&empty, OutputFormat::Table, "No stored sessions."),
            "No stored sessions."
        );
    }

    #[test]
    fn test_empty_json_list_is_array() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(render_list(&empty, OutputFormat::Json, "ignored"), "[]");
    }

    #[test]
    fn test_table_has_headers_and_values() {
        let table = render_list(&rows(), OutputFormat::Table, "none");
        assert!(table.contains("email"));
        assert!(table.contains("a@x.com"));
        assert!(!table.contains("none"));
    }

    #[test]
    fn test_json_item() {
        let json = render_item(&serde_json::json!({ "count": 3 }), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["count"], 3);
    }
}
