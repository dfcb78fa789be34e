//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print any value as JSON or YAML. Table and plain formats fall back to JSON.
pub fn print_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value).unwrap_or_default());
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(T::headers());
            table.add_row(item.row());
            println!("{table}");
        }
        OutputFormat::Json | OutputFormat::Yaml => print_value(item, format),
        OutputFormat::Plain => {
            let row = item.row();
            for (header, value) in T::headers().iter().zip(row.iter()) {
                println!("{}: {}", header, value);
            }
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Json | OutputFormat::Yaml => print_value(items, format),
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print arbitrary records. Columns come from the first record's fields;
/// nested values are shown as compact JSON.
pub fn print_records<T: Serialize>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_value(items, format),
        OutputFormat::Table | OutputFormat::Plain => {
            let records: Vec<Value> = items
                .iter()
                .filter_map(|item| serde_json::to_value(item).ok())
                .collect();
            let headers = record_headers(&records);

            if format == OutputFormat::Plain {
                for (i, record) in records.iter().enumerate() {
                    if i > 0 {
                        println!("---");
                    }
                    for header in &headers {
                        println!("{}: {}", header, cell(record, header));
                    }
                }
                return;
            }

            let mut table = new_table();
            table.set_header(headers.clone());
            for record in &records {
                table.add_row(headers.iter().map(|h| cell(record, h)).collect::<Vec<_>>());
            }
            println!("{table}");
        }
    }
}

fn record_headers(records: &[Value]) -> Vec<String> {
    match records.first() {
        Some(Value::Object(fields)) => fields.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    }
}

fn cell(record: &Value, header: &str) -> String {
    let value = match record {
        Value::Object(fields) => fields.get(header).unwrap_or(&Value::Null),
        other => other,
    };
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_headers_follow_first_record() {
        let records = vec![json!({"email": "a@b.c", "password": "x"}), json!({"email": "d@e.f"})];
        assert_eq!(record_headers(&records), vec!["email", "password"]);
        assert_eq!(cell(&records[1], "password"), "");
    }

    #[test]
    fn test_cell_formats_nested_values() {
        let record = json!({"name": "Blue Top", "tags": ["a", "b"], "price": 500});
        assert_eq!(cell(&record, "name"), "Blue Top");
        assert_eq!(cell(&record, "tags"), r#"["a","b"]"#);
        assert_eq!(cell(&record, "price"), "500");
    }

    #[test]
    fn test_scalar_records_use_a_value_column() {
        let records = vec![json!("Polo")];
        assert_eq!(record_headers(&records), vec!["value"]);
        assert_eq!(cell(&records[0], "value"), "Polo");
    }
}
