use std::sync::OnceLock;

use comfy_table::Table;
use jpx_core::Runtime;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::cli;
use crate::error::{Result, ScwCtlError};

/// Global JMESPath runtime with extended functions
static JMESPATH_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or initialize the JMESPath runtime with extended functions
pub fn get_jmespath_runtime() -> &'static Runtime {
    JMESPATH_RUNTIME.get_or_init(|| Runtime::builder().with_all_extensions().build())
}

/// Normalize backtick literals in JMESPath expressions.
///
/// JMESPath allows "elided quotes" in backtick literals, so `` `foo` `` means
/// `` `"foo"` ``. The runtime only accepts valid JSON between backticks, so
/// bare strings get quoted here; numbers, booleans, null and already quoted
/// values are left alone.
fn normalize_backtick_literals(query: &str) -> String {
    static BACKTICK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = BACKTICK_RE
        .get_or_init(|| Regex::new(r"`([^`\\]*(?:\\.[^`\\]*)*)`").ok())
        .as_ref()
    else {
        return query.to_string();
    };

    re.replace_all(query, |caps: &regex::Captures| {
        let content = &caps[1];
        let trimmed = content.trim();

        if serde_json::from_str::<Value>(trimmed).is_ok() {
            format!("`{}`", content)
        } else {
            let escaped = trimmed.replace('\\', "\\\\").replace('"', "\\\"");
            format!("`\"{}\"`", escaped)
        }
    })
    .into_owned()
}

/// Compile a JMESPath expression using the extended runtime.
pub fn compile_jmespath(
    query: &str,
) -> std::result::Result<jpx_core::Expression<'static>, jpx_core::JmespathError> {
    let normalized = normalize_backtick_literals(query);
    get_jmespath_runtime().compile(&normalized)
}

/// Apply an optional JMESPath query to a value
pub fn apply_query(value: Value, query: Option<&str>) -> Result<Value> {
    let Some(query_str) = query else {
        return Ok(value);
    };
    let expr = compile_jmespath(query_str).map_err(|e| ScwCtlError::InvalidInput {
        message: format!("Invalid JMESPath expression '{}': {}", query_str, e),
    })?;
    expr.search(&value).map_err(|e| ScwCtlError::OutputError {
        message: format!("JMESPath query failed: {}", e),
    })
}

/// Concrete rendering, once `auto` has been decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// `auto` renders as JSON for single resources
    pub fn resolve(format: cli::OutputFormat) -> Self {
        match format {
            cli::OutputFormat::Auto | cli::OutputFormat::Json => Self::Json,
            cli::OutputFormat::Yaml => Self::Yaml,
            cli::OutputFormat::Table => Self::Table,
        }
    }
}

pub fn print_output<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    let json_value = apply_query(serde_json::to_value(data)?, query)?;
    println!("{}", render(&json_value, format)?);
    Ok(())
}

/// Print a list of resources
///
/// `auto` and `table` show one row per item limited to `columns`, unless a
/// query reshaped the data, in which case the query result is printed as is.
pub fn print_list<T: Serialize>(
    items: &[T],
    columns: &[&str],
    format: cli::OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    let value = serde_json::to_value(items)?;
    match format {
        cli::OutputFormat::Auto | cli::OutputFormat::Table if query.is_none() => {
            println!("{}", columns_table(&value, columns));
            Ok(())
        }
        cli::OutputFormat::Auto => print_output(value, OutputFormat::Json, query),
        other => print_output(value, OutputFormat::resolve(other), query),
    }
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| ScwCtlError::OutputError {
            message: format!("YAML error: {}", e),
        })?,
        OutputFormat::Table => table_for(value),
    })
}

fn columns_table(value: &Value, columns: &[&str]) -> String {
    let mut table = Table::new();
    table.set_header(columns.iter().map(|c| c.to_uppercase()).collect::<Vec<_>>());
    if let Value::Array(items) = value {
        for item in items {
            table.add_row(
                columns
                    .iter()
                    .map(|c| format_value(item.get(*c).unwrap_or(&Value::Null)))
                    .collect::<Vec<_>>(),
            );
        }
    }
    table.to_string()
}

fn table_for(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        _ => format_value(value),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.iter().all(Value::is_string) => arr
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_backtick_unquoted_string() {
        assert_eq!(
            normalize_backtick_literals(r#"[?state==`running`]"#),
            r#"[?state==`"running"`]"#
        );
    }

    #[test]
    fn test_normalize_backtick_leaves_json_alone() {
        for query in [
            r#"[?name==`"foo"`]"#,
            r#"[?size==`123`]"#,
            r#"[?stateful==`true`]"#,
            r#"[?description==`null`]"#,
            r#"`[1, 2, 3]`"#,
        ] {
            assert_eq!(normalize_backtick_literals(query), query);
        }
    }

    #[test]
    fn test_normalize_multiple_backticks() {
        assert_eq!(
            normalize_backtick_literals(r#"[?status==`ready` && privacy==`public`]"#),
            r#"[?status==`"ready"` && privacy==`"public"`]"#
        );
    }

    #[test]
    fn test_apply_query_filters() {
        let value = json!([
            {"name": "a", "state": "running"},
            {"name": "b", "state": "stopped"}
        ]);
        let out = apply_query(value, Some("[?state==`running`].name")).unwrap();
        assert_eq!(out, json!(["a"]));
    }

    #[test]
    fn test_apply_query_rejects_bad_expression() {
        let err = apply_query(json!({}), Some("[?")).unwrap_err();
        assert!(matches!(err, ScwCtlError::InvalidInput { .. }));
    }

    #[test]
    fn test_columns_table_picks_fields() {
        let rendered = columns_table(
            &json!([{"id": "v1", "name": "data", "tags": ["a", "b"], "size": 10}]),
            &["id", "tags", "missing"],
        );
        assert!(rendered.contains("ID"));
        assert!(rendered.contains("v1"));
        assert!(rendered.contains("a,b"));
        assert!(!rendered.contains("data"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!([1, 2])), "[2 items]");
        assert_eq!(format_value(&json!({"a": 1})), "{1 fields}");
    }
}
