//! Raw API access commands for direct REST endpoint calls

use scwctl_core::{Method, Query};
use serde_json::Value;
use tracing::debug;

use super::CommandContext;
use crate::cli::HttpMethod;
use crate::error::{Result as CliResult, ScwCtlError};

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

pub async fn handle_api_command(
    ctx: &CommandContext<'_>,
    method: HttpMethod,
    path: &str,
    data: Option<&str>,
) -> CliResult<()> {
    let client = ctx.client()?;

    let normalized_path = normalize_path(path);
    let body = match data {
        Some(data) => Some(parse_body(data)?),
        None if matches!(method, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch) => {
            Some(serde_json::json!({}))
        }
        None => None,
    };

    debug!("{} {}", method, normalized_path);
    let response = client
        .send(method.into(), &normalized_path, &Query::new(), body.as_ref())
        .await?;
    ctx.print(response.json_value()?)
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// `--data` is either inline JSON or `@path/to/file.json`
fn parse_body(data: &str) -> CliResult<Value> {
    if let Some(file_path) = data.strip_prefix('@') {
        let content = std::fs::read_to_string(file_path).map_err(|e| ScwCtlError::FileError {
            path: file_path.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ScwCtlError::InvalidInput {
            message: format!("Failed to parse JSON from file {}: {}", file_path, e),
        })
    } else {
        serde_json::from_str(data).map_err(|e| ScwCtlError::InvalidInput {
            message: format!("Failed to parse JSON from data parameter: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("instance/v1/zones"), "/instance/v1/zones");
        assert_eq!(normalize_path("/instance/v1/zones"), "/instance/v1/zones");
    }

    #[test]
    fn test_parse_body_inline_and_file() {
        assert_eq!(
            parse_body(r#"{"name":"apps"}"#).unwrap(),
            serde_json::json!({"name": "apps"})
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"stateful": true}}"#).unwrap();
        let arg = format!("@{}", file.path().display());
        assert_eq!(
            parse_body(&arg).unwrap(),
            serde_json::json!({"stateful": true})
        );
    }

    #[test]
    fn test_parse_body_reports_bad_json() {
        let err = parse_body("{nope").unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_parse_body_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = parse_body(&format!("@{}", missing.display())).unwrap_err();

        assert!(matches!(err, ScwCtlError::FileError { .. }));
        assert!(err.to_string().contains("absent.json"));
        assert!(err.suggestions().iter().any(|s| s.contains("absent.json")));
    }
}
