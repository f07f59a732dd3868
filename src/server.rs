//! Line-delimited JSON transport.
//!
//! Each input line is `{"id": ..., "tool": "...", "arguments": {...}}` and
//! produces exactly one output line `{"id": ..., "result": ...}`. Dispatch
//! failures are reported in-band as `{"error": ...}` results.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::service::Service;

/// Reserved tool name returning the action catalogue.
pub const LIST_TOOLS: &str = "list_tools";

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub id: JsonValue,
    pub tool: String,
    #[serde(default = "empty_arguments")]
    pub arguments: JsonValue,
}

fn empty_arguments() -> JsonValue {
    json!({})
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ToolResponse {
    pub id: JsonValue,
    pub result: JsonValue,
}

fn error_result(err: impl std::fmt::Display) -> JsonValue {
    json!({ "error": err.to_string() })
}

/// Handles a single request line. The line is raw bytes so that invalid
/// UTF-8 is reported like any other malformed request.
pub async fn handle_line(service: &dyn Service, line: &[u8]) -> ToolResponse {
    let request: ToolRequest = match serde_json::from_slice(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed request line");
            return ToolResponse {
                id: JsonValue::Null,
                result: error_result(format!("malformed request: {}", e)),
            };
        }
    };

    debug!(id = %request.id, tool = %request.tool, "request received");
    let result = if request.tool == LIST_TOOLS {
        json!({
            "name": service.name(),
            "version": service.version(),
            "description": service.description(),
            "tools": service.actions(),
        })
    } else {
        match service.request(&request.tool, request.arguments).await {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = %request.tool, error = %format!("{:#}", e), "request failed");
                error_result(format!("{:#}", e))
            }
        }
    };

    ToolResponse {
        id: request.id,
        result,
    }
}

/// Serves requests from `reader` until end of input.
///
/// Only I/O failures on the streams end the loop; a bad line gets an
/// in-band error reply.
pub async fn serve<R, W>(service: &dyn Service, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let response = handle_line(service, &line).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::service::SqliteDynamicService;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> SqliteDynamicService {
        let config = StoreConfig::builder().root_dir(dir.path()).build();
        SqliteDynamicService::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_tools() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let response = handle_line(&svc, br#"{"id": 1, "tool": "list_tools"}"#).await;
        assert_eq!(response.id, json!(1));
        assert_eq!(response.result["name"], json!("sqlite-dynamic"));
        assert_eq!(response.result["version"], json!(env!("CARGO_PKG_VERSION")));
        assert_eq!(
            response.result["description"],
            json!("Dynamic SQLite database provisioning")
        );
        assert_eq!(response.result["tools"][0]["name"], json!("create_database"));
        assert_eq!(response.result["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let response = handle_line(&svc, b"not json").await;
        assert_eq!(response.id, JsonValue::Null);
        let error = response.result["error"].as_str().unwrap();
        assert!(error.starts_with("malformed request"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_serving() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let mut input = b"{\"tool\": \"list_\xfftools\"}\n".to_vec();
        input.extend_from_slice(
            br#"{"id": 2, "tool": "create_database", "arguments": {"db_name": "after"}}"#,
        );
        input.push(b'\n');

        let mut output = Vec::new();
        serve(&svc, input.as_slice(), &mut output).await.unwrap();

        let lines: Vec<JsonValue> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], JsonValue::Null);
        assert!(lines[0]["result"]["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed request"));
        assert_eq!(
            lines[1],
            json!({"id": 2, "result": {"message": "Database 'after' created successfully!"}})
        );
        assert!(dir.path().join("after.db").exists());
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_request() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let input = concat!(
            r#"{"id": "a", "tool": "create_database", "arguments": {"db_name": "inv"}}"#,
            "\n\n",
            r#"{"id": "b", "tool": "prompt_query", "arguments": {"db_name": "nope", "table_name": "t", "prompt": "count"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve(&svc, input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<JsonValue> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            json!({"id": "a", "result": {"message": "Database 'inv' created successfully!"}})
        );
        assert_eq!(
            lines[1],
            json!({"id": "b", "result": {"error": "Database 'nope' does not exist"}})
        );
    }
}
