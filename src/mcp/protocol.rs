/// JSON-RPC 2.0 envelopes and the MCP message shapes used by the tool server
///
/// This module defines the JSON-RPC message format that MCP clients use to
/// talk to the habit tracker over stdin/stdout.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::StorageError;

/// Protocol revision announced in `initialize`
pub const MCP_VERSION: &str = "2024-11-05";

/// Incoming request or notification
///
/// Requests without an `id` are notifications and get no response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version, must be "2.0"
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    pub params: Option<Value>,
}

/// Reply to a request: exactly one of `result` and `error` is set
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// Protocol-level failure
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `tools/call` params
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Outcome of one tool invocation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
    /// Application error code when `is_error` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
}

/// One text block of a tool result
#[derive(Debug, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Entry of the `tools/list` reply
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Whether the tool list can change at runtime
    pub list_changed: bool,
}

/// `initialize` params sent by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Option<ClientInfo>,
}

/// Information about the MCP client
#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// JSON-RPC error codes
pub mod error_codes {
    /// Line is not valid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Not a JSON-RPC 2.0 request
    pub const INVALID_REQUEST: i32 = -32600;
    /// Unknown method or tool name
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Params or tool arguments do not match the expected shape
    pub const INVALID_PARAMS: i32 = -32602;
    /// Failure while building the reply
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific error codes (-32000 to -32099)
    /// No habit with the given id
    pub const HABIT_NOT_FOUND: i32 = -32001;
    /// No category with the given id
    pub const CATEGORY_NOT_FOUND: i32 = -32002;
    /// Rejected name, weekday or description
    pub const VALIDATION_ERROR: i32 = -32003;
    /// SQLite or schema failure
    pub const STORAGE_ERROR: i32 = -32004;
    /// Name already taken
    pub const DUPLICATE_NAME: i32 = -32005;
    /// Category still has habits
    pub const CATEGORY_IN_USE: i32 = -32006;
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }
}

impl ToolCallResult {
    /// Plain text result
    pub fn success(text: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error: false,
            error_code: None,
        }
    }

    /// Successful result carrying the message and the structured data as JSON
    pub fn with_data(text: String, data: &Value) -> Self {
        let mut result = Self::success(text);
        result.content.push(ToolContent {
            content_type: "text".to_string(),
            text: data.to_string(),
        });
        result
    }

    /// Failed result; the text is prefixed with `Error:`
    pub fn error(code: i32, error_message: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: format!("Error: {}", error_message),
            }],
            is_error: true,
            error_code: Some(code),
        }
    }

    /// Tool result for a failed storage operation
    pub fn from_storage_error(error: &StorageError) -> Self {
        Self::error(storage_error_to_json_rpc_code(error), error.to_string())
    }
}

/// Map storage errors to JSON-RPC application error codes
pub fn storage_error_to_json_rpc_code(error: &StorageError) -> i32 {
    match error {
        StorageError::HabitNotFound { .. } => error_codes::HABIT_NOT_FOUND,
        StorageError::CategoryNotFound { .. } => error_codes::CATEGORY_NOT_FOUND,
        StorageError::Validation(_) => error_codes::VALIDATION_ERROR,
        StorageError::DuplicateCategory { .. } | StorageError::DuplicateHabit { .. } => {
            error_codes::DUPLICATE_NAME
        }
        StorageError::CategoryInUse { .. } => error_codes::CATEGORY_IN_USE,
        StorageError::Query(_)
        | StorageError::Connection(_)
        | StorageError::InvalidData(_)
        | StorageError::Migration(_) => error_codes::STORAGE_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, HabitId};
    use serde_json::json;

    #[test]
    fn test_notification_has_no_id() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.id.is_none());
    }

    #[test]
    fn test_tool_result_uses_camel_case() {
        let value = serde_json::to_value(ToolCallResult::success("ok".to_string())).unwrap();
        assert_eq!(value["isError"], json!(false));
        assert!(value.get("errorCode").is_none());
        assert_eq!(value["content"][0]["type"], json!("text"));
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            storage_error_to_json_rpc_code(&StorageError::HabitNotFound { habit_id: HabitId(1) }),
            error_codes::HABIT_NOT_FOUND
        );
        assert_eq!(
            storage_error_to_json_rpc_code(&StorageError::Validation(DomainError::InvalidWeekday("x".into()))),
            error_codes::VALIDATION_ERROR
        );

        let result = ToolCallResult::from_storage_error(&StorageError::DuplicateHabit { name: "Run".into() });
        assert!(result.is_error);
        assert_eq!(result.error_code, Some(error_codes::DUPLICATE_NAME));
        assert!(result.content[0].text.contains("Run"));
    }
}
