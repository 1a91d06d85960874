/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests line by line from stdin
/// 2. Runs the daily reset and then the requested tool
/// 3. Sends JSON-RPC responses to stdout

use chrono::NaiveDate;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::storage::StorageError;
use crate::tools;
use crate::{HabitTrackerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client has sent its `initialized` notification
    initialized: bool,
}

fn tool_definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let input_schema = serde_json::to_value(schema_for!(P))
        .unwrap_or_else(|_| json!({"type": "object"}));

    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Every tool this server offers, with input schemas derived from the
/// parameter types
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool_definition::<tools::NoParams>(
            "habit_today",
            "Show the habits scheduled for today and whether each one is done",
        ),
        tool_definition::<tools::MarkDoneParams>(
            "habit_mark_done",
            "Mark a habit as done for today",
        ),
        tool_definition::<tools::MarkDoneParams>(
            "habit_unmark_done",
            "Undo today's completion of a habit",
        ),
        tool_definition::<tools::ListHabitsParams>(
            "habit_list",
            "List all habits with their category, scheduled weekdays, streaks and completion rates",
        ),
        tool_definition::<tools::CreateHabitParams>(
            "habit_create",
            "Create a new habit scheduled on specific weekdays",
        ),
        tool_definition::<tools::UpdateHabitParams>(
            "habit_update",
            "Change a habit's name, description, category or weekdays",
        ),
        tool_definition::<tools::DeleteHabitParams>(
            "habit_delete",
            "Delete a habit; it is kept in the deleted-habit history",
        ),
        tool_definition::<tools::AgendaParams>(
            "habit_agenda",
            "Show which habits are scheduled on each day of the week",
        ),
        tool_definition::<tools::NoParams>(
            "habit_history",
            "List habits that have been deleted",
        ),
        tool_definition::<tools::StatusParams>(
            "habit_status",
            "Check streaks, completion rates and rewards for one or all habits",
        ),
        tool_definition::<tools::StatsParams>(
            "habit_stats",
            "Statistics: most done habits, productive days, weekday and category distributions, insights",
        ),
        tool_definition::<tools::NoParams>(
            "category_list",
            "List categories and how many habits each one has",
        ),
        tool_definition::<tools::CreateCategoryParams>(
            "category_create",
            "Create a new category",
        ),
        tool_definition::<tools::UpdateCategoryParams>(
            "category_update",
            "Rename or re-describe a category",
        ),
        tool_definition::<tools::DeleteCategoryParams>(
            "category_delete",
            "Delete a category that has no habits",
        ),
    ]
}

/// Parse tool arguments, run the tool and render its response
///
/// The response's `message` becomes the first text block; the remaining
/// fields are returned as JSON in a second block.
fn invoke<P, R, F>(arguments: Value, tool: F) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> Result<R, StorageError>,
{
    let params: P = match serde_json::from_value(arguments) {
        Ok(params) => params,
        Err(e) => {
            return ToolCallResult::error(error_codes::INVALID_PARAMS, format!("Invalid arguments: {}", e));
        }
    };

    let response = match tool(params) {
        Ok(response) => response,
        Err(e) => {
            warn!("Tool failed: {}", e);
            return ToolCallResult::from_storage_error(&e);
        }
    };

    let mut data = match serde_json::to_value(&response) {
        Ok(data) => data,
        Err(e) => return ToolCallResult::error(error_codes::INTERNAL_ERROR, e.to_string()),
    };

    let message = data
        .as_object_mut()
        .and_then(|fields| fields.remove("message"))
        .and_then(|message| message.as_str().map(str::to_string))
        .unwrap_or_default();

    ToolCallResult::with_data(message, &data)
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC from `reader` until it is exhausted
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(None) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(Some(line)) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        // Write response + newline
                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => {
                    let client = init
                        .client_info
                        .map(|c| format!("{} {}", c.name, c.version))
                        .unwrap_or_else(|| "unknown client".to_string());
                    info!("MCP client connected: {} (protocol {})", client, init.protocol_version);
                }
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid initialize parameters: {}", e),
                        None,
                    );
                }
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    /// Handle tools/call request
    ///
    /// Every call starts a new interaction cycle, so the daily reset runs
    /// before the tool reads any done flag.
    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = match self.habit_tracker.start_interaction() {
            Ok(today) => self.call_tool(&tool_params.name, Value::Object(tool_params.arguments), today),
            Err(e) => {
                error!("Daily reset failed: {}", e);
                ToolCallResult::from_storage_error(&e)
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    /// Route a tool call to its implementation
    fn call_tool(&self, name: &str, arguments: Value, today: NaiveDate) -> ToolCallResult {
        let storage = self.habit_tracker.storage();
        debug!("Calling tool '{}' for {}", name, today);

        match name {
            "habit_today" => invoke(arguments, |p| tools::habit_today(storage, p, today)),
            "habit_mark_done" => invoke(arguments, |p| tools::mark_done(storage, p, today)),
            "habit_unmark_done" => invoke(arguments, |p| tools::unmark_done(storage, p, today)),
            "habit_list" => invoke(arguments, |p| tools::list_habits(storage, p, today)),
            "habit_create" => invoke(arguments, |p| tools::create_habit(storage, p)),
            "habit_update" => invoke(arguments, |p| tools::update_habit(storage, p)),
            "habit_delete" => invoke(arguments, |p| tools::delete_habit(storage, p)),
            "habit_agenda" => invoke(arguments, |p| tools::habit_agenda(storage, p, today)),
            "habit_history" => invoke(arguments, |p| tools::habit_history(storage, p)),
            "habit_status" => invoke(arguments, |p| tools::habit_status(storage, p, today)),
            "habit_stats" => invoke(arguments, |p| tools::habit_stats(storage, p, today)),
            "category_list" => invoke(arguments, |p| tools::list_categories(storage, p)),
            "category_create" => invoke(arguments, |p| tools::create_category(storage, p)),
            "category_update" => invoke(arguments, |p| tools::update_category(storage, p)),
            "category_delete" => invoke(arguments, |p| tools::delete_category(storage, p)),
            _ => ToolCallResult::error(
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", name),
            ),
        }
    }
}
