/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication:
/// JSON-RPC message types, line-delimited stdio transport and tool routing.

pub mod protocol;
pub mod server;

// Re-export main types
pub use server::{tool_definitions, McpServer};
