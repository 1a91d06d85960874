/// Tools exposed to MCP clients
///
/// Each tool takes a parameter struct (deserialized from the client's JSON
/// arguments), runs against any `HabitStorage`, and returns a response struct
/// with a human-readable `message` plus the structured data behind it.
/// Tools that depend on the date receive "today" from the caller.

pub mod categories;
pub mod create;
pub mod list;
pub mod log;
pub mod stats;
pub mod status;
pub mod update;

// Re-export tool functions for easy access
pub use categories::*;
pub use create::*;
pub use list::*;
pub use log::*;
pub use stats::*;
pub use status::*;
pub use update::*;

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for tools that take no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// "1 day", "3 days"
pub(crate) fn plural_days(count: u32) -> String {
    format!("{} day{}", count, if count == 1 { "" } else { "s" })
}
