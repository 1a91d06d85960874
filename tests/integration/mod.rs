/// Integration tests: the stdio tool server end to end and the SQLite store
/// across restarts

mod mcp_workflow;
mod persistence;
