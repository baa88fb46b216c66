pub mod azure;
pub mod compact_llm;
pub mod config;
pub mod mcp;
pub mod server;
