//! perplexity-search-mcp library
//!
//! This library exports the search tool and its MCP server for testing and potential reuse.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod server;
pub mod tool;

pub use error::{ProviderError, ProviderErrorKind, SearchToolError};
