pub mod client;
pub mod invoker;
pub mod perplexity_search;
pub mod request_log;
pub mod types;
pub mod validate;

pub use perplexity_search::{PerplexitySearchTool, ToolRun, TOOL_NAME};
pub use types::{SearchArgs, SearchRequest, SearchResponse, SearchResult};
