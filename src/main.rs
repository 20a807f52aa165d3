use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    perplexity_search_mcp::cli::run().await
}
