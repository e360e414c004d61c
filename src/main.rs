use std::path::PathBuf;

use bookshelf_mcp::infra::json_store::DEFAULT_DATA_FILE;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    // stdoutはMCPプロトコル専用
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let data_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BOOKSHELF_DATA").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    bookshelf_mcp::interface::mcp::run(data_path).await
}
