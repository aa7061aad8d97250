//! gsx CLI entry point

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gsx_cli::run().await
}
