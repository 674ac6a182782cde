//! Exercise a running relay end to end: health, optional upload, one question.
//!
//! cargo run -p paper_chat --example relay_smoke -- [path/to/paper.pdf]

use paper_chat::{AskRequest, RelayClient};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        std::env::var("RELAY_URL").unwrap_or_else(|_| "http://127.0.0.1:4000".to_string());
    let client = RelayClient::new(&base_url, None)?;

    println!("Health Check:");
    let health = client.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);

    if let Some(pdf) = std::env::args().nth(1).map(PathBuf::from) {
        println!("\nUpload:");
        let report = client.upload_pdf(&pdf).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    println!("\nQuestion:");
    let reply = client
        .ask(&AskRequest::new("What are the main contributions of this paper?"))
        .await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}
