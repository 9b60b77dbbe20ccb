use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    textract_bridge::runtime::run().await
}
