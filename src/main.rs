#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopfront_app::run().await
}
