#[tokio::main]
async fn main() -> anyhow::Result<()> {
    formscout_server::start().await
}
