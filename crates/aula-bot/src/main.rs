use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    aula_bot::run().await
}
