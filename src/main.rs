#[tokio::main]
async fn main() -> std::io::Result<()> {
    entity_runtime::run_with_config().await
}
