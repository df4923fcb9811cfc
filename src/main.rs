#[tokio::main]
async fn main() -> std::io::Result<()> {
    laserstrike_server::run_with_config().await
}
