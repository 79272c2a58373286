use phone_verify_backend::start_web_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start_web_server().await
}
