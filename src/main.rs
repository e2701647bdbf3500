//! RAX chat server - Entry Point

use env_logger::Env;
use log::info;

use rax_chat_server::error::ServerError;
use rax_chat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Launching chat server...");

    let config = ServerConfig::load()?;
    let server = Server::bind(config).await?;
    server.run().await;

    info!("Chat server stopped");
    Ok(())
}
