use menu_server::{init_logger_with_file, Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    init_logger_with_file(config.log_level.as_deref(), config.log_dir.as_deref());

    tracing::info!(
        instance = %config.instance_id,
        role = ?config.role,
        "Menu server starting..."
    );

    // Initialize server state (db, vault, peer sync)
    let state = ServerState::initialize(&config).await?;

    // Start the HTTP server
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
