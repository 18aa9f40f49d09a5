use tiffin_server::{Config, Server, ServerState};
use tiffin_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.logs_dir();
    logger::init_logger_with_file(
        if config.is_production() { "info" } else { "debug" },
        config.is_production(),
        log_dir.to_str(),
    )?;

    tracing::info!("Tiffin marketplace server starting...");

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
