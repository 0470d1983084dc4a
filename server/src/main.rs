mod broadcaster;
mod cleanup_task;
mod config;
mod proto_map;
mod session;
mod session_manager;
mod web_server;
mod ws_handler;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::{log, logger, server_message, ServerMessage, ServerShuttingDownNotification};

use broadcaster::Broadcaster;
use cleanup_task::CleanupTask;
use session_manager::SessionManager;

#[derive(Parser)]
#[command(name = "xo_server")]
struct Args {
    #[arg(long)]
    use_log_prefix: bool,

    #[arg(long, default_value = config::CONFIG_FILE)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config = config::get_config_manager(&args.config).get_config()?;

    let broadcaster = Broadcaster::new();
    let session_manager = SessionManager::new(
        broadcaster.clone(),
        Duration::from_millis(config.bot_think_delay_ms),
    );

    let cleanup_task = CleanupTask::new(
        session_manager.clone(),
        broadcaster.clone(),
        Duration::from_secs(config.cleanup_check_interval_secs),
        Duration::from_secs(config.session_inactivity_timeout_secs),
    );
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    let broadcaster_clone = broadcaster.clone();
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");

        log!("Shutdown signal received, notifying clients...");

        let shutdown_msg = ServerMessage {
            message: Some(server_message::Message::ServerShuttingDown(
                ServerShuttingDownNotification {
                    message: "Server is shutting down".to_string(),
                },
            )),
        };

        broadcaster_clone.broadcast_to_all(shutdown_msg).await;

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    };

    web_server::run_web_server(
        broadcaster,
        session_manager,
        &config.bind_address,
        PathBuf::from(&config.static_files_path),
        shutdown_signal,
    )
    .await?;

    log!("Server shut down gracefully");

    Ok(())
}
