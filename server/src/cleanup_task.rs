use std::time::Duration;

use common::{log, server_message, ErrorCode, ErrorResponse, ServerMessage};

use crate::broadcaster::Broadcaster;
use crate::session_manager::SessionManager;

/// Periodically closes sessions whose owner has gone quiet.
pub struct CleanupTask {
    session_manager: SessionManager,
    broadcaster: Broadcaster,
    check_interval: Duration,
    inactivity_timeout: Duration,
}

impl CleanupTask {
    pub fn new(
        session_manager: SessionManager,
        broadcaster: Broadcaster,
        check_interval: Duration,
        inactivity_timeout: Duration,
    ) -> Self {
        Self {
            session_manager,
            broadcaster,
            check_interval,
            inactivity_timeout,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_inactive_sessions().await;
        }
    }

    async fn cleanup_inactive_sessions(&self) {
        let idle_clients = self.session_manager.idle_clients(self.inactivity_timeout).await;

        for client_id in idle_clients {
            log!("Cleaning up inactive session for client: {}", client_id);

            let notification = ServerMessage {
                message: Some(server_message::Message::Error(ErrorResponse {
                    code: ErrorCode::Unspecified.into(),
                    message: "Session closed due to inactivity".to_string(),
                })),
            };
            self.broadcaster.send_to_client(&client_id, notification).await;

            self.session_manager.close_session(&client_id).await;
        }
    }
}
