use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use common::{log, ClientId};
use engine::{FirstMoveRule, Opponent};

use crate::broadcaster::Broadcaster;
use crate::session::XoSession;

/// Registry of live sessions, one per client id. Starting a match for a
/// client that already has one replaces the old session.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<ClientId, XoSession>>>,
    broadcaster: Broadcaster,
    bot_think_delay: Duration,
}

impl SessionManager {
    pub fn new(broadcaster: Broadcaster, bot_think_delay: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            broadcaster,
            bot_think_delay,
        }
    }

    pub async fn start_match(
        &self,
        client_id: &ClientId,
        opponent: Opponent,
        first_move: FirstMoveRule,
    ) {
        let previous = self.sessions.lock().await.remove(client_id);
        if let Some(previous) = previous {
            log!(
                "[session:{}] Replaced by a new match for client {}",
                previous.session_id,
                client_id
            );
            previous.close().await;
        }

        let session = XoSession::create(
            client_id.clone(),
            opponent,
            first_move,
            self.bot_think_delay,
        );
        self.sessions
            .lock()
            .await
            .insert(client_id.clone(), session.clone());

        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            session.run(broadcaster).await;
        });
    }

    pub async fn get_session(&self, client_id: &ClientId) -> Option<XoSession> {
        self.sessions.lock().await.get(client_id).cloned()
    }

    pub async fn close_session(&self, client_id: &ClientId) {
        let session = self.sessions.lock().await.remove(client_id);
        if let Some(session) = session {
            session.close().await;
            log!(
                "[session:{}] Closed for client {}",
                session.session_id,
                client_id
            );
        }
    }

    pub async fn idle_clients(&self, timeout: Duration) -> Vec<ClientId> {
        let sessions = self.sessions.lock().await;
        let mut idle = Vec::new();
        for (client_id, session) in sessions.iter() {
            if session.idle_for().await > timeout {
                idle.push(client_id.clone());
            }
        }
        idle
    }
}
