use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use common::{log, ClientId, ServerMessage};

pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Registry of per-client outbound channels. Send failures are logged,
/// never fatal.
#[derive(Clone)]
pub struct Broadcaster {
    clients: Arc<Mutex<HashMap<ClientId, ClientSender>>>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns false when the client id is already registered.
    pub async fn register(&self, client_id: ClientId, sender: ClientSender) -> bool {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&client_id) {
            return false;
        }
        clients.insert(client_id, sender);
        true
    }

    pub async fn unregister(&self, client_id: &ClientId) {
        self.clients.lock().await.remove(client_id);
    }

    pub async fn send_to_client(&self, client_id: &ClientId, message: ServerMessage) {
        let clients = self.clients.lock().await;
        if let Some(sender) = clients.get(client_id)
            && let Err(e) = sender.send(message).await
        {
            log!("Failed to send to client {}: {}", client_id, e);
        }
    }

    pub async fn broadcast_to_all(&self, message: ServerMessage) {
        let clients = self.clients.lock().await;
        for (client_id, sender) in clients.iter() {
            if let Err(e) = sender.send(message.clone()).await {
                log!("Failed to broadcast to client {}: {}", client_id, e);
            }
        }
    }
}
