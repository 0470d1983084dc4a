use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};

use common::{log, server_message, ClientId, ServerMessage, SessionId};
use engine::{select_move, Difficulty, FirstMoveRule, MatchState, Opponent, RoundStatus, SessionRng};

use crate::broadcaster::Broadcaster;
use crate::proto_map;

/// One match session owned by one connected client. The run loop broadcasts
/// state, plays the bot's turns, and otherwise waits for commands to wake it.
#[derive(Clone)]
pub struct XoSession {
    pub session_id: SessionId,
    pub client_id: ClientId,
    state: Arc<Mutex<MatchState>>,
    rng: Arc<Mutex<SessionRng>>,
    turn_notify: Arc<Notify>,
    closed: Arc<Mutex<bool>>,
    last_activity: Arc<Mutex<Instant>>,
    bot_think_delay: Duration,
}

impl XoSession {
    pub fn create(
        client_id: ClientId,
        opponent: Opponent,
        first_move: FirstMoveRule,
        bot_think_delay: Duration,
    ) -> Self {
        let session_id = SessionId::new(common::id_generator::generate_session_id());
        let rng = SessionRng::from_random();
        log!(
            "[session:{}] Created for client {} with seed {}",
            session_id,
            client_id,
            rng.seed()
        );

        Self {
            session_id,
            client_id,
            state: Arc::new(Mutex::new(MatchState::new(opponent, first_move))),
            rng: Arc::new(Mutex::new(rng)),
            turn_notify: Arc::new(Notify::new()),
            closed: Arc::new(Mutex::new(false)),
            last_activity: Arc::new(Mutex::new(Instant::now())),
            bot_think_delay,
        }
    }

    pub async fn run(&self, broadcaster: Broadcaster) {
        let mut reported_round: Option<u32> = None;

        loop {
            self.broadcast_snapshot(&broadcaster).await;

            if *self.closed.lock().await {
                break;
            }

            let (round_over, round, bot_turn) = {
                let state = self.state.lock().await;
                (
                    state.status != RoundStatus::InProgress,
                    state.round,
                    state.bot_turn(),
                )
            };

            if round_over {
                if reported_round != Some(round) {
                    self.broadcast_round_over(&broadcaster).await;
                    reported_round = Some(round);
                }
                self.turn_notify.notified().await;
                continue;
            }

            if bot_turn.is_some() {
                self.play_bot_turn().await;
            } else {
                self.turn_notify.notified().await;
            }
        }

        log!("[session:{}] Session loop finished", self.session_id);
    }

    pub async fn close(&self) {
        *self.closed.lock().await = true;
        self.turn_notify.notify_one();
    }

    pub async fn idle_for(&self) -> Duration {
        self.last_activity.lock().await.elapsed()
    }

    async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    pub async fn handle_place_mark(&self, index: usize) -> Result<(), String> {
        self.touch().await;
        let mut state = self.state.lock().await;
        match state.place_client_mark(index) {
            Ok(()) => {
                drop(state);
                self.turn_notify.notify_one();
                Ok(())
            }
            Err(e) => {
                log!(
                    "[session:{}] Client {} failed to place mark at {}: {}",
                    self.session_id,
                    self.client_id,
                    index,
                    e
                );
                Err(e)
            }
        }
    }

    pub async fn handle_new_round(&self) -> Result<(), String> {
        self.touch().await;
        let mut state = self.state.lock().await;
        match state.start_next_round() {
            Ok(()) => {
                drop(state);
                self.turn_notify.notify_one();
                Ok(())
            }
            Err(e) => {
                log!("[session:{}] Failed to start next round: {}", self.session_id, e);
                Err(e)
            }
        }
    }

    pub async fn handle_reset_tally(&self) {
        self.touch().await;
        self.state.lock().await.reset_tally();
        self.turn_notify.notify_one();
    }

    pub async fn handle_set_difficulty(&self, difficulty: Difficulty) -> Result<(), String> {
        self.touch().await;
        let mut state = self.state.lock().await;
        match state.set_difficulty(difficulty) {
            Ok(()) => {
                drop(state);
                self.turn_notify.notify_one();
                Ok(())
            }
            Err(e) => {
                log!("[session:{}] Failed to set difficulty: {}", self.session_id, e);
                Err(e)
            }
        }
    }

    /// Sleeps the thinking delay outside the state lock, then re-checks the
    /// turn: a concurrent new-round or close may have changed the state, in
    /// which case the pending decision is discarded.
    async fn play_bot_turn(&self) {
        tokio::time::sleep(self.bot_think_delay).await;

        let mut state = self.state.lock().await;
        let Some((ai_mark, human_mark, difficulty)) = state.bot_turn() else {
            return;
        };

        let mut board = state.board.clone();
        let mut rng = self.rng.lock().await;
        match select_move(&mut board, ai_mark, human_mark, difficulty, &mut rng) {
            Ok(Some(index)) => {
                if let Err(e) = state.place_mark(index) {
                    log!(
                        "[session:{}] Bot failed to place mark at {}: {}",
                        self.session_id,
                        index,
                        e
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                log!("[session:{}] Bot move selection failed: {}", self.session_id, e);
            }
        }
    }

    async fn broadcast_snapshot(&self, broadcaster: &Broadcaster) {
        let state = self.state.lock().await;
        let snapshot = proto_map::build_snapshot(&state);
        drop(state);

        let message = ServerMessage {
            message: Some(server_message::Message::MatchState(snapshot)),
        };
        broadcaster.send_to_client(&self.client_id, message).await;
    }

    async fn broadcast_round_over(&self, broadcaster: &Broadcaster) {
        let state = self.state.lock().await;
        let notification = proto_map::build_round_over(&state);
        drop(state);

        let message = ServerMessage {
            message: Some(server_message::Message::RoundOver(notification)),
        };
        broadcaster.send_to_client(&self.client_id, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Mark;

    fn bot_session() -> XoSession {
        XoSession::create(
            ClientId::new("tester".to_string()),
            Opponent::Bot { mark: Mark::O, difficulty: Difficulty::Balanced },
            FirstMoveRule::XAlways,
            Duration::from_millis(0),
        )
    }

    #[tokio::test]
    async fn test_place_mark_rejected_during_bot_turn() {
        let session = bot_session();

        // The human opens as X; afterwards the bot's mark is to move and
        // further client commands must not place it.
        session.handle_place_mark(0).await.unwrap();
        assert_eq!(
            session.handle_place_mark(1).await,
            Err("Not your turn".to_string())
        );

        let state = session.state.lock().await;
        assert_eq!(state.board.get(1), None);
        assert_eq!(state.current_mark, Mark::O);
    }
}
