use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::sync::mpsc;

use common::{
    client_message, log, server_message, ClientId, ClientMessage, ErrorCode, ErrorResponse,
    PongResponse, ServerMessage,
};

use crate::broadcaster::Broadcaster;
use crate::proto_map;
use crate::session_manager::SessionManager;
use crate::web_server::WebServerState;

pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(128);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut buf = Vec::new();
            if msg.encode(&mut buf).is_ok()
                && ws_sender.send(Message::Binary(buf.into())).await.is_err()
            {
                break;
            }
        }
    });

    let broadcaster = state.broadcaster;
    let session_manager = state.session_manager;

    let mut client_id_opt: Option<ClientId> = None;

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(msg) => {
                let data = match msg {
                    Message::Binary(data) => data.to_vec(),
                    Message::Close(_) => break,
                    _ => continue,
                };

                let client_message = match ClientMessage::decode(data.as_slice()) {
                    Ok(m) => m,
                    Err(e) => {
                        log!("Failed to decode ClientMessage: {}", e);
                        continue;
                    }
                };

                let server_version = common::version::get_version();
                if client_message.version != server_version {
                    let error_msg = make_error_response(
                        ErrorCode::VersionMismatch,
                        format!(
                            "Version mismatch: client version '{}', server version '{}'",
                            client_message.version, server_version
                        ),
                    );
                    send_to_client(&tx, error_msg, client_id_opt.as_ref()).await;
                    break;
                }

                if let Some(message) = client_message.message {
                    match message {
                        client_message::Message::Connect(connect_req) => {
                            if client_id_opt.is_some() {
                                send_to_client(
                                    &tx,
                                    make_error_response(
                                        ErrorCode::InvalidCommand,
                                        "Already connected".to_string(),
                                    ),
                                    client_id_opt.as_ref(),
                                )
                                .await;
                                continue;
                            }

                            if connect_req.client_id.is_empty() {
                                send_to_client(
                                    &tx,
                                    make_error_response(
                                        ErrorCode::InvalidCommand,
                                        "Client ID must not be empty".to_string(),
                                    ),
                                    None,
                                )
                                .await;
                                continue;
                            }

                            let client_id = ClientId::new(connect_req.client_id);

                            if !broadcaster.register(client_id.clone(), tx.clone()).await {
                                send_to_client(
                                    &tx,
                                    make_error_response(
                                        ErrorCode::InvalidCommand,
                                        "Client ID already connected".to_string(),
                                    ),
                                    Some(&client_id),
                                )
                                .await;
                                break;
                            }

                            client_id_opt = Some(client_id);
                            log!(
                                "WebSocket client connected: {}",
                                client_id_opt.as_ref().unwrap()
                            );
                        }
                        client_message::Message::Disconnect(_) => {
                            if let Some(client_id) = &client_id_opt {
                                log!("WebSocket client requested disconnect: {}", client_id);
                                handle_client_disconnected(&broadcaster, &session_manager, client_id)
                                    .await;
                                client_id_opt = None;
                            }
                            break;
                        }
                        client_message::Message::StartMatch(req) => {
                            if let Some(client_id) = &client_id_opt {
                                handle_start_match(&session_manager, &tx, client_id, req).await;
                            } else {
                                send_not_connected_error(&tx, "start a match").await;
                            }
                        }
                        client_message::Message::PlaceMark(cmd) => {
                            if let Some(client_id) = &client_id_opt {
                                handle_place_mark(&session_manager, &tx, client_id, cmd).await;
                            } else {
                                send_not_connected_error(&tx, "place a mark").await;
                            }
                        }
                        client_message::Message::NewRound(_) => {
                            if let Some(client_id) = &client_id_opt {
                                handle_new_round(&session_manager, &tx, client_id).await;
                            } else {
                                send_not_connected_error(&tx, "start a new round").await;
                            }
                        }
                        client_message::Message::ResetTally(_) => {
                            if let Some(client_id) = &client_id_opt {
                                handle_reset_tally(&session_manager, &tx, client_id).await;
                            } else {
                                send_not_connected_error(&tx, "reset the tally").await;
                            }
                        }
                        client_message::Message::SetDifficulty(req) => {
                            if let Some(client_id) = &client_id_opt {
                                handle_set_difficulty(&session_manager, &tx, client_id, req).await;
                            } else {
                                send_not_connected_error(&tx, "set the difficulty").await;
                            }
                        }
                        client_message::Message::Ping(req) => {
                            let pong = ServerMessage {
                                message: Some(server_message::Message::Pong(PongResponse {
                                    ping_id: req.ping_id,
                                    client_timestamp_ms: req.client_timestamp_ms,
                                })),
                            };
                            send_to_client(&tx, pong, client_id_opt.as_ref()).await;
                        }
                    }
                }
            }
            Err(e) => {
                log!("WebSocket error: {}", e);
                break;
            }
        }
    }

    if let Some(client_id) = &client_id_opt {
        log!("WebSocket connection ended for client: {}", client_id);
        handle_client_disconnected(&broadcaster, &session_manager, client_id).await;
    }

    send_task.abort();
}

async fn handle_start_match(
    session_manager: &SessionManager,
    tx: &mpsc::Sender<ServerMessage>,
    client_id: &ClientId,
    req: common::StartMatchRequest,
) {
    let opponent = match proto_map::opponent_from_proto(&req) {
        Ok(opponent) => opponent,
        Err(e) => {
            send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
                .await;
            return;
        }
    };

    let first_move = match proto_map::first_move_from_proto(req.first_move) {
        Ok(rule) => rule,
        Err(e) => {
            send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
                .await;
            return;
        }
    };

    session_manager.start_match(client_id, opponent, first_move).await;
}

async fn handle_place_mark(
    session_manager: &SessionManager,
    tx: &mpsc::Sender<ServerMessage>,
    client_id: &ClientId,
    cmd: common::PlaceMarkCommand,
) {
    let Some(session) = session_manager.get_session(client_id).await else {
        send_no_active_match_error(tx, client_id).await;
        return;
    };

    if let Err(e) = session.handle_place_mark(cmd.cell as usize).await {
        send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
            .await;
    }
}

async fn handle_new_round(
    session_manager: &SessionManager,
    tx: &mpsc::Sender<ServerMessage>,
    client_id: &ClientId,
) {
    let Some(session) = session_manager.get_session(client_id).await else {
        send_no_active_match_error(tx, client_id).await;
        return;
    };

    if let Err(e) = session.handle_new_round().await {
        send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
            .await;
    }
}

async fn handle_reset_tally(
    session_manager: &SessionManager,
    tx: &mpsc::Sender<ServerMessage>,
    client_id: &ClientId,
) {
    let Some(session) = session_manager.get_session(client_id).await else {
        send_no_active_match_error(tx, client_id).await;
        return;
    };

    session.handle_reset_tally().await;
}

async fn handle_set_difficulty(
    session_manager: &SessionManager,
    tx: &mpsc::Sender<ServerMessage>,
    client_id: &ClientId,
    req: common::SetDifficultyRequest,
) {
    let difficulty = match proto_map::difficulty_from_proto(req.difficulty) {
        Ok(difficulty) => difficulty,
        Err(e) => {
            send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
                .await;
            return;
        }
    };

    let Some(session) = session_manager.get_session(client_id).await else {
        send_no_active_match_error(tx, client_id).await;
        return;
    };

    if let Err(e) = session.handle_set_difficulty(difficulty).await {
        send_to_client(tx, make_error_response(ErrorCode::InvalidCommand, e), Some(client_id))
            .await;
    }
}

async fn handle_client_disconnected(
    broadcaster: &Broadcaster,
    session_manager: &SessionManager,
    client_id: &ClientId,
) {
    broadcaster.unregister(client_id).await;
    session_manager.close_session(client_id).await;
}

async fn send_to_client(
    tx: &mpsc::Sender<ServerMessage>,
    message: ServerMessage,
    client_id: Option<&ClientId>,
) {
    if let Err(e) = tx.send(message).await {
        let client_str = client_id.map_or("unknown".to_string(), |id| id.to_string());
        log!("[ws:{}] Failed to send message: {}", client_str, e);
    }
}

async fn send_not_connected_error(tx: &mpsc::Sender<ServerMessage>, action: &str) {
    send_to_client(
        tx,
        make_error_response(ErrorCode::NotConnected, format!("Not connected: cannot {}", action)),
        None,
    )
    .await;
}

async fn send_no_active_match_error(tx: &mpsc::Sender<ServerMessage>, client_id: &ClientId) {
    send_to_client(
        tx,
        make_error_response(ErrorCode::InvalidCommand, "No active match".to_string()),
        Some(client_id),
    )
    .await;
}

fn make_error_response(code: ErrorCode, message: String) -> ServerMessage {
    ServerMessage {
        message: Some(server_message::Message::Error(ErrorResponse {
            code: code.into(),
            message,
        })),
    }
}
