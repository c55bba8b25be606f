use super::lobby::Lobby;
use rvb_core::ConnectionId;
use rvb_core::SEND_BUFFER;
use rvb_core::SessionId;
use rvb_gameroom::ClientMessage;
use rvb_gameroom::Command;
use rvb_gameroom::CommandKind;
use rvb_gameroom::Protocol;
use rvb_gameroom::ServerMessage;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::channel;
use tokio::sync::oneshot;

/// One joined room, from the connection's point of view.
struct Joined {
    code: String,
    session: SessionId,
    tx: UnboundedSender<Command>,
}

/// Spawns the per-connection WebSocket task.
///
/// Inbound frames decode at this boundary and become room commands; every
/// command is answered with an `ack` frame carrying the room's reply.
/// Outbound traffic arrives through the connection's bounded sink, which
/// the lobby fills; if this task cannot drain it fast enough the lobby
/// closes the sink and the task winds down.
///
/// A malformed frame is fatal to the connection, never to the room.
pub async fn serve(
    lobby: Arc<Lobby>,
    session: actix_ws::Session,
    stream: actix_ws::MessageStream,
) {
    let connection = ConnectionId::default();
    actix_web::rt::spawn(drive(lobby, connection, session, stream));
}

async fn drive(
    lobby: Arc<Lobby>,
    connection: ConnectionId,
    mut ws: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    use futures::StreamExt;
    let (sink, mut outbound) = channel::<String>(SEND_BUFFER);
    let mut joined: Option<Joined> = None;
    log::debug!("[bridge {}] connected", connection);
    'conn: loop {
        tokio::select! {
            biased;
            frame = outbound.recv() => match frame {
                Some(json) => {
                    if ws.text(json).await.is_err() {
                        break 'conn;
                    }
                }
                // the lobby dropped our sink: room gone or we were too slow
                None => break 'conn,
            },
            message = stream.next() => match message {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    match handle_frame(&lobby, connection, &sink, &mut joined, &text).await {
                        Ok(Some(reply)) => {
                            if ws.text(reply.to_json()).await.is_err() {
                                break 'conn;
                            }
                        }
                        Ok(None) => {}
                        Err(fatal) => {
                            log::warn!("[bridge {}] {}", connection, fatal);
                            break 'conn;
                        }
                    }
                }
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if ws.pong(&bytes).await.is_err() {
                        break 'conn;
                    }
                }
                Some(Ok(actix_ws::Message::Close(_))) | None => break 'conn,
                Some(Err(_)) => break 'conn,
                Some(Ok(_)) => {}
            },
        }
    }
    // connection teardown: the room treats it as the player leaving
    if let Some((session, room)) = lobby.sessions().drop_connection(connection) {
        if let Some(code) = room {
            lobby.detach(&code, session).await;
            if let Some(joined) = joined {
                let _ = joined.tx.send(Command::Disconnect { session });
            }
        }
    }
    let _ = ws.close(None).await;
    log::debug!("[bridge {}] disconnected", connection);
}

/// Handles one inbound text frame. `Ok(Some)` is the ack to send back;
/// `Err` means the connection must be terminated.
async fn handle_frame(
    lobby: &Arc<Lobby>,
    connection: ConnectionId,
    sink: &super::lobby::Sink,
    joined: &mut Option<Joined>,
    text: &str,
) -> anyhow::Result<Option<ServerMessage>> {
    let message =
        Protocol::decode(text).map_err(|e| anyhow::anyhow!("malformed payload: {}", e))?;
    let label = message.label();
    match &message {
        ClientMessage::JoinRoom {
            room_id,
            username,
            session_id,
        } => {
            if joined.is_some() {
                return Ok(Some(nack(label, "already in a room")));
            }
            let session = SessionId::from(*session_id);
            if !lobby.exists(room_id).await {
                return Ok(Some(nack(label, "room not found")));
            }
            if let Err(refusal) =
                lobby
                    .sessions()
                    .join_room(session, connection, room_id, username)
            {
                return Ok(Some(nack(label, refusal)));
            }
            let Some(tx) = lobby.attach(room_id, session, sink.clone()).await else {
                lobby.sessions().leave_room(session);
                return Ok(Some(nack(label, "room not found")));
            };
            let ack = dispatch(
                &tx,
                session,
                CommandKind::Join {
                    name: username.clone(),
                },
            )
            .await?;
            if ack.success {
                *joined = Some(Joined {
                    code: room_id.clone(),
                    session,
                    tx,
                });
            } else {
                lobby.detach(room_id, session).await;
                lobby.sessions().leave_room(session);
            }
            Ok(Some(wire(label, ack)))
        }
        _ => {
            let Some(current) = joined.as_ref() else {
                return Ok(Some(nack(label, "not in a room")));
            };
            let kind = match Protocol::command(&message) {
                Ok(kind) => kind,
                Err(reason) => return Ok(Some(nack(label, reason))),
            };
            let leaving = matches!(kind, CommandKind::Leave);
            let ack = dispatch(&current.tx, current.session, kind).await?;
            if leaving && ack.success {
                lobby.detach(&current.code, current.session).await;
                lobby.sessions().leave_room(current.session);
                *joined = None;
            }
            Ok(Some(wire(label, ack)))
        }
    }
}

/// Sends one command into a room and awaits its ack. A dead actor is
/// fatal to the connection.
async fn dispatch(
    tx: &UnboundedSender<Command>,
    from: SessionId,
    kind: CommandKind,
) -> anyhow::Result<rvb_gameroom::Ack> {
    let (ack_tx, ack_rx) = oneshot::channel();
    tx.send(Command::Client {
        from,
        kind,
        ack: ack_tx,
    })
    .map_err(|_| anyhow::anyhow!("room actor is gone"))?;
    ack_rx
        .await
        .map_err(|_| anyhow::anyhow!("room actor dropped the ack"))
}

fn wire(cmd: &str, ack: rvb_gameroom::Ack) -> ServerMessage {
    ServerMessage::Ack {
        cmd: cmd.to_string(),
        success: ack.success,
        error: ack.error,
        body: ack.body,
    }
}

fn nack(cmd: &str, error: impl std::fmt::Display) -> ServerMessage {
    ServerMessage::Ack {
        cmd: cmd.to_string(),
        success: false,
        error: Some(error.to_string()),
        body: serde_json::Map::new(),
    }
}
