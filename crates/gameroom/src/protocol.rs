use super::command::CommandKind;
use rvb_core::Chips;
use rvb_core::Position;
use rvb_gameplay::Action;
use rvb_gameplay::Fixture;
use serde::Deserialize;

/// Commands accepted from clients, one variant per wire command.
///
/// Payload keys are camelCase to match the client; malformed payloads are
/// rejected at this boundary, before anything reaches a room actor.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        username: String,
        session_id: uuid::Uuid,
    },
    #[serde(rename_all = "camelCase")]
    RequestSeat { seat_index: Position, buy_in: Chips },
    #[serde(rename_all = "camelCase")]
    ApproveSeat { request_id: uuid::Uuid },
    #[serde(rename_all = "camelCase")]
    DenySeat { request_id: uuid::Uuid },
    CancelSeatRequest,
    LeaveSeat,
    StartGame,
    PauseGame,
    ResumeGame,
    StopGame,
    PlayerAction {
        action: String,
        #[serde(default)]
        amount: Option<Chips>,
    },
    ShowHand,
    MuckHand,
    RunItTwiceVote { accept: bool },
    LeaveRoom,
    GodModeEnable { secret: String },
    #[serde(rename_all = "camelCase")]
    SetRiggedHand {
        #[serde(default)]
        #[allow(unused)]
        secret: Option<String>,
        hand_type: String,
    },
    GodModeDisable,
}

impl ClientMessage {
    /// Wire label echoed back on the ack.
    pub fn label(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join_room",
            Self::RequestSeat { .. } => "request_seat",
            Self::ApproveSeat { .. } => "approve_seat",
            Self::DenySeat { .. } => "deny_seat",
            Self::CancelSeatRequest => "cancel_seat_request",
            Self::LeaveSeat => "leave_seat",
            Self::StartGame => "start_game",
            Self::PauseGame => "pause_game",
            Self::ResumeGame => "resume_game",
            Self::StopGame => "stop_game",
            Self::PlayerAction { .. } => "player_action",
            Self::ShowHand => "show_hand",
            Self::MuckHand => "muck_hand",
            Self::RunItTwiceVote { .. } => "run_it_twice_vote",
            Self::LeaveRoom => "leave_room",
            Self::GodModeEnable { .. } => "god_mode_enable",
            Self::SetRiggedHand { .. } => "set_rigged_hand",
            Self::GodModeDisable => "god_mode_disable",
        }
    }
}

/// Client JSON ⇄ typed command translation.
pub struct Protocol;

impl Protocol {
    /// Parses one inbound text frame. A failure here is a malformed
    /// payload: the connection is terminated, not the room.
    pub fn decode(text: &str) -> Result<ClientMessage, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Maps a parsed message onto a room command. `JoinRoom` and
    /// `LeaveRoom` also carry meaning for the session layer; their room
    /// halves are `Join` and `Leave`.
    pub fn command(message: &ClientMessage) -> Result<CommandKind, String> {
        match message {
            ClientMessage::JoinRoom { username, .. } => Ok(CommandKind::Join {
                name: username.clone(),
            }),
            ClientMessage::LeaveRoom => Ok(CommandKind::Leave),
            ClientMessage::RequestSeat { seat_index, buy_in } => Ok(CommandKind::RequestSeat {
                seat: *seat_index,
                buyin: *buy_in,
            }),
            ClientMessage::ApproveSeat { request_id } => Ok(CommandKind::ApproveSeat {
                request: rvb_core::ID::from(*request_id),
            }),
            ClientMessage::DenySeat { request_id } => Ok(CommandKind::DenySeat {
                request: rvb_core::ID::from(*request_id),
            }),
            ClientMessage::CancelSeatRequest => Ok(CommandKind::CancelSeatRequest),
            ClientMessage::LeaveSeat => Ok(CommandKind::LeaveSeat),
            ClientMessage::StartGame => Ok(CommandKind::StartGame),
            ClientMessage::PauseGame => Ok(CommandKind::PauseGame),
            ClientMessage::ResumeGame => Ok(CommandKind::ResumeGame),
            ClientMessage::StopGame => Ok(CommandKind::StopGame),
            ClientMessage::PlayerAction { action, amount } => {
                Action::try_from((action.as_str(), *amount))
                    .map(|action| CommandKind::PlayerAction { action })
            }
            ClientMessage::ShowHand => Ok(CommandKind::ShowHand),
            ClientMessage::MuckHand => Ok(CommandKind::MuckHand),
            ClientMessage::RunItTwiceVote { accept } => {
                Ok(CommandKind::RitVote { accept: *accept })
            }
            ClientMessage::GodModeEnable { secret } => Ok(CommandKind::GodEnable {
                secret: secret.clone(),
            }),
            ClientMessage::GodModeDisable => Ok(CommandKind::GodDisable),
            ClientMessage::SetRiggedHand { hand_type, .. } => Fixture::try_from(hand_type.as_str())
                .map(|fixture| CommandKind::SetRiggedHand { fixture }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_join_room() {
        let msg = Protocol::decode(
            r#"{"type":"join_room","roomId":"QK2J9","username":"alice","sessionId":"0191f3a0-7b9d-7e5e-b7a1-111111111111"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { .. }));
        assert_eq!(msg.label(), "join_room");
    }

    #[test]
    fn decodes_player_actions() {
        let msg =
            Protocol::decode(r#"{"type":"player_action","action":"raise","amount":40}"#).unwrap();
        let kind = Protocol::command(&msg).unwrap();
        assert!(matches!(
            kind,
            CommandKind::PlayerAction {
                action: Action::Raise(40)
            }
        ));
        let msg = Protocol::decode(r#"{"type":"player_action","action":"fold"}"#).unwrap();
        assert!(Protocol::command(&msg).is_ok());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(Protocol::decode("not json").is_err());
        assert!(Protocol::decode(r#"{"type":"no_such_command"}"#).is_err());
        assert!(Protocol::decode(r#"{"type":"request_seat","seatIndex":"one"}"#).is_err());
        let msg = Protocol::decode(r#"{"type":"player_action","action":"raise"}"#).unwrap();
        assert!(Protocol::command(&msg).is_err(), "raise without amount");
    }

    #[test]
    fn decodes_rigged_hand_types() {
        let msg = Protocol::decode(
            r#"{"type":"set_rigged_hand","secret":"hunter2","handType":"royal_flush"}"#,
        )
        .unwrap();
        let kind = Protocol::command(&msg).unwrap();
        assert!(matches!(
            kind,
            CommandKind::SetRiggedHand {
                fixture: Fixture::RoyalFlush
            }
        ));
    }
}
