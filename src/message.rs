//! Broadcast payload contract and the session arbiter.
//!
//! The transport that moves these messages between participants is external;
//! this module only defines the typed payloads and the pure handler that
//! turns an incoming message plus current state into the next state and an
//! optional outgoing broadcast. The [`Arbiter`] is the single authoritative
//! writer for its sessions: it validates requests sequentially in receipt
//! order and drops anything that fails validation silently, with no state
//! change and no rejection reply.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::constants::{DEFAULT_KOMI, DEFAULT_SIZE};
use crate::rules::board_hash;
use crate::session::{GameSession, SessionStatus};
use crate::tree::Marker;

/// The game-message taxonomy shared with the transport layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameMessage {
    /// Start a new session (teacher side).
    Create(CreatePayload),
    /// A participant requests a stone placement.
    Move(MovePayload),
    /// Authoritative state broadcast after an accepted action.
    BoardUpdate(BoardUpdatePayload),
    /// A participant requests a pass.
    Pass(PassPayload),
    /// A participant resigns.
    Resign(ResignPayload),
    /// The session is over.
    Ended(EndedPayload),
    /// Request/response for the list of live sessions.
    ListSync(ListSyncPayload),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatePayload {
    pub session_id: String,
    pub black_player: String,
    pub white_player: String,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub handicap: u32,
    #[serde(default = "default_komi")]
    pub komi: f32,
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn default_komi() -> f32 {
    DEFAULT_KOMI
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovePayload {
    pub session_id: String,
    /// Participant identity of the requester; mapped to a color by the
    /// arbiter, never trusted to name one directly.
    pub sender: String,
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassPayload {
    pub session_id: String,
    pub sender: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResignPayload {
    pub session_id: String,
    pub sender: String,
}

/// Authoritative board snapshot: the canonical grid encoding (rows joined
/// by `/`, `X`/`O`/`.` per intersection) plus the turn and display state a
/// client needs to render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardUpdatePayload {
    pub session_id: String,
    pub board_state: String,
    pub board_size: usize,
    pub next_color: Color,
    pub markers: Vec<Marker>,
    pub move_number: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndedPayload {
    pub session_id: String,
    pub result: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSyncPayload {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub black_player: String,
    pub white_player: String,
    pub size: usize,
    pub status: SessionStatus,
    pub move_count: usize,
}

/// The authoritative session host.
#[derive(Default)]
pub struct Arbiter {
    sessions: HashMap<String, GameSession>,
}

impl Arbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: &str) -> Option<&GameSession> {
        self.sessions.get(id)
    }

    /// Validate and apply one incoming message, in receipt order.
    ///
    /// Returns the broadcast to send back over the transport, or `None` when
    /// the request was dropped (unknown session, non-participant sender,
    /// wrong turn, illegal move, duplicate create). Dropped requests change
    /// nothing.
    pub fn handle(&mut self, msg: GameMessage) -> Option<GameMessage> {
        match msg {
            GameMessage::Create(p) => {
                if self.sessions.contains_key(&p.session_id) {
                    return None;
                }
                let session =
                    GameSession::new(p.black_player, p.white_player, p.size, p.handicap, p.komi);
                let update = board_update(&p.session_id, &session);
                self.sessions.insert(p.session_id, session);
                Some(update)
            }

            GameMessage::Move(p) => {
                let session = self.sessions.get_mut(&p.session_id)?;
                let color = session.color_of(&p.sender)?;
                session.play(color, p.x, p.y).ok()?;
                Some(board_update(&p.session_id, session))
            }

            GameMessage::Pass(p) => {
                let session = self.sessions.get_mut(&p.session_id)?;
                let color = session.color_of(&p.sender)?;
                match session.pass(color).ok()? {
                    SessionStatus::Playing => Some(board_update(&p.session_id, session)),
                    SessionStatus::Finished => Some(ended(&p.session_id, session)),
                }
            }

            GameMessage::Resign(p) => {
                let session = self.sessions.get_mut(&p.session_id)?;
                let color = session.color_of(&p.sender)?;
                session.resign(color).ok()?;
                Some(ended(&p.session_id, session))
            }

            GameMessage::ListSync(_) => {
                let mut sessions: Vec<SessionSummary> = self
                    .sessions
                    .iter()
                    .map(|(id, s)| SessionSummary {
                        session_id: id.clone(),
                        black_player: s.black_player.clone(),
                        white_player: s.white_player.clone(),
                        size: s.size,
                        status: s.status,
                        move_count: s.history.len(),
                    })
                    .collect();
                sessions.sort_by(|a, b| a.session_id.cmp(&b.session_id));
                Some(GameMessage::ListSync(ListSyncPayload { sessions }))
            }

            // Broadcast-only messages are never valid input.
            GameMessage::BoardUpdate(_) | GameMessage::Ended(_) => None,
        }
    }
}

fn board_update(session_id: &str, session: &GameSession) -> GameMessage {
    GameMessage::BoardUpdate(BoardUpdatePayload {
        session_id: session_id.to_string(),
        board_state: board_hash(&session.board),
        board_size: session.size,
        next_color: session.current_color,
        markers: Vec::new(),
        move_number: session.move_number,
    })
}

fn ended(session_id: &str, session: &GameSession) -> GameMessage {
    GameMessage::Ended(EndedPayload {
        session_id: session_id.to_string(),
        result: session.result.clone().unwrap_or_default(),
    })
}
