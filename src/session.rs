//! Live-match state machine.
//!
//! A [`GameSession`] is one turn-based match between two participants. It is
//! deliberately linear (no branching): the branching [`crate::tree`] is for
//! lessons and reviews, the session is for actual play. All state lives in
//! the session value; rejected actions leave it untouched and the caller
//! decides how to surface that.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Move, Stone};
use crate::constants::handicap_points;
use crate::rules::{MoveError, board_hash, check_move};
use crate::sgf::{self, SgfGame, SgfMetadata};
use crate::tree::GameTree;

/// Result string recorded when a game ends by double pass with no agreed
/// score.
const NEUTRAL_RESULT: &str = "Void";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Playing,
    Finished,
}

/// Why a session action was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The game is already finished
    NotPlaying,
    /// It is the other color's turn
    OutOfTurn,
    /// The move fails the rules check
    Illegal(MoveError),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::NotPlaying => write!(f, "game is not in progress"),
            ActionError::OutOfTurn => write!(f, "not this color's turn"),
            ActionError::Illegal(e) => write!(f, "{e}"),
        }
    }
}

impl From<MoveError> for ActionError {
    fn from(e: MoveError) -> Self {
        ActionError::Illegal(e)
    }
}

/// One live match between two participant identities.
pub struct GameSession {
    pub black_player: String,
    pub white_player: String,
    pub size: usize,
    pub handicap: u32,
    pub komi: f32,
    pub status: SessionStatus,
    /// Current position snapshot.
    pub board: Board,
    /// The color whose move is next; flips after every accepted move or pass.
    pub current_color: Color,
    /// Every accepted move and pass, in order.
    pub history: Vec<Move>,
    pub captures_black: u32,
    pub captures_white: u32,
    /// Hash of the board before the opponent's last move; the ko snapshot
    /// for the next move's legality check.
    pub last_board_hash: Option<String>,
    /// Set once `status` is `Finished`.
    pub result: Option<String>,
    /// Number the next stone will carry.
    pub move_number: u32,
}

impl GameSession {
    /// Start a match. Handicap of 2 or more on a supported size (9, 13, 19)
    /// pre-places Black stones on the star points and gives White the
    /// opening move; in every other case the board starts empty and Black
    /// opens.
    pub fn new(
        black_player: impl Into<String>,
        white_player: impl Into<String>,
        size: usize,
        handicap: u32,
        komi: f32,
    ) -> Self {
        let mut board = Board::new(size);
        let seeded = handicap_points(size, handicap);
        for &(x, y) in seeded {
            board = board.place(x, y, Stone::new(Color::Black));
        }
        let current_color = if seeded.is_empty() {
            Color::Black
        } else {
            Color::White
        };
        Self {
            black_player: black_player.into(),
            white_player: white_player.into(),
            size,
            handicap,
            komi,
            status: SessionStatus::Playing,
            board,
            current_color,
            history: Vec::new(),
            captures_black: 0,
            captures_white: 0,
            last_board_hash: None,
            result: None,
            move_number: 1,
        }
    }

    /// The color a participant identity plays, if they are in this game.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        if player == self.black_player {
            Some(Color::Black)
        } else if player == self.white_player {
            Some(Color::White)
        } else {
            None
        }
    }

    fn require_turn(&self, color: Color) -> Result<(), ActionError> {
        if self.status != SessionStatus::Playing {
            return Err(ActionError::NotPlaying);
        }
        if color != self.current_color {
            return Err(ActionError::OutOfTurn);
        }
        Ok(())
    }

    /// Play a stone for `color`. On success returns the number of stones
    /// captured by the move; on any failure the session is unchanged.
    pub fn play(&mut self, color: Color, x: usize, y: usize) -> Result<u32, ActionError> {
        self.require_turn(color)?;
        check_move(&self.board, x, y, color, self.last_board_hash.as_deref())?;

        let pre_move_hash = board_hash(&self.board);
        let placed = self
            .board
            .place(x, y, Stone::numbered(color, self.move_number));
        let (resolved, captured) = placed.check_capture(x, y, color);

        match color {
            Color::Black => self.captures_black += captured,
            Color::White => self.captures_white += captured,
        }
        self.board = resolved;
        self.history.push(Move::play(x, y, color));
        self.last_board_hash = Some(pre_move_hash);
        self.move_number += 1;
        self.current_color = color.opponent();
        Ok(captured)
    }

    /// Pass for `color`. The second consecutive pass finishes the game with
    /// a neutral result. Returns the status after the pass.
    pub fn pass(&mut self, color: Color) -> Result<SessionStatus, ActionError> {
        self.require_turn(color)?;

        let consecutive = self.history.last().is_some_and(Move::is_pass);
        self.last_board_hash = Some(board_hash(&self.board));
        self.history.push(Move::pass(color));
        self.current_color = color.opponent();
        if consecutive {
            self.status = SessionStatus::Finished;
            self.result = Some(NEUTRAL_RESULT.to_string());
        }
        Ok(self.status)
    }

    /// Resign as `color`, regardless of whose turn it is. The opponent wins
    /// with result `"<Other>+R"`.
    pub fn resign(&mut self, color: Color) -> Result<(), ActionError> {
        if self.status != SessionStatus::Playing {
            return Err(ActionError::NotPlaying);
        }
        self.status = SessionStatus::Finished;
        self.result = Some(format!("{}+R", color.opponent().letter()));
        Ok(())
    }

    /// Export the match as SGF: handicap stones as root setup, the full
    /// history as the single line of play, and the session facts as
    /// metadata. This is the hand-off surface for persistence once a game
    /// finishes.
    pub fn to_sgf(&self) -> String {
        let mut tree = GameTree::new(self.size);
        let seeded = handicap_points(self.size, self.handicap);
        if !seeded.is_empty() {
            let mut root_board = Board::new(self.size);
            for &(x, y) in seeded {
                root_board = root_board.place(x, y, Stone::new(Color::Black));
            }
            tree.set_root_board(root_board);
        }
        let mut cur = tree.root();
        for &mv in &self.history {
            cur = tree.add_move(cur, mv);
        }

        let metadata = SgfMetadata {
            black_player: Some(self.black_player.clone()),
            white_player: Some(self.white_player.clone()),
            komi: Some(self.komi.to_string()),
            handicap: (self.handicap >= 2).then(|| self.handicap.to_string()),
            result: self.result.clone(),
            ..SgfMetadata::default()
        };
        sgf::generate(&SgfGame { tree, metadata })
    }
}
