//! Shido: the rules core of a real-time Go teaching platform.
//!
//! This crate provides the board engine, move legality, the branching move
//! tree used for lessons and reviews, SGF import/export with full variation
//! support, and the turn-based session state machine that governs a live
//! match. Transport, rendering, persistence and identity are external; the
//! core is synchronous and snapshot-based throughout.
//!
//! ## Modules
//!
//! - [`constants`] - Board defaults and handicap star-point tables
//! - [`board`] - Board snapshots, stones, capture/liberty engine
//! - [`rules`] - Move legality, suicide and simple-ko checks, position hashing
//! - [`tree`] - Persistent branching move tree with a navigation cursor
//! - [`sgf`] - SGF parsing and generation
//! - [`session`] - Live match state machine (move/pass/resign, handicap)
//! - [`message`] - Broadcast payload contract and the session arbiter
//!
//! ## Example
//!
//! ```
//! use shido::board::{Board, Color, Stone};
//! use shido::rules::is_legal_move;
//! use shido::session::GameSession;
//!
//! // Boards are value-like: placing returns a new snapshot.
//! let board = Board::new(9).place(3, 3, Stone::new(Color::Black));
//! assert!(!is_legal_move(&board, 3, 3, Color::White, None));
//!
//! // A live match enforces turn order and tallies captures.
//! let mut session = GameSession::new("teacher", "student", 9, 0, 6.5);
//! session.play(Color::Black, 3, 3).unwrap();
//! assert_eq!(session.current_color, Color::White);
//! ```

pub mod board;
pub mod constants;
pub mod message;
pub mod rules;
pub mod session;
pub mod sgf;
pub mod tree;
