//! # Clue-Less
//!
//! A turn-based multiplayer deduction game server: a simplified
//! Clue-style board played over a line-oriented TCP protocol.
//!
//! The board is a 5x5 grid of rooms, hallways, and unreachable void
//! cells. Players join as one of six fixed characters, move one cell
//! per turn, make suggestions from rooms, resolve them through a
//! clockwise disprove walk, and win by accusing the hidden
//! suspect/weapon/room triple exactly.
//!
//! ## Architecture
//!
//! One actor task owns the entire game state; connection tasks only
//! exchange messages with it. This yields a single total order over
//! all commands and in-order delivery per client without any locks.
//!
//! - [`game`]: Board topology, entities, and the session coordinator
//!   state machine. Pure and synchronous.
//! - [`session`]: The actor owning a [`game::GameState`], its inbox
//!   messages, and its configuration.
//! - [`net`]: The text wire protocol and the TCP front end.
//!
//! ## Example
//!
//! ```
//! use clueless::game::GameState;
//!
//! // A fresh session waiting for players.
//! let game = GameState::new();
//! assert!(game.players().is_empty());
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ActionError, GameState, Phase,
    constants::{self, MIN_PLAYERS, ROOMS, SUSPECTS, WEAPONS},
    entities::{self, CharacterName},
};

/// The session actor and its message protocol.
pub mod session;
pub use session::{SessionConfig, SessionHandle};

/// Networking components and the wire protocol.
pub mod net;
pub use net::{Server, messages, server};
