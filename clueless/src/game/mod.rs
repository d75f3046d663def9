//! Core game logic: board topology, entities, and the session
//! coordinator state machine.
//!
//! Everything here is synchronous and deterministic given a solution
//! and a sequence of operations. Randomness enters only at session
//! creation (the hidden solution) and at the card deal (the shuffle).

pub mod board;
pub mod constants;
pub mod entities;
pub mod events;
pub mod state;

pub use board::{Board, Coord, Direction, IllegalMove};
pub use entities::{CharacterName, PlayerState, Solution};
pub use events::{Audience, Notice, SessionEvent};
pub use state::{ActionError, GameState, Phase};
