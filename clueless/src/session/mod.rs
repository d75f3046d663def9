//! The session actor: single ownership of the game state with message
//! passing from connection tasks.

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::{ConfigError, SessionConfig};
pub use messages::{ConnId, SessionMessage};
