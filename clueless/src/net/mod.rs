//! Wire protocol and TCP transport.

pub mod messages;
pub mod server;

pub use messages::{Command, ParseCommandError};
pub use server::Server;
