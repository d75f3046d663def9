//! Session actor implementation with async message handling.
//!
//! One actor task owns the entire [`GameState`]; connection tasks only
//! talk to it through its inbox. Commands are therefore applied in a
//! single total order, and each client's outbox preserves the order
//! its lines were produced in.

use std::collections::HashMap;

use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};

use super::{
    config::SessionConfig,
    messages::{ConnId, SessionMessage},
};
use crate::{
    game::{CharacterName, GameState, Notice, Phase, events::Audience},
    net::messages::{Command, render_error, render_event, render_parse_error},
};

const INBOX_CAPACITY: usize = 100;

/// Session actor handle for sending messages.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    /// Send a message to the session. Fails only if the actor task has
    /// exited.
    pub async fn send(&self, message: SessionMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Session is closed".to_string())
    }
}

/// Session actor managing a single game.
pub struct SessionActor {
    /// Session configuration.
    config: SessionConfig,

    /// Game state machine.
    state: GameState,

    /// Message inbox.
    inbox: mpsc::Receiver<SessionMessage>,

    /// Outgoing line channel per live connection.
    connections: HashMap<ConnId, mpsc::Sender<String>>,

    /// Connection to character mapping, set on a successful JOIN.
    characters: HashMap<ConnId, CharacterName>,

    /// Character to connection reverse mapping.
    conn_of: HashMap<CharacterName, ConnId>,

    /// When the outstanding disprove offer expires, if a timeout is
    /// configured and an offer is pending.
    offer_deadline: Option<Instant>,

    /// Whose offer the deadline was armed for. Unrelated commands must
    /// not extend a running timer.
    offer_armed_for: Option<CharacterName>,
}

impl SessionActor {
    /// Create a new session actor and its handle.
    pub fn new(config: SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let actor = Self {
            config,
            state: GameState::new(),
            inbox,
            connections: HashMap::new(),
            characters: HashMap::new(),
            conn_of: HashMap::new(),
            offer_deadline: None,
            offer_armed_for: None,
        };
        (actor, SessionHandle { sender })
    }

    /// Run the session actor event loop. Exits when every handle is
    /// dropped.
    pub async fn run(mut self) {
        log::info!("session starting");
        loop {
            let deadline = self.offer_deadline;
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    self.handle_message(message).await;
                }

                // Skip a disprove offer the holder never answered.
                () = sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.handle_offer_timeout().await;
                }
            }
        }
        log::info!("session closed");
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Connect { conn_id, outbox } => {
                log::info!("connection {conn_id} opened");
                self.connections.insert(conn_id, outbox);
            }
            SessionMessage::Command { conn_id, line } => {
                self.handle_command(conn_id, &line).await;
            }
            SessionMessage::Disconnect { conn_id } => {
                self.handle_disconnect(conn_id).await;
            }
        }
    }

    async fn handle_command(&mut self, conn_id: ConnId, line: &str) {
        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(error) => {
                log::debug!("connection {conn_id}: unparseable command: {error}");
                self.send_to(conn_id, render_parse_error(&error)).await;
                return;
            }
        };
        log::debug!("connection {conn_id}: {command}");

        // Bookkeeping commands need no character binding.
        match &command {
            Command::PlayerJoined => {
                log::info!("{} players in the game", self.state.players().len());
                return;
            }
            Command::PlayerLeft => {
                self.handle_disconnect(conn_id).await;
                return;
            }
            _ => {}
        }

        // JOIN binds the connection to a character; everything else
        // requires that binding.
        if let Command::Join(character) = &command {
            if self.characters.contains_key(&conn_id) {
                self.send_to(conn_id, "FAILED JOIN: Connection already joined".to_string())
                    .await;
                return;
            }
            match self.state.join(character) {
                Ok(notices) => {
                    self.characters.insert(conn_id, character.clone());
                    self.conn_of.insert(character.clone(), conn_id);
                    self.dispatch(notices).await;
                }
                Err(error) => {
                    self.send_to(conn_id, render_error(&command, &error)).await;
                }
            }
            self.after_state_change();
            return;
        }

        let Some(character) = self.characters.get(&conn_id).cloned() else {
            self.send_to(conn_id, "ERROR Player has not joined yet.".to_string())
                .await;
            return;
        };

        let result = match &command {
            Command::MoveDirection(direction) => {
                self.state.move_direction(&character, *direction)
            }
            Command::Suggest { suspect, weapon } => {
                self.state.suggest(&character, suspect, weapon)
            }
            Command::SecretPassage => self.state.secret_passage(&character),
            Command::DisproveSelected(card) => {
                self.state.disprove_selected(&character, card)
            }
            Command::Accuse {
                suspect,
                weapon,
                room,
            } => self.state.accuse(&character, suspect, weapon, room),
            Command::EndTurn => self.state.end_turn(&character),
            Command::Where => self.state.where_is(&character),
            Command::Join(_) | Command::PlayerLeft | Command::PlayerJoined => {
                unreachable!("handled above")
            }
        };
        match result {
            Ok(notices) => self.dispatch(notices).await,
            Err(error) => {
                self.send_to(conn_id, render_error(&command, &error)).await;
            }
        }
        self.after_state_change();
    }

    async fn handle_disconnect(&mut self, conn_id: ConnId) {
        log::info!("connection {conn_id} closed");
        self.connections.remove(&conn_id);
        if let Some(character) = self.characters.remove(&conn_id) {
            self.conn_of.remove(&character);
            let notices = self.state.handle_disconnect(&character);
            self.dispatch(notices).await;
            self.after_state_change();
        }
    }

    async fn handle_offer_timeout(&mut self) {
        self.offer_deadline = None;
        self.offer_armed_for = None;
        let Some(character) = self.state.offered_player().cloned() else {
            return;
        };
        log::info!("{character} ran out of time to disprove");
        let notices = self.state.skip_offer(&character);
        self.dispatch(notices).await;
        self.after_state_change();
    }

    /// Housekeeping after any state transition: arm or clear the
    /// disprove timer, and unbind everyone once a finished game has
    /// reset to an empty lobby (players must rejoin explicitly).
    fn after_state_change(&mut self) {
        let offered = self.state.offered_player().cloned();
        match (&offered, self.config.disprove_timeout) {
            (Some(candidate), Some(timeout))
                if self.offer_armed_for.as_ref() != Some(candidate) =>
            {
                self.offer_deadline = Some(Instant::now() + timeout);
            }
            // The same offer is still pending; leave its timer alone.
            (Some(_), Some(_)) => {}
            _ => self.offer_deadline = None,
        }
        self.offer_armed_for = if self.offer_deadline.is_some() {
            offered
        } else {
            None
        };
        if self.state.phase() == Phase::Lobby
            && self.state.players().is_empty()
            && !self.characters.is_empty()
        {
            self.characters.clear();
            self.conn_of.clear();
        }
    }

    async fn dispatch(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            let line = render_event(&notice.event);
            match notice.audience {
                Audience::Everyone => {
                    for outbox in self.connections.values() {
                        // A lagging or dead connection never stalls the
                        // game; its reader task reports the disconnect.
                        if let Err(error) = outbox.try_send(line.clone()) {
                            log::warn!("dropping broadcast line: {error}");
                        }
                    }
                }
                Audience::Player(character) => {
                    if let Some(conn_id) = self.conn_of.get(&character) {
                        let conn_id = *conn_id;
                        self.send_to(conn_id, line).await;
                    }
                }
            }
        }
    }

    async fn send_to(&mut self, conn_id: ConnId, line: String) {
        if let Some(outbox) = self.connections.get(&conn_id)
            && let Err(error) = outbox.try_send(line)
        {
            log::warn!("dropping line for connection {conn_id}: {error}");
        }
    }
}
