//! The game session coordinator.
//!
//! [`GameState`] owns the board, the joined players, the turn pointer,
//! the hidden solution, and the suggestion-in-flight. Every operation
//! is synchronous and returns either the notices it produced or an
//! [`ActionError`] for the offending caller alone. The session actor
//! serializes access, so nothing here needs a lock.

use log::{debug, info};
use std::collections::VecDeque;
use thiserror::Error;

use super::{
    board::{Board, Direction},
    constants::{self, MIN_PLAYERS, SUSPECTS, WEAPONS},
    entities::{CharacterName, PlayerState, Solution, shuffled_deck},
    events::{Notice, SessionEvent},
};

/// Which commands are currently meaningful. Terminal outcomes (a
/// correct accusation, everyone eliminated) resolve straight into a
/// fresh `Lobby` with a new board and solution, so they never persist
/// as a phase of their own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Before the card deal. Accepts JOIN only.
    Lobby,
    /// The game is running; turn-gated actions are accepted.
    Active,
    /// A suggestion is being resolved; only the offered player's
    /// selection is meaningful.
    SuggestionPending,
}

/// Errors reported to the caller of a game operation. These never
/// mutate shared state and never reach other players.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    #[error("Unknown character")]
    UnknownCharacter,
    #[error("Starting position already occupied")]
    StartOccupied,
    #[error("Player has not joined yet.")]
    NotJoined,
    #[error("The game has not started yet.")]
    GameNotStarted,
    #[error("Not your turn.")]
    NotYourTurn,
    #[error("You are eliminated and cannot move.")]
    EliminatedCannotMove,
    #[error("You are eliminated and cannot make suggestions.")]
    EliminatedCannotSuggest,
    #[error("You are eliminated and cannot make accusations.")]
    EliminatedCannotAccuse,
    #[error("Cannot make a suggestion from a hallway.")]
    SuggestFromHallway,
    #[error("Unknown suspect: {0}")]
    UnknownSuspect(String),
    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),
    #[error("A suggestion is still being resolved.")]
    SuggestionInProgress,
    #[error("You have not been offered a chance to disprove.")]
    NotOfferedDisprove,
    #[error("You do not hold that card.")]
    InvalidDisproveCard,
    #[error("Not in a room with a secret passage.")]
    NotInRoom,
    #[error("No secret passage from this room.")]
    NoSecretPassage,
}

/// The single suggestion being resolved, if any. At most one exists
/// at a time for the whole session by construction.
#[derive(Debug)]
struct SuggestionInFlight {
    suggester: CharacterName,
    /// Suspect, weapon, room.
    cards: [String; 3],
    /// Players not yet offered a chance to disprove, clockwise from
    /// the suggester's neighbor.
    queue: VecDeque<CharacterName>,
    offered: Option<Offer>,
}

#[derive(Debug)]
struct Offer {
    candidate: CharacterName,
    options: Vec<String>,
}

/// One game session: board, players, turn pointer, solution, and the
/// suggestion/disprove protocol state.
#[derive(Debug)]
pub struct GameState {
    board: Board,
    /// Joined players in join order; this is also the turn order.
    players: Vec<PlayerState>,
    turn_idx: usize,
    solution: Solution,
    cards_dealt: bool,
    phase: Phase,
    suggestion: Option<SuggestionInFlight>,
    min_players: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh session with a uniformly random solution.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = rand::rng();
        Self::with_solution(Solution::random(&mut rng))
    }

    /// A fresh session with a fixed solution. Useful for tests and
    /// scripted games; the server always uses [`GameState::new`].
    #[must_use]
    pub fn with_solution(solution: Solution) -> Self {
        Self {
            board: Board::new(),
            players: Vec::new(),
            turn_idx: 0,
            solution,
            cards_dealt: false,
            phase: Phase::Lobby,
            suggestion: None,
            min_players: MIN_PLAYERS,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The character whose turn it is, if the game has started.
    #[must_use]
    pub fn current_turn(&self) -> Option<&CharacterName> {
        if !self.cards_dealt {
            return None;
        }
        self.players.get(self.turn_idx).map(|p| &p.character)
    }

    /// The player currently holding an unanswered disprove offer.
    #[must_use]
    pub fn offered_player(&self) -> Option<&CharacterName> {
        self.suggestion
            .as_ref()?
            .offered
            .as_ref()
            .map(|offer| &offer.candidate)
    }

    /// Seats a new player at their character's fixed starting cell.
    /// Reaching the player threshold triggers the one-time card deal
    /// and the first turn notification.
    pub fn join(&mut self, character: &CharacterName) -> Result<Vec<Notice>, ActionError> {
        let start = constants::starting_position(character.as_str())
            .ok_or(ActionError::UnknownCharacter)?;
        if self.board.is_occupied(start) {
            return Err(ActionError::StartOccupied);
        }
        self.players
            .push(PlayerState::new(character.clone(), start));
        self.board.add_occupant(character.clone(), start);
        info!("{character} joined at {start}");

        let mut notices = vec![
            Notice::unicast(character, SessionEvent::Joined(character.clone())),
            self.positions_notice(),
        ];
        if !self.cards_dealt && self.players.len() >= self.min_players {
            notices.extend(self.deal());
        }
        Ok(notices)
    }

    /// Moves the current-turn player one cell in `direction`. A failed
    /// validation is a negative result, not an error: the caller gets
    /// a [`SessionEvent::MoveRejected`] and the turn does not advance.
    pub fn move_direction(
        &mut self,
        character: &CharacterName,
        direction: Direction,
    ) -> Result<Vec<Notice>, ActionError> {
        let idx = self.require_turn(character, ActionError::EliminatedCannotMove)?;
        let from = self.players[idx].position;

        let to = match self.board.can_move(from, direction) {
            Ok(to) => to,
            Err(reason) => {
                return Ok(vec![Notice::unicast(
                    character,
                    SessionEvent::MoveRejected(reason.to_string()),
                )]);
            }
        };
        if let Err(reason) = self.board.move_occupant(character, from, to) {
            return Ok(vec![Notice::unicast(
                character,
                SessionEvent::MoveRejected(reason.to_string()),
            )]);
        }
        self.players[idx].position = to;
        debug!("{character} moved {direction} to {to}");

        let mut notices = vec![
            Notice::unicast(
                character,
                SessionEvent::Moved {
                    to,
                    via_passage: false,
                },
            ),
            self.positions_notice(),
        ];
        if self.board.room_name(to).is_some() {
            // Entering a room earns a suggestion; the turn holds until
            // the player suggests, accuses, or ends it.
            notices.push(Notice::unicast(character, SessionEvent::PromptSuggestion));
        } else {
            notices.extend(self.advance_turn());
        }
        Ok(notices)
    }

    /// Takes the secret passage out of a corner room. The destination
    /// room's occupancy is unrestricted, and arrival prompts a
    /// suggestion exactly like a normal move into a room.
    pub fn secret_passage(
        &mut self,
        character: &CharacterName,
    ) -> Result<Vec<Notice>, ActionError> {
        let idx = self.require_turn(character, ActionError::EliminatedCannotMove)?;
        let from = self.players[idx].position;
        if self.board.room_name(from).is_none() {
            return Err(ActionError::NotInRoom);
        }
        let to = self
            .board
            .secret_passage_destination(from)
            .ok_or(ActionError::NoSecretPassage)?;

        self.board.relocate(character, from, to);
        self.players[idx].position = to;
        debug!("{character} took the secret passage to {to}");

        Ok(vec![
            Notice::unicast(
                character,
                SessionEvent::Moved {
                    to,
                    via_passage: true,
                },
            ),
            self.positions_notice(),
            Notice::unicast(character, SessionEvent::PromptSuggestion),
        ])
    }

    /// Makes a suggestion from the suggester's current room. The room
    /// element of the triple is supplied by the room itself; the
    /// accused suspect is teleported here; then the disprove sequence
    /// starts with the suggester's neighbor.
    pub fn suggest(
        &mut self,
        character: &CharacterName,
        suspect: &str,
        weapon: &str,
    ) -> Result<Vec<Notice>, ActionError> {
        let idx = self.require_turn(character, ActionError::EliminatedCannotSuggest)?;
        let here = self.players[idx].position;
        let room = self
            .board
            .room_name(here)
            .ok_or(ActionError::SuggestFromHallway)?;
        if !SUSPECTS.contains(&suspect) {
            return Err(ActionError::UnknownSuspect(suspect.to_string()));
        }
        if !WEAPONS.contains(&weapon) {
            return Err(ActionError::UnknownWeapon(weapon.to_string()));
        }

        let mut notices = Vec::new();

        // The accused character is physically pulled into the room,
        // no matter whose turn it is.
        let accused = CharacterName::new(suspect);
        if let Some(accused_idx) = self.idx_of(&accused)
            && self.players[accused_idx].position != here
        {
            let old = self.players[accused_idx].position;
            self.board.relocate(&accused, old, here);
            self.players[accused_idx].position = here;
            notices.push(self.positions_notice());
        }

        info!("{character} suggests {suspect} with the {weapon} in the {room}");
        notices.push(Notice::broadcast(SessionEvent::SuggestionMade {
            suggester: character.clone(),
            suspect: suspect.to_string(),
            weapon: weapon.to_string(),
            room: room.to_string(),
        }));

        let queue = self.table_order_after(idx);
        self.phase = Phase::SuggestionPending;
        self.suggestion = Some(SuggestionInFlight {
            suggester: character.clone(),
            cards: [suspect.to_string(), weapon.to_string(), room.to_string()],
            queue,
            offered: None,
        });
        notices.extend(self.advance_disprove());
        Ok(notices)
    }

    /// The offered player reveals one of their matching cards. Only
    /// the suggester learns which card it was.
    pub fn disprove_selected(
        &mut self,
        character: &CharacterName,
        card: &str,
    ) -> Result<Vec<Notice>, ActionError> {
        let Some(suggestion) = self.suggestion.as_ref() else {
            return Err(ActionError::NotOfferedDisprove);
        };
        let Some(offer) = suggestion.offered.as_ref() else {
            return Err(ActionError::NotOfferedDisprove);
        };
        if offer.candidate != *character {
            return Err(ActionError::NotOfferedDisprove);
        }
        if !offer.options.iter().any(|option| option == card) {
            return Err(ActionError::InvalidDisproveCard);
        }

        // Resolution: clear the pending state, tell the suggester
        // privately, and leave the turn with them.
        let suggestion = self
            .suggestion
            .take()
            .ok_or(ActionError::NotOfferedDisprove)?;
        self.phase = Phase::Active;
        debug!("{character} disproved {}'s suggestion", suggestion.suggester);
        Ok(vec![
            Notice::broadcast(SessionEvent::SuggestionDisproved(character.clone())),
            Notice::unicast(
                &suggestion.suggester,
                SessionEvent::CardShown {
                    by: character.clone(),
                    card: card.to_string(),
                },
            ),
            Notice::unicast(&suggestion.suggester, SessionEvent::PromptAccusationOrEnd),
        ])
    }

    /// Resolves a final accusation against the hidden solution with
    /// exact string equality. Correct wins and resets the session;
    /// incorrect eliminates the accuser permanently.
    pub fn accuse(
        &mut self,
        character: &CharacterName,
        suspect: &str,
        weapon: &str,
        room: &str,
    ) -> Result<Vec<Notice>, ActionError> {
        let idx = self.require_turn(character, ActionError::EliminatedCannotAccuse)?;

        if self.solution.matches(suspect, weapon, room) {
            info!("{character} won with a correct accusation");
            let mut notices = vec![
                Notice::unicast(
                    character,
                    SessionEvent::AccusationCorrect {
                        suspect: suspect.to_string(),
                        weapon: weapon.to_string(),
                        room: room.to_string(),
                    },
                ),
                Notice::broadcast(SessionEvent::AccusationWon(character.clone())),
                Notice::broadcast(SessionEvent::GameOver(Some(character.clone()))),
            ];
            notices.extend(self.reset());
            return Ok(notices);
        }

        self.players[idx].eliminated = true;
        info!("{character} accused incorrectly and is eliminated");
        let mut notices = vec![
            Notice::unicast(character, SessionEvent::AccusationIncorrect),
            Notice::broadcast(SessionEvent::PlayerEliminated(character.clone())),
            self.positions_notice(),
        ];
        notices.extend(self.after_elimination());
        Ok(notices)
    }

    /// Explicitly passes the turn to the next non-eliminated player.
    pub fn end_turn(&mut self, character: &CharacterName) -> Result<Vec<Notice>, ActionError> {
        self.require_turn(character, ActionError::NotYourTurn)?;
        Ok(self.advance_turn())
    }

    /// Re-broadcasts every player's position. Allowed for everyone,
    /// eliminated players included.
    pub fn where_is(&self, character: &CharacterName) -> Result<Vec<Notice>, ActionError> {
        if self.idx_of(character).is_none() {
            return Err(ActionError::NotJoined);
        }
        Ok(vec![
            self.positions_notice(),
            Notice::unicast(character, SessionEvent::LocationAck),
        ])
    }

    /// Fails safe after a connection drop: the character is treated as
    /// eliminated, an outstanding offer held by them is skipped, and
    /// every later disprove walk passes them by. A held turn advances.
    /// Their token and hand stay on the board until the session
    /// resets.
    pub fn handle_disconnect(&mut self, character: &CharacterName) -> Vec<Notice> {
        let Some(idx) = self.idx_of(character) else {
            return Vec::new();
        };
        info!("{character} disconnected");
        if !self.cards_dealt {
            // Still in the lobby: free the seat so the character can
            // be taken again.
            let player = self.players.remove(idx);
            self.board.remove_occupant(&player.character, player.position);
            return vec![self.positions_notice()];
        }
        self.players[idx].eliminated = true;
        self.players[idx].departed = true;

        let mut notices = Vec::new();
        if self.offered_player() == Some(character) {
            notices.extend(self.skip_offer(character));
        } else if self
            .suggestion
            .as_ref()
            .is_some_and(|s| s.suggester == *character)
        {
            // The suggester is gone; nobody is left to show a card to.
            self.suggestion = None;
            self.phase = Phase::Active;
        }
        if !self.players.is_empty() {
            notices.extend(self.after_elimination_of(idx));
        }
        notices
    }

    /// Skips an unanswered disprove offer (timeout or disconnect) and
    /// carries on with the next candidate.
    pub fn skip_offer(&mut self, character: &CharacterName) -> Vec<Notice> {
        let Some(suggestion) = self.suggestion.as_mut() else {
            return Vec::new();
        };
        if suggestion
            .offered
            .as_ref()
            .is_none_or(|offer| offer.candidate != *character)
        {
            return Vec::new();
        }
        suggestion.offered = None;
        let mut notices = vec![Notice::broadcast(SessionEvent::DisproveSkipped(
            character.clone(),
        ))];
        notices.extend(self.advance_disprove());
        notices
    }

    /// Common precondition checks for turn-gated actions. Returns the
    /// caller's player index.
    fn require_turn(
        &self,
        character: &CharacterName,
        eliminated_error: ActionError,
    ) -> Result<usize, ActionError> {
        let idx = self.idx_of(character).ok_or(ActionError::NotJoined)?;
        if self.players[idx].eliminated {
            return Err(eliminated_error);
        }
        match self.phase {
            Phase::Lobby => return Err(ActionError::GameNotStarted),
            Phase::SuggestionPending => return Err(ActionError::SuggestionInProgress),
            Phase::Active => {}
        }
        if self.turn_idx != idx {
            return Err(ActionError::NotYourTurn);
        }
        Ok(idx)
    }

    fn idx_of(&self, character: &CharacterName) -> Option<usize> {
        self.players.iter().position(|p| p.character == *character)
    }

    fn positions_notice(&self) -> Notice {
        let positions = self
            .players
            .iter()
            .map(|p| (p.character.clone(), p.position))
            .collect();
        Notice::broadcast(SessionEvent::Positions(positions))
    }

    /// Every other player in table order starting immediately after
    /// index `idx` and wrapping around.
    fn table_order_after(&self, idx: usize) -> VecDeque<CharacterName> {
        let count = self.players.len();
        (1..count)
            .map(|offset| self.players[(idx + offset) % count].character.clone())
            .collect()
    }

    /// Walks the disprove order. Departed candidates are passed over
    /// with a broadcast, since there is no one behind them to answer;
    /// candidates with no matching card are skipped synchronously
    /// with a broadcast; the first candidate with a match is offered
    /// their matching cards and the walk pauses for their selection.
    /// An exhausted order resolves the suggestion with no disproof.
    fn advance_disprove(&mut self) -> Vec<Notice> {
        let Some(mut suggestion) = self.suggestion.take() else {
            return Vec::new();
        };
        let mut notices = Vec::new();
        while let Some(candidate) = suggestion.queue.pop_front() {
            let Some(idx) = self.idx_of(&candidate) else {
                continue;
            };
            if self.players[idx].departed {
                debug!("{candidate} is gone; their offer is skipped");
                notices.push(Notice::broadcast(SessionEvent::DisproveSkipped(candidate)));
                continue;
            }
            let matches = self.players[idx].matching_cards(&suggestion.cards);
            if matches.is_empty() {
                debug!("{candidate} cannot disprove");
                notices.push(Notice::broadcast(SessionEvent::CannotDisprove(candidate)));
                continue;
            }
            debug!("{candidate} offered {} card(s) to show", matches.len());
            notices.push(Notice::unicast(
                &candidate,
                SessionEvent::DisproveOptions(matches.clone()),
            ));
            suggestion.offered = Some(Offer {
                candidate,
                options: matches,
            });
            self.suggestion = Some(suggestion);
            return notices;
        }

        // No one could disprove; back to the suggester.
        self.phase = Phase::Active;
        notices.push(Notice::broadcast(SessionEvent::NoOneDisproved));
        notices.push(Notice::unicast(
            &suggestion.suggester,
            SessionEvent::PromptAccusationOrEnd,
        ));
        notices
    }

    /// Scans forward circularly for the next non-eliminated player.
    /// A full circle without one ends the game with no winner.
    fn advance_turn(&mut self) -> Vec<Notice> {
        if self.players.is_empty() {
            return Vec::new();
        }
        let start = self.turn_idx;
        loop {
            self.turn_idx = (self.turn_idx + 1) % self.players.len();
            if !self.players[self.turn_idx].eliminated {
                let next = self.players[self.turn_idx].character.clone();
                debug!("turn passes to {next}");
                return vec![Notice::unicast(&next, SessionEvent::YourTurn)];
            }
            if self.turn_idx == start {
                info!("all players eliminated; game over with no winner");
                let mut notices = vec![Notice::broadcast(SessionEvent::GameOver(None))];
                notices.extend(self.reset());
                return notices;
            }
        }
    }

    fn after_elimination(&mut self) -> Vec<Notice> {
        self.after_elimination_of(self.turn_idx)
    }

    /// After marking a player eliminated: declare a last player
    /// standing the winner by default, end with no winner if nobody is
    /// left, or advance the turn past the eliminated player.
    fn after_elimination_of(&mut self, idx: usize) -> Vec<Notice> {
        let active: Vec<usize> = (0..self.players.len())
            .filter(|&i| !self.players[i].eliminated)
            .collect();
        match active.as_slice() {
            [] => {
                info!("all players eliminated; game over with no winner");
                let mut notices = vec![Notice::broadcast(SessionEvent::GameOver(None))];
                notices.extend(self.reset());
                notices
            }
            [winner_idx] if self.cards_dealt => {
                let winner = self.players[*winner_idx].character.clone();
                info!("{winner} wins by default");
                let mut notices = vec![
                    Notice::unicast(&winner, SessionEvent::YouWonByDefault),
                    Notice::broadcast(SessionEvent::WonByDefault(winner.clone())),
                    Notice::broadcast(SessionEvent::GameOver(Some(winner)))
                ];
                notices.extend(self.reset());
                notices
            }
            _ => {
                if self.turn_idx == idx && self.phase == Phase::Active {
                    self.advance_turn()
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Builds the deck (minus the solution), shuffles, deals round
    /// robin in join order, and starts the first turn at index 0.
    fn deal(&mut self) -> Vec<Notice> {
        let mut rng = rand::rng();
        let deck = shuffled_deck(&self.solution, &mut rng);
        let count = self.players.len();
        for (i, card) in deck.into_iter().enumerate() {
            self.players[i % count].hand.push(card);
        }
        self.cards_dealt = true;
        self.phase = Phase::Active;
        self.turn_idx = 0;
        info!("cards dealt to {count} players; game started");

        let mut notices: Vec<Notice> = self
            .players
            .iter()
            .map(|p| Notice::unicast(&p.character, SessionEvent::YourCards(p.hand.clone())))
            .collect();
        notices.push(Notice::unicast(
            &self.players[0].character,
            SessionEvent::YourTurn,
        ));
        notices
    }

    /// Tears the session down to a fresh lobby with a new board and a
    /// newly generated solution. Players must rejoin.
    fn reset(&mut self) -> Vec<Notice> {
        let mut rng = rand::rng();
        self.board = Board::new();
        self.players.clear();
        self.turn_idx = 0;
        self.solution = Solution::random(&mut rng);
        self.cards_dealt = false;
        self.phase = Phase::Lobby;
        self.suggestion = None;
        info!("session reset; waiting for players");
        Vec::new()
    }
}
