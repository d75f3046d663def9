//! Events produced by game operations.
//!
//! Every mutating operation on [`crate::game::GameState`] returns the
//! list of notices it generated. A notice pairs an event with its
//! audience; the session actor routes it to the right connections and
//! the net layer renders it onto the wire. The game itself never
//! touches a socket.

use serde::{Deserialize, Serialize};

use super::{board::Coord, entities::CharacterName};

/// Who should receive an event.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Audience {
    /// Broadcast to every connected client.
    Everyone,
    /// Unicast to the client bound to this character.
    Player(CharacterName),
}

/// An event with its audience.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub audience: Audience,
    pub event: SessionEvent,
}

impl Notice {
    #[must_use]
    pub fn broadcast(event: SessionEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    #[must_use]
    pub fn unicast(to: &CharacterName, event: SessionEvent) -> Self {
        Self {
            audience: Audience::Player(to.clone()),
            event,
        }
    }
}

/// Something that happened in the game worth telling a client about.
///
/// Direct command failures are not events; they are [`ActionError`]s
/// returned to the offending caller alone.
///
/// [`ActionError`]: crate::game::ActionError
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SessionEvent {
    /// JOIN succeeded for this character.
    Joined(CharacterName),
    /// Every joined character and its current cell.
    Positions(Vec<(CharacterName, Coord)>),
    /// The recipient's dealt hand. Sent once, only to its owner.
    YourCards(Vec<String>),
    /// The recipient's turn has started.
    YourTurn,
    /// A move succeeded.
    Moved { to: Coord, via_passage: bool },
    /// A move failed validation; the turn did not advance.
    MoveRejected(String),
    /// The recipient is in a room and may make a suggestion.
    PromptSuggestion,
    /// A suggestion was made; the disprove sequence begins.
    SuggestionMade {
        suggester: CharacterName,
        suspect: String,
        weapon: String,
        room: String,
    },
    /// A disprove candidate held no matching card.
    CannotDisprove(CharacterName),
    /// The disprove order was exhausted with no match.
    NoOneDisproved,
    /// The recipient holds these matching cards and must pick one.
    DisproveOptions(Vec<String>),
    /// A disprove candidate's offer was skipped (timeout or
    /// disconnect) without showing a card.
    DisproveSkipped(CharacterName),
    /// Someone showed a card; which card stays private.
    SuggestionDisproved(CharacterName),
    /// Private to the suggester: which card was shown, and by whom.
    CardShown { by: CharacterName, card: String },
    /// The recipient (the suggester) may now accuse or end the turn.
    PromptAccusationOrEnd,
    /// Private to a winning accuser, echoing their own triple.
    AccusationCorrect {
        suspect: String,
        weapon: String,
        room: String,
    },
    /// A player won by correct accusation.
    AccusationWon(CharacterName),
    /// Private to a player whose accusation was wrong.
    AccusationIncorrect,
    /// A player is out of the game after a wrong accusation.
    PlayerEliminated(CharacterName),
    /// Private to the last player standing.
    YouWonByDefault,
    /// Everyone else was eliminated; this player wins by default.
    WonByDefault(CharacterName),
    /// The game ended. `None` means every player was eliminated.
    GameOver(Option<CharacterName>),
    /// Direct acknowledgement of a WHERE query.
    LocationAck,
}
