//! The wire vocabulary.
//!
//! The protocol is newline-delimited UTF-8 text. Clients send one
//! command per line; the server answers with status lines and
//! human-readable sentences. All rendering of [`SessionEvent`]s and
//! [`ActionError`]s onto the wire happens here and nowhere else.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::game::{ActionError, CharacterName, Direction, SessionEvent};

/// A parsed client command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Join(CharacterName),
    MoveDirection(Direction),
    Suggest { suspect: String, weapon: String },
    SecretPassage,
    /// The card chosen to disprove with; may contain spaces
    /// ("Billiard Room").
    DisproveSelected(String),
    Accuse {
        suspect: String,
        weapon: String,
        /// Trailing argument; may contain spaces.
        room: String,
    },
    EndTurn,
    Where,
    /// Bookkeeping: the client announces it is leaving. The reader
    /// loop treats this as an orderly disconnect.
    PlayerLeft,
    /// Bookkeeping only; logged server-side.
    PlayerJoined,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{0} is missing an argument")]
    MissingArgument(&'static str),
    #[error("invalid direction: {0}")]
    InvalidDirection(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(ParseCommandError::Empty);
        }
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb {
            "JOIN" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingArgument("JOIN"));
                }
                Ok(Self::Join(CharacterName::new(rest)))
            }
            "MOVE_DIRECTION" => rest
                .parse::<Direction>()
                .map(Self::MoveDirection)
                .map_err(|_| ParseCommandError::InvalidDirection(rest.to_string())),
            "SUGGEST" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(suspect), Some(weapon)) => Ok(Self::Suggest {
                        suspect: suspect.to_string(),
                        weapon: weapon.to_string(),
                    }),
                    _ => Err(ParseCommandError::MissingArgument("SUGGEST")),
                }
            }
            "SECRET_PASSAGE" => Ok(Self::SecretPassage),
            "DISPROVE_SELECTED" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingArgument("DISPROVE_SELECTED"));
                }
                Ok(Self::DisproveSelected(rest.to_string()))
            }
            "ACCUSE" => {
                // The room is the trailing argument and may contain
                // spaces, so only the first two tokens are split off.
                let mut parts = rest.splitn(3, ' ');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(suspect), Some(weapon), Some(room))
                        if !suspect.is_empty() && !room.trim().is_empty() =>
                    {
                        Ok(Self::Accuse {
                            suspect: suspect.to_string(),
                            weapon: weapon.to_string(),
                            room: room.trim().to_string(),
                        })
                    }
                    _ => Err(ParseCommandError::MissingArgument("ACCUSE")),
                }
            }
            "END_TURN" => Ok(Self::EndTurn),
            "WHERE" => Ok(Self::Where),
            "PLAYER_LEFT" => Ok(Self::PlayerLeft),
            "PLAYER_JOINED" => Ok(Self::PlayerJoined),
            other => Err(ParseCommandError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join(character) => write!(f, "JOIN {character}"),
            Self::MoveDirection(direction) => write!(f, "MOVE_DIRECTION {direction}"),
            Self::Suggest { suspect, weapon } => write!(f, "SUGGEST {suspect} {weapon}"),
            Self::SecretPassage => write!(f, "SECRET_PASSAGE"),
            Self::DisproveSelected(card) => write!(f, "DISPROVE_SELECTED {card}"),
            Self::Accuse {
                suspect,
                weapon,
                room,
            } => write!(f, "ACCUSE {suspect} {weapon} {room}"),
            Self::EndTurn => write!(f, "END_TURN"),
            Self::Where => write!(f, "WHERE"),
            Self::PlayerLeft => write!(f, "PLAYER_LEFT"),
            Self::PlayerJoined => write!(f, "PLAYER_JOINED"),
        }
    }
}

/// Renders a game event as one wire line (without the terminating
/// newline).
#[must_use]
pub fn render_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Joined(character) => format!("JOINED {character}"),
        SessionEvent::Positions(positions) => {
            let mut line = String::from("ALL_POSITIONS");
            for (character, coord) in positions {
                line.push(' ');
                line.push_str(&format!("{character},{},{}", coord.row, coord.col));
            }
            line
        }
        SessionEvent::YourCards(cards) => format!("YOUR_CARDS {}", cards.join(",")),
        SessionEvent::YourTurn => "YOUR_TURN".to_string(),
        SessionEvent::Moved { to, via_passage } => {
            if *via_passage {
                format!("MOVED true to {to} via secret passage")
            } else {
                format!("MOVED true to {to}")
            }
        }
        SessionEvent::MoveRejected(reason) => format!("MOVED false ({reason})"),
        SessionEvent::PromptSuggestion => "PROMPT_SUGGESTION".to_string(),
        SessionEvent::SuggestionMade {
            suggester,
            suspect,
            weapon,
            room,
        } => format!("{suggester} suggests: {suspect} with the {weapon} in the {room}"),
        SessionEvent::CannotDisprove(character) => {
            format!("{character} cannot disprove the suggestion.")
        }
        SessionEvent::NoOneDisproved => "No one could disprove the suggestion.".to_string(),
        SessionEvent::DisproveOptions(options) => {
            format!("DISPROVE_OPTIONS {}", options.join(","))
        }
        SessionEvent::DisproveSkipped(character) => {
            format!("{character} did not show a card.")
        }
        SessionEvent::SuggestionDisproved(character) => {
            format!("{character} disproved the suggestion by showing a card.")
        }
        SessionEvent::CardShown { by, card } => format!("{by} showed you: {card}"),
        SessionEvent::PromptAccusationOrEnd => "PROMPT_ACCUSATION_OR_END".to_string(),
        SessionEvent::AccusationCorrect {
            suspect,
            weapon,
            room,
        } => format!(
            "CONGRATULATIONS! Your accusation was correct: {suspect} with the {weapon} in the {room}"
        ),
        SessionEvent::AccusationWon(character) => {
            format!("{character} has made a CORRECT accusation and won the game!")
        }
        SessionEvent::AccusationIncorrect => {
            "Your accusation was incorrect. You are now eliminated.".to_string()
        }
        SessionEvent::PlayerEliminated(character) => {
            format!("{character} made an incorrect accusation and is eliminated from the game.")
        }
        SessionEvent::YouWonByDefault => {
            "You have WON the game! All other players were eliminated.".to_string()
        }
        SessionEvent::WonByDefault(character) => {
            format!("{character} has WON the game because all other players were eliminated!")
        }
        SessionEvent::GameOver(Some(winner)) => format!("GAME_OVER {winner}"),
        SessionEvent::GameOver(None) => {
            "GAME_OVER All players are eliminated. No winner!".to_string()
        }
        SessionEvent::LocationAck => "LOCATION Sent all player positions.".to_string(),
    }
}

/// Renders an action error for the offending caller. A failed JOIN has
/// its own status line; everything else is an `ERROR` line.
#[must_use]
pub fn render_error(command: &Command, error: &ActionError) -> String {
    match command {
        Command::Join(_) => format!("FAILED JOIN: {error}"),
        _ => format!("ERROR {error}"),
    }
}

/// Renders a protocol-level parse failure.
#[must_use]
pub fn render_parse_error(error: &ParseCommandError) -> String {
    format!("ERROR {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Coord;

    #[test]
    fn parses_every_command_form() {
        assert_eq!(
            "JOIN MissScarlet".parse::<Command>().unwrap(),
            Command::Join(CharacterName::new("MissScarlet"))
        );
        assert_eq!(
            "MOVE_DIRECTION UP".parse::<Command>().unwrap(),
            Command::MoveDirection(Direction::Up)
        );
        assert_eq!(
            "SUGGEST ProfessorPlum Knife".parse::<Command>().unwrap(),
            Command::Suggest {
                suspect: "ProfessorPlum".to_string(),
                weapon: "Knife".to_string(),
            }
        );
        assert_eq!(
            "SECRET_PASSAGE".parse::<Command>().unwrap(),
            Command::SecretPassage
        );
        assert_eq!("END_TURN".parse::<Command>().unwrap(), Command::EndTurn);
        assert_eq!("WHERE".parse::<Command>().unwrap(), Command::Where);
    }

    #[test]
    fn trailing_arguments_keep_their_spaces() {
        assert_eq!(
            "DISPROVE_SELECTED Billiard Room".parse::<Command>().unwrap(),
            Command::DisproveSelected("Billiard Room".to_string())
        );
        assert_eq!(
            "ACCUSE MrsWhite Revolver Dining Room"
                .parse::<Command>()
                .unwrap(),
            Command::Accuse {
                suspect: "MrsWhite".to_string(),
                weapon: "Revolver".to_string(),
                room: "Dining Room".to_string(),
            }
        );
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "  ".parse::<Command>(),
            Err(ParseCommandError::Empty)
        );
        assert_eq!(
            "JOIN".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("JOIN"))
        );
        assert_eq!(
            "MOVE_DIRECTION SIDEWAYS".parse::<Command>(),
            Err(ParseCommandError::InvalidDirection("SIDEWAYS".to_string()))
        );
        assert_eq!(
            "SUGGEST ProfessorPlum".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("SUGGEST"))
        );
        assert_eq!(
            "ACCUSE MrsWhite Revolver".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("ACCUSE"))
        );
        assert_eq!(
            "DANCE".parse::<Command>(),
            Err(ParseCommandError::UnknownCommand("DANCE".to_string()))
        );
    }

    #[test]
    fn command_display_round_trips() {
        for line in [
            "JOIN MissScarlet",
            "MOVE_DIRECTION LEFT",
            "SUGGEST MrGreen Rope",
            "SECRET_PASSAGE",
            "DISPROVE_SELECTED Billiard Room",
            "ACCUSE MrsWhite Revolver Dining Room",
            "END_TURN",
            "WHERE",
        ] {
            let command: Command = line.parse().unwrap();
            assert_eq!(command.to_string(), line);
        }
    }

    #[test]
    fn status_lines_render_exactly() {
        assert_eq!(
            render_event(&SessionEvent::Joined(CharacterName::new("MrGreen"))),
            "JOINED MrGreen"
        );
        assert_eq!(
            render_event(&SessionEvent::Moved {
                to: Coord::new(3, 0),
                via_passage: false,
            }),
            "MOVED true to (3,0)"
        );
        assert_eq!(
            render_event(&SessionEvent::Moved {
                to: Coord::new(4, 4),
                via_passage: true,
            }),
            "MOVED true to (4,4) via secret passage"
        );
        assert_eq!(
            render_event(&SessionEvent::MoveRejected(
                "hallway is already occupied".to_string()
            )),
            "MOVED false (hallway is already occupied)"
        );
        assert_eq!(
            render_event(&SessionEvent::YourCards(vec![
                "Knife".to_string(),
                "Billiard Room".to_string(),
            ])),
            "YOUR_CARDS Knife,Billiard Room"
        );
        assert_eq!(render_event(&SessionEvent::YourTurn), "YOUR_TURN");
        assert_eq!(
            render_event(&SessionEvent::DisproveOptions(vec![
                "Rope".to_string(),
                "Hall".to_string(),
            ])),
            "DISPROVE_OPTIONS Rope,Hall"
        );
        assert_eq!(
            render_event(&SessionEvent::GameOver(Some(CharacterName::new(
                "MissScarlet"
            )))),
            "GAME_OVER MissScarlet"
        );
        assert_eq!(
            render_event(&SessionEvent::GameOver(None)),
            "GAME_OVER All players are eliminated. No winner!"
        );
    }

    #[test]
    fn positions_render_as_comma_triples() {
        let event = SessionEvent::Positions(vec![
            (CharacterName::new("MissScarlet"), Coord::new(4, 0)),
            (CharacterName::new("ProfessorPlum"), Coord::new(0, 0)),
        ]);
        assert_eq!(
            render_event(&event),
            "ALL_POSITIONS MissScarlet,4,0 ProfessorPlum,0,0"
        );
    }

    #[test]
    fn narrative_lines_render_exactly() {
        assert_eq!(
            render_event(&SessionEvent::SuggestionMade {
                suggester: CharacterName::new("MissScarlet"),
                suspect: "ProfessorPlum".to_string(),
                weapon: "Knife".to_string(),
                room: "Conservatory".to_string(),
            }),
            "MissScarlet suggests: ProfessorPlum with the Knife in the Conservatory"
        );
        assert_eq!(
            render_event(&SessionEvent::CannotDisprove(CharacterName::new("MrGreen"))),
            "MrGreen cannot disprove the suggestion."
        );
        assert_eq!(
            render_event(&SessionEvent::NoOneDisproved),
            "No one could disprove the suggestion."
        );
        assert_eq!(
            render_event(&SessionEvent::SuggestionDisproved(CharacterName::new(
                "MrsPeacock"
            ))),
            "MrsPeacock disproved the suggestion by showing a card."
        );
        assert_eq!(
            render_event(&SessionEvent::CardShown {
                by: CharacterName::new("MrsPeacock"),
                card: "Knife".to_string(),
            }),
            "MrsPeacock showed you: Knife"
        );
    }

    #[test]
    fn error_lines_depend_on_the_command() {
        let join = Command::Join(CharacterName::new("MissScarlet"));
        assert_eq!(
            render_error(&join, &ActionError::StartOccupied),
            "FAILED JOIN: Starting position already occupied"
        );
        let end = Command::EndTurn;
        assert_eq!(
            render_error(&end, &ActionError::NotYourTurn),
            "ERROR Not your turn."
        );
        assert_eq!(
            render_error(
                &Command::MoveDirection(Direction::Up),
                &ActionError::EliminatedCannotMove
            ),
            "ERROR You are eliminated and cannot move."
        );
    }
}
