//! Fixed card lists, board dimensions, and starting coordinates.

use super::board::Coord;

/// Side length of the square board grid.
pub const BOARD_SIZE: usize = 5;

/// Number of joined players that triggers the one-time card deal.
pub const MIN_PLAYERS: usize = 2;

/// Suspect cards. These double as the playable character roster.
pub const SUSPECTS: [&str; 6] = [
    "MissScarlet",
    "ColonelMustard",
    "MrsWhite",
    "MrGreen",
    "MrsPeacock",
    "ProfessorPlum",
];

/// Weapon cards.
pub const WEAPONS: [&str; 6] = [
    "Candlestick",
    "Knife",
    "LeadPipe",
    "Revolver",
    "Rope",
    "Wrench",
];

/// Room names in row-major order over the nine room cells.
pub const ROOMS: [&str; 9] = [
    "Study",
    "Hall",
    "Lounge",
    "Library",
    "Billiard Room",
    "Dining Room",
    "Conservatory",
    "Ballroom",
    "Kitchen",
];

/// Cards in the full deck (suspects + weapons + rooms).
pub const DECK_SIZE: usize = SUSPECTS.len() + WEAPONS.len() + ROOMS.len();

/// Fixed starting cell for each character. Unknown names have no
/// starting cell and cannot join.
#[must_use]
pub fn starting_position(character: &str) -> Option<Coord> {
    let coord = match character {
        "MissScarlet" => Coord::new(4, 0),
        "ColonelMustard" => Coord::new(0, 2),
        "MrsWhite" => Coord::new(0, 4),
        "MrGreen" => Coord::new(4, 4),
        "MrsPeacock" => Coord::new(4, 2),
        "ProfessorPlum" => Coord::new(0, 0),
        _ => return None,
    };
    Some(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_suspect_has_a_starting_cell() {
        for suspect in SUSPECTS {
            assert!(starting_position(suspect).is_some(), "{suspect}");
        }
    }

    #[test]
    fn unknown_character_has_no_starting_cell() {
        assert!(starting_position("MrBoddy").is_none());
        assert!(starting_position("").is_none());
    }

    #[test]
    fn deck_counts() {
        assert_eq!(DECK_SIZE, 21);
    }
}
