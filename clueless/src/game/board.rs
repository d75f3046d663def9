//! Board topology and occupancy.
//!
//! The board is a fixed 5x5 grid: the nine cells with two even
//! coordinates are named rooms, cells with exactly one odd coordinate
//! are hallways, and cells with two odd coordinates are void (no room,
//! no hallway, unreachable). Adjacency is the set of unordered edges
//! between four-directionally neighboring non-void cells; it is built
//! once at construction and never changes.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use thiserror::Error;

use super::{constants::BOARD_SIZE, entities::CharacterName};

/// A grid coordinate. Renders as `(row,col)` on the wire.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighboring coordinate one step in `direction`, or `None`
    /// if the step would leave the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Right => (self.row, self.col + 1),
        };
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return None;
        }
        Some(Self { row, col })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A cardinal movement direction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        };
        write!(f, "{repr}")
    }
}

impl std::str::FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// Raised when a direction token is not one of UP/DOWN/LEFT/RIGHT.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown direction: {0}")]
pub struct UnknownDirection(pub String);

/// An unordered pair of coordinates directly connected for movement.
/// Two edges are equal iff they connect the same coordinate pair,
/// regardless of construction order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Edge {
    lo: Coord,
    hi: Coord,
}

impl Edge {
    #[must_use]
    pub fn new(a: Coord, b: Coord) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

/// What a grid cell holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cell {
    Room(&'static str),
    Hallway,
    Void,
}

/// Why a move was rejected. Reported to the caller verbatim inside
/// `MOVED false (<reason>)`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum IllegalMove {
    #[error("destination is out of bounds")]
    OutOfBounds,
    #[error("destination is not a reachable cell")]
    VoidCell,
    #[error("no passage connects those cells")]
    NotConnected,
    #[error("hallway is already occupied")]
    HallwayOccupied,
}

/// The static room/hallway graph plus per-cell occupant sets.
///
/// The layout and adjacency are fixed at construction. Occupancy is
/// mutated only through [`Board::move_occupant`] (validated) and
/// [`Board::relocate`] (suggestion teleports and secret passages),
/// always removing from the source cell and adding to the destination
/// in one call.
#[derive(Debug)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    edges: HashSet<Edge>,
    occupants: HashMap<Coord, HashSet<CharacterName>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Builds the fixed layout and adjacency set. Deterministic.
    #[must_use]
    pub fn new() -> Self {
        let mut cells = [[Cell::Void; BOARD_SIZE]; BOARD_SIZE];
        let mut room_names = super::constants::ROOMS.iter();
        for (row, row_cells) in cells.iter_mut().enumerate() {
            for (col, cell) in row_cells.iter_mut().enumerate() {
                *cell = match (row % 2, col % 2) {
                    (0, 0) => {
                        let name = room_names
                            .next()
                            .copied()
                            .unwrap_or("Room");
                        Cell::Room(name)
                    }
                    (1, 1) => Cell::Void,
                    _ => Cell::Hallway,
                };
            }
        }

        let mut edges = HashSet::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let here = Coord::new(row, col);
                if cells[row][col] == Cell::Void {
                    continue;
                }
                for direction in Direction::ALL {
                    if let Some(there) = here.step(direction)
                        && cells[there.row][there.col] != Cell::Void
                    {
                        edges.insert(Edge::new(here, there));
                    }
                }
            }
        }

        Self {
            cells,
            edges,
            occupants: HashMap::new(),
        }
    }

    /// Bounds-checked cell lookup.
    #[must_use]
    pub fn cell(&self, at: Coord) -> Option<Cell> {
        self.cells.get(at.row)?.get(at.col).copied()
    }

    /// The room name at `at`, or `None` for hallways, void cells, and
    /// out-of-range coordinates.
    #[must_use]
    pub fn room_name(&self, at: Coord) -> Option<&'static str> {
        match self.cell(at) {
            Some(Cell::Room(name)) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_hallway(&self, at: Coord) -> bool {
        self.cell(at) == Some(Cell::Hallway)
    }

    #[must_use]
    pub fn is_occupied(&self, at: Coord) -> bool {
        self.occupants.get(&at).is_some_and(|set| !set.is_empty())
    }

    #[must_use]
    pub fn occupant_count(&self, at: Coord) -> usize {
        self.occupants.get(&at).map_or(0, HashSet::len)
    }

    #[must_use]
    pub fn are_connected(&self, a: Coord, b: Coord) -> bool {
        self.edges.contains(&Edge::new(a, b))
    }

    /// Puts a new occupant on the board without any adjacency check.
    /// Used when seating a freshly joined player on their start cell.
    pub fn add_occupant(&mut self, name: CharacterName, at: Coord) {
        self.occupants.entry(at).or_default().insert(name);
    }

    /// Takes an occupant off the board entirely. Used when a player
    /// leaves before the game has started.
    pub fn remove_occupant(&mut self, name: &CharacterName, at: Coord) {
        if let Some(set) = self.occupants.get_mut(&at) {
            set.remove(name);
        }
    }

    /// Validates a one-step move in `direction` from `from` and
    /// returns the destination. Rejections are logged with their
    /// specific reason.
    pub fn can_move(&self, from: Coord, direction: Direction) -> Result<Coord, IllegalMove> {
        let to = match from.step(direction) {
            Some(to) => to,
            None => {
                debug!("move {direction} from {from}: out of bounds");
                return Err(IllegalMove::OutOfBounds);
            }
        };
        self.validate_move(from, to)?;
        Ok(to)
    }

    /// Re-validates and performs a move. Never trusts an earlier
    /// `can_move`; safe to call standalone. On any failure the board
    /// is left untouched.
    pub fn move_occupant(
        &mut self,
        name: &CharacterName,
        from: Coord,
        to: Coord,
    ) -> Result<(), IllegalMove> {
        self.validate_move(from, to)?;
        self.relocate(name, from, to);
        Ok(())
    }

    /// Moves an occupant without adjacency or hallway-occupancy rules.
    /// Secret passages and suggestion teleports go through here; both
    /// always land in a room, where occupancy is unrestricted.
    pub fn relocate(&mut self, name: &CharacterName, from: Coord, to: Coord) {
        if let Some(set) = self.occupants.get_mut(&from) {
            set.remove(name);
        }
        self.occupants.entry(to).or_default().insert(name.clone());
    }

    /// The paired corner room reached by secret passage from `at`, or
    /// `None` if `at` is not one of the four passage rooms. The pairs
    /// are Study-Kitchen and Conservatory-Lounge; this is a special
    /// edge that bypasses normal adjacency.
    #[must_use]
    pub fn secret_passage_destination(&self, at: Coord) -> Option<Coord> {
        let last = BOARD_SIZE - 1;
        match (at.row, at.col) {
            (0, 0) => Some(Coord::new(last, last)),
            (r, c) if r == last && c == last => Some(Coord::new(0, 0)),
            (r, 0) if r == last => Some(Coord::new(0, last)),
            (0, c) if c == last => Some(Coord::new(last, 0)),
            _ => None,
        }
    }

    fn validate_move(&self, from: Coord, to: Coord) -> Result<(), IllegalMove> {
        let cell = match self.cell(to) {
            Some(cell) => cell,
            None => {
                debug!("move {from} -> {to}: out of bounds");
                return Err(IllegalMove::OutOfBounds);
            }
        };
        if cell == Cell::Void {
            debug!("move {from} -> {to}: void cell");
            return Err(IllegalMove::VoidCell);
        }
        if !self.are_connected(from, to) {
            debug!("move {from} -> {to}: no connecting edge");
            return Err(IllegalMove::NotConnected);
        }
        if cell == Cell::Hallway && self.is_occupied(to) {
            debug!("move {from} -> {to}: hallway occupied");
            return Err(IllegalMove::HallwayOccupied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::ROOMS;

    fn name(s: &str) -> CharacterName {
        CharacterName::new(s)
    }

    #[test]
    fn layout_is_rooms_hallways_and_void() {
        let board = Board::new();
        let mut rooms = 0;
        let mut hallways = 0;
        let mut voids = 0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                match board.cell(Coord::new(row, col)).unwrap() {
                    Cell::Room(_) => rooms += 1,
                    Cell::Hallway => hallways += 1,
                    Cell::Void => voids += 1,
                }
            }
        }
        assert_eq!(rooms, 9);
        assert_eq!(hallways, 12);
        assert_eq!(voids, 4);
    }

    #[test]
    fn room_names_are_assigned_row_major() {
        let board = Board::new();
        assert_eq!(board.room_name(Coord::new(0, 0)), Some("Study"));
        assert_eq!(board.room_name(Coord::new(0, 4)), Some("Lounge"));
        assert_eq!(board.room_name(Coord::new(2, 2)), Some("Billiard Room"));
        assert_eq!(board.room_name(Coord::new(4, 0)), Some("Conservatory"));
        assert_eq!(board.room_name(Coord::new(4, 4)), Some("Kitchen"));
        // All nine names appear exactly once.
        let mut found = vec![];
        for row in (0..BOARD_SIZE).step_by(2) {
            for col in (0..BOARD_SIZE).step_by(2) {
                found.push(board.room_name(Coord::new(row, col)).unwrap());
            }
        }
        assert_eq!(found, ROOMS);
    }

    #[test]
    fn room_lookup_rejects_non_rooms() {
        let board = Board::new();
        assert_eq!(board.room_name(Coord::new(0, 1)), None); // hallway
        assert_eq!(board.room_name(Coord::new(1, 1)), None); // void
        assert_eq!(board.room_name(Coord::new(9, 9)), None); // out of range
    }

    #[test]
    fn adjacency_is_symmetric_and_avoids_void() {
        let board = Board::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let here = Coord::new(row, col);
                for direction in Direction::ALL {
                    let Some(there) = here.step(direction) else {
                        continue;
                    };
                    let connected = board.are_connected(here, there);
                    assert_eq!(connected, board.are_connected(there, here));
                    let either_void = board.cell(here) == Some(Cell::Void)
                        || board.cell(there) == Some(Cell::Void);
                    assert_eq!(connected, !either_void);
                }
            }
        }
    }

    #[test]
    fn can_move_covers_every_rejection_reason() {
        let mut board = Board::new();
        // Out of bounds: UP from the top row.
        assert_eq!(
            board.can_move(Coord::new(0, 0), Direction::Up),
            Err(IllegalMove::OutOfBounds)
        );
        // Void: stepping from a hallway into an odd/odd cell.
        assert_eq!(
            board.can_move(Coord::new(0, 1), Direction::Down),
            Err(IllegalMove::VoidCell)
        );
        // Occupied hallway.
        board.add_occupant(name("MrsPeacock"), Coord::new(0, 1));
        assert_eq!(
            board.can_move(Coord::new(0, 0), Direction::Right),
            Err(IllegalMove::HallwayOccupied)
        );
        // Legal move into a free hallway.
        assert_eq!(
            board.can_move(Coord::new(0, 0), Direction::Down),
            Ok(Coord::new(1, 0))
        );
    }

    #[test]
    fn move_occupant_is_atomic_on_failure() {
        let mut board = Board::new();
        let scarlet = name("MissScarlet");
        board.add_occupant(scarlet.clone(), Coord::new(0, 0));
        board.add_occupant(name("MrsWhite"), Coord::new(0, 1));

        let err = board
            .move_occupant(&scarlet, Coord::new(0, 0), Coord::new(0, 1))
            .unwrap_err();
        assert_eq!(err, IllegalMove::HallwayOccupied);
        assert_eq!(board.occupant_count(Coord::new(0, 0)), 1);
        assert_eq!(board.occupant_count(Coord::new(0, 1)), 1);

        board
            .move_occupant(&scarlet, Coord::new(0, 0), Coord::new(1, 0))
            .unwrap();
        assert_eq!(board.occupant_count(Coord::new(0, 0)), 0);
        assert_eq!(board.occupant_count(Coord::new(1, 0)), 1);
    }

    #[test]
    fn move_occupant_rejects_non_adjacent_cells() {
        let mut board = Board::new();
        let scarlet = name("MissScarlet");
        board.add_occupant(scarlet.clone(), Coord::new(0, 0));
        // Room to room is two steps; there is no direct edge.
        assert_eq!(
            board.move_occupant(&scarlet, Coord::new(0, 0), Coord::new(0, 2)),
            Err(IllegalMove::NotConnected)
        );
    }

    #[test]
    fn rooms_have_no_occupancy_limit() {
        let mut board = Board::new();
        let study = Coord::new(0, 0);
        for suspect in crate::game::constants::SUSPECTS {
            board.add_occupant(name(suspect), study);
        }
        assert_eq!(board.occupant_count(study), 6);
    }

    #[test]
    fn secret_passages_pair_the_corner_rooms() {
        let board = Board::new();
        assert_eq!(
            board.secret_passage_destination(Coord::new(0, 0)),
            Some(Coord::new(4, 4))
        );
        assert_eq!(
            board.secret_passage_destination(Coord::new(4, 4)),
            Some(Coord::new(0, 0))
        );
        assert_eq!(
            board.secret_passage_destination(Coord::new(4, 0)),
            Some(Coord::new(0, 4))
        );
        assert_eq!(
            board.secret_passage_destination(Coord::new(0, 4)),
            Some(Coord::new(4, 0))
        );
        // Non-corner rooms and hallways have no passage.
        assert_eq!(board.secret_passage_destination(Coord::new(2, 2)), None);
        assert_eq!(board.secret_passage_destination(Coord::new(0, 2)), None);
        assert_eq!(board.secret_passage_destination(Coord::new(0, 1)), None);
    }

    #[test]
    fn edges_are_unordered_pairs() {
        let a = Coord::new(0, 0);
        let b = Coord::new(0, 1);
        assert_eq!(Edge::new(a, b), Edge::new(b, a));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_direction() -> impl Strategy<Value = Direction> {
            prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right),
            ]
        }

        proptest! {
            #[test]
            fn step_stays_in_bounds(
                row in 0..BOARD_SIZE,
                col in 0..BOARD_SIZE,
                direction in any_direction(),
            ) {
                let here = Coord::new(row, col);
                if let Some(there) = here.step(direction) {
                    prop_assert!(there.row < BOARD_SIZE);
                    prop_assert!(there.col < BOARD_SIZE);
                    // One step moves exactly one coordinate by one.
                    let dr = here.row.abs_diff(there.row);
                    let dc = here.col.abs_diff(there.col);
                    prop_assert_eq!(dr + dc, 1);
                }
            }

            #[test]
            fn connectivity_follows_the_parity_rule(
                row in 0..BOARD_SIZE,
                col in 0..BOARD_SIZE,
                direction in any_direction(),
            ) {
                let board = Board::new();
                let here = Coord::new(row, col);
                if let Some(there) = here.step(direction) {
                    let either_void = row % 2 == 1 && col % 2 == 1
                        || there.row % 2 == 1 && there.col % 2 == 1;
                    prop_assert_eq!(board.are_connected(here, there), !either_void);
                }
            }
        }
    }
}
