//! Player, card, and solution entities.

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{
    board::Coord,
    constants::{ROOMS, SUSPECTS, WEAPONS},
};

/// A character name, used directly as the player identifier. Names are
/// single space-free tokens on the wire, so whitespace is squeezed out
/// at construction.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CharacterName(String);

impl CharacterName {
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(s.split_whitespace().collect::<Vec<_>>().join(""))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for CharacterName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for CharacterName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Per-player session state. Created on a successful JOIN at the
/// character's fixed starting cell and never removed for the lifetime
/// of the session; an eliminated player stays on the board but loses
/// action rights.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerState {
    pub character: CharacterName,
    pub position: Coord,
    /// Cards dealt to this player, in deal order. Never contains a
    /// solution card.
    pub hand: Vec<String>,
    pub eliminated: bool,
    /// The connection is gone. Implies `eliminated`; a departed player
    /// can never answer a disprove offer.
    pub departed: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(character: CharacterName, position: Coord) -> Self {
        Self {
            character,
            position,
            hand: Vec::new(),
            eliminated: false,
            departed: false,
        }
    }

    /// Cards in this hand matching any of the suggested cards, in hand
    /// order.
    #[must_use]
    pub fn matching_cards(&self, suggestion: &[String; 3]) -> Vec<String> {
        self.hand
            .iter()
            .filter(|card| suggestion.contains(card))
            .cloned()
            .collect()
    }
}

/// The hidden suspect/weapon/room triple. Chosen uniformly at random
/// at session creation, immutable for the lifetime of one game, and
/// excluded from the dealt deck.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    pub suspect: String,
    pub weapon: String,
    pub room: String,
}

impl Solution {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // The card lists are non-empty consts, so `choose` can't fail.
        let suspect = SUSPECTS.choose(rng).copied().unwrap_or(SUSPECTS[0]);
        let weapon = WEAPONS.choose(rng).copied().unwrap_or(WEAPONS[0]);
        let room = ROOMS.choose(rng).copied().unwrap_or(ROOMS[0]);
        Self {
            suspect: suspect.to_string(),
            weapon: weapon.to_string(),
            room: room.to_string(),
        }
    }

    /// Exact, case-sensitive comparison on all three elements.
    #[must_use]
    pub fn matches(&self, suspect: &str, weapon: &str, room: &str) -> bool {
        self.suspect == suspect && self.weapon == weapon && self.room == room
    }

    #[must_use]
    pub fn contains(&self, card: &str) -> bool {
        self.suspect == card || self.weapon == card || self.room == card
    }
}

/// Builds the full deck minus the three solution cards and shuffles it
/// with a uniform random permutation.
pub fn shuffled_deck<R: Rng + ?Sized>(solution: &Solution, rng: &mut R) -> Vec<String> {
    let mut deck: Vec<String> = SUSPECTS
        .iter()
        .chain(WEAPONS.iter())
        .chain(ROOMS.iter())
        .map(ToString::to_string)
        .filter(|card| !solution.contains(card))
        .collect();
    deck.shuffle(rng);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::DECK_SIZE;

    #[test]
    fn character_name_squeezes_whitespace() {
        assert_eq!(CharacterName::new("Miss Scarlet").as_str(), "MissScarlet");
        assert_eq!(CharacterName::new(" MrGreen ").as_str(), "MrGreen");
    }

    #[test]
    fn solution_matching_is_exact_and_case_sensitive() {
        let solution = Solution {
            suspect: "MissScarlet".to_string(),
            weapon: "Knife".to_string(),
            room: "Study".to_string(),
        };
        assert!(solution.matches("MissScarlet", "Knife", "Study"));
        assert!(!solution.matches("missscarlet", "Knife", "Study"));
        assert!(!solution.matches("MissScarlet", "Knife", "Hall"));
        assert!(!solution.matches("MissScarlet", "Rope", "Study"));
    }

    #[test]
    fn shuffled_deck_excludes_exactly_the_solution() {
        let mut rng = rand::rng();
        let solution = Solution::random(&mut rng);
        let deck = shuffled_deck(&solution, &mut rng);
        assert_eq!(deck.len(), DECK_SIZE - 3);
        assert!(deck.iter().all(|card| !solution.contains(card)));
        // No duplicates.
        let mut sorted = deck.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), deck.len());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use rand::{SeedableRng, rngs::StdRng};

        proptest! {
            #[test]
            fn every_deck_is_complete_and_solution_free(seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let solution = Solution::random(&mut rng);
                let deck = shuffled_deck(&solution, &mut rng);
                prop_assert_eq!(deck.len(), DECK_SIZE - 3);
                prop_assert!(deck.iter().all(|card| !solution.contains(card)));
                let mut sorted = deck.clone();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), deck.len());
            }
        }
    }

    #[test]
    fn matching_cards_preserves_hand_order() {
        let mut player = PlayerState::new(
            CharacterName::new("MrsPeacock"),
            Coord::new(4, 2),
        );
        player.hand = vec![
            "Rope".to_string(),
            "Study".to_string(),
            "Knife".to_string(),
        ];
        let suggestion = [
            "MissScarlet".to_string(),
            "Knife".to_string(),
            "Study".to_string(),
        ];
        assert_eq!(player.matching_cards(&suggestion), vec!["Study", "Knife"]);
    }
}
