//! The 6-slot formation and the clockwise rotation permutation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One of the six court positions. `Pos1` is the serving slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Back-right, serving position.
    Pos1,
    /// Front-right.
    Pos2,
    /// Front-center.
    Pos3,
    /// Front-left.
    Pos4,
    /// Back-left.
    Pos5,
    /// Back-center.
    Pos6,
}

impl Slot {
    /// Every slot, in position-number order.
    pub const ALL: [Slot; 6] = [
        Slot::Pos1,
        Slot::Pos2,
        Slot::Pos3,
        Slot::Pos4,
        Slot::Pos5,
        Slot::Pos6,
    ];

    /// The three back-row slots where a libero may stand in.
    pub const BACK_ROW: [Slot; 3] = [Slot::Pos1, Slot::Pos5, Slot::Pos6];

    /// Slot whose occupant moves here on a clockwise rotation:
    /// pos1 <- pos2, pos2 <- pos3, pos3 <- pos4, pos4 <- pos5,
    /// pos5 <- pos6, pos6 <- pos1.
    pub fn feeds_from(self) -> Slot {
        match self {
            Slot::Pos1 => Slot::Pos2,
            Slot::Pos2 => Slot::Pos3,
            Slot::Pos3 => Slot::Pos4,
            Slot::Pos4 => Slot::Pos5,
            Slot::Pos5 => Slot::Pos6,
            Slot::Pos6 => Slot::Pos1,
        }
    }

    /// Whether this slot belongs to the back row.
    pub fn is_back_row(self) -> bool {
        Slot::BACK_ROW.contains(&self)
    }
}

/// Slot-to-player assignment for the tracked team. Always holds real
/// players; the libero never appears here (see [`crate::court::libero`]).
pub type Formation = IndexMap<Slot, Uuid>;

/// Apply one clockwise rotation to a formation, returning the new mapping.
///
/// Pure function shared by manual rotation and the automatic side-out
/// rotation. An empty formation rotates to an empty formation.
pub fn rotate_clockwise(formation: &Formation) -> Formation {
    Slot::ALL
        .iter()
        .filter_map(|&slot| formation.get(&slot.feeds_from()).map(|&player| (slot, player)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_formation() -> Formation {
        Slot::ALL
            .iter()
            .map(|&slot| (slot, Uuid::new_v4()))
            .collect()
    }

    #[test]
    fn rotation_moves_pos2_into_serving_slot() {
        let formation = full_formation();
        let rotated = rotate_clockwise(&formation);

        assert_eq!(rotated[&Slot::Pos1], formation[&Slot::Pos2]);
        assert_eq!(rotated[&Slot::Pos6], formation[&Slot::Pos1]);
        assert_eq!(rotated[&Slot::Pos5], formation[&Slot::Pos6]);
        assert_eq!(rotated[&Slot::Pos4], formation[&Slot::Pos5]);
        assert_eq!(rotated[&Slot::Pos3], formation[&Slot::Pos4]);
        assert_eq!(rotated[&Slot::Pos2], formation[&Slot::Pos3]);
    }

    #[test]
    fn six_rotations_are_the_identity() {
        let formation = full_formation();

        let mut rotated = formation.clone();
        for _ in 0..6 {
            rotated = rotate_clockwise(&rotated);
        }

        assert_eq!(rotated, formation);
    }

    #[test]
    fn fewer_than_six_rotations_are_not_the_identity() {
        let formation = full_formation();

        let mut rotated = formation.clone();
        for _ in 0..5 {
            rotated = rotate_clockwise(&rotated);
            assert_ne!(rotated, formation);
        }
    }

    #[test]
    fn empty_formation_rotates_to_empty() {
        assert!(rotate_clockwise(&Formation::new()).is_empty());
    }

    #[test]
    fn rotation_preserves_the_player_set() {
        let formation = full_formation();
        let rotated = rotate_clockwise(&formation);

        let mut before: Vec<_> = formation.values().copied().collect();
        let mut after: Vec<_> = rotated.values().copied().collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }
}
