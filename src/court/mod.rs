//! Court-side domain vocabulary: player roles, branches, slots, and the pure
//! rotation/libero projections applied to a formation.

pub mod libero;
pub mod rotation;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use rotation::{Formation, Slot, rotate_clockwise};

/// On-court role a player is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Playmaker running the offense (armador).
    Setter,
    /// Middle blocker (central).
    Middle,
    /// Opposite hitter (opuesto).
    Opposite,
    /// Outside/wing hitter (punta).
    Outside,
    /// Defensive specialist restricted to the back row.
    Libero,
}

/// Gender division (rama) a player belongs to. Substitutions must stay
/// within a single branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Men's division.
    Male,
    /// Women's division.
    Female,
}
