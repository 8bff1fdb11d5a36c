//! Player actions as captured during live tracking: a category paired with
//! its category-specific result.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Action categories offered by the tracking UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Serve (saque), registered through the placement flow in matches.
    Serve,
    /// Attack (ataque).
    Attack,
    /// Block (bloqueo).
    Block,
    /// Reception (recepción).
    Reception,
    /// Floor defense (defensa).
    Defense,
    /// Setting/placement touch, offered to setters and liberos.
    Placement,
    /// Attitude grade, normally assigned at session end.
    Attitude,
}

/// Outcome of a serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServeResult {
    /// Direct point.
    Ace,
    /// Serve lands and the rally continues.
    InPlay,
    /// Net or out; point for the rival.
    Error,
}

/// Outcome of an attack swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttackResult {
    /// Direct point.
    Kill,
    /// Dug up by the opposing defense.
    Defended,
    /// Stuffed by the opposing block.
    Blocked,
    /// Hit out or into the net; point for the rival.
    Error,
}

/// Outcome of a block attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockResult {
    /// Stuff block, direct point.
    Direct,
    /// Deflection (roce) keeping the ball alive.
    Touch,
    /// Tool: the opponent played off the block for their point.
    Used,
    /// Net fault while blocking; point for the rival.
    Net,
}

/// Graded reception quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionResult {
    /// Perfect pass (A).
    Good,
    /// Playable pass (B).
    Regular,
    /// Overpass or shanked ball; point for the rival (C).
    Bad,
}

/// Graded floor-defense quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DefenseResult {
    /// Perfect dig.
    Good,
    /// Positive touch.
    Regular,
    /// Failed dig; point for the rival.
    Error,
}

/// Graded setting/placement quality. These results feed the event log only;
/// no global counter exists for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlacementResult {
    /// On-target set.
    Excellent,
    /// Playable set.
    Good,
    /// Mislocated or doubled set.
    Error,
}

/// Attitude grade assigned per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttitudeGrade {
    /// Outstanding.
    Perfect,
    /// Good.
    Good,
    /// Neutral.
    Regular,
    /// Poor.
    Bad,
    /// Unacceptable.
    Terrible,
}

/// A category together with its category-specific result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "category", content = "result", rename_all = "snake_case")]
pub enum Action {
    /// Serve outcome.
    Serve(ServeResult),
    /// Attack outcome.
    Attack(AttackResult),
    /// Block outcome.
    Block(BlockResult),
    /// Reception grade.
    Reception(ReceptionResult),
    /// Defense grade.
    Defense(DefenseResult),
    /// Placement grade.
    Placement(PlacementResult),
    /// Attitude grade.
    Attitude(AttitudeGrade),
}

impl Action {
    /// Category this action belongs to.
    pub fn category(&self) -> Category {
        match self {
            Action::Serve(_) => Category::Serve,
            Action::Attack(_) => Category::Attack,
            Action::Block(_) => Category::Block,
            Action::Reception(_) => Category::Reception,
            Action::Defense(_) => Category::Defense,
            Action::Placement(_) => Category::Placement,
            Action::Attitude(_) => Category::Attitude,
        }
    }
}

/// Where a serve landed on the opposing court, captured by the serve
/// placement flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ServePlacement {
    /// Horizontal landing coordinate as a percentage of court width.
    #[validate(range(min = 0.0, max = 100.0))]
    pub x_percent: f32,
    /// Vertical landing coordinate as a percentage of court depth.
    #[validate(range(min = 0.0, max = 100.0))]
    pub y_percent: f32,
    /// Court zone (1-6) the serve landed in.
    #[validate(range(min = 1, max = 6))]
    pub zone: u8,
}
