use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    court::{Branch, Role, Slot},
    stats::{Action, AttitudeGrade},
};

/// Statistics bucket a live session aggregates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatContext {
    /// Competitive match counters.
    Match,
    /// Training counters.
    Training,
}

impl StatContext {
    /// Field prefix used in the persisted per-player statistics document.
    pub fn field_prefix(self) -> &'static str {
        match self {
            StatContext::Match => "match",
            StatContext::Training => "training",
        }
    }
}

/// Representation of a club player stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier for the player.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Jersey number.
    pub number: u8,
    /// Court role the player normally plays.
    pub role: Role,
    /// Branch of the club the player belongs to.
    pub branch: Branch,
}

/// Persisted starting lineup: six slots plus an optional designated libero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineupEntity {
    /// Primary key of the lineup.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Human readable lineup name.
    pub name: String,
    /// Branch this lineup belongs to.
    pub branch: Branch,
    /// Player occupying each rotational slot.
    pub formation: IndexMap<Slot, Uuid>,
    /// Designated libero, if any.
    pub libero: Option<Uuid>,
}

/// Errors raised when validating a loaded lineup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineupValidationError {
    /// The lineup does not fill all six slots.
    #[error("lineup fills {0} of 6 slots")]
    IncompleteFormation(usize),
    /// A player occupies more than one slot.
    #[error("player {0} occupies more than one slot")]
    DuplicatePlayer(Uuid),
    /// The designated libero also occupies a slot.
    #[error("libero {0} occupies a rotational slot")]
    LiberoOnCourt(Uuid),
}

impl LineupEntity {
    /// Check the structural invariants of a lineup loaded from storage.
    pub fn validate(&self) -> Result<(), LineupValidationError> {
        if self.formation.len() != 6 {
            return Err(LineupValidationError::IncompleteFormation(
                self.formation.len(),
            ));
        }
        let mut seen = Vec::with_capacity(6);
        for &player in self.formation.values() {
            if seen.contains(&player) {
                return Err(LineupValidationError::DuplicatePlayer(player));
            }
            seen.push(player);
        }
        if let Some(libero) = self.libero
            && seen.contains(&libero)
        {
            return Err(LineupValidationError::LiberoOnCourt(libero));
        }
        Ok(())
    }
}

/// Serve landing point within the opposing court.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServePlacementEntity {
    /// Horizontal landing coordinate (0..=100).
    pub x_percent: f32,
    /// Vertical landing coordinate (0..=100).
    pub y_percent: f32,
    /// Target zone (1..=6).
    pub zone: u8,
}

/// One recorded action, appended to the event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatEventEntity {
    /// Primary key of the event.
    pub id: Uuid,
    /// Context bucket the event belongs to.
    pub context: StatContext,
    /// Identifier of the match or training document.
    pub context_id: Uuid,
    /// Player the action is attributed to.
    pub player_id: Uuid,
    /// The graded action.
    pub action: Action,
    /// Serve landing point, for serve actions recorded through the
    /// placement flow.
    pub placement: Option<ServePlacementEntity>,
    /// Set number at recording time (match context only).
    pub set_number: Option<u16>,
    /// Tracked team score at recording time (match context only).
    pub score_local: Option<u16>,
    /// Rival score at recording time (match context only).
    pub score_rival: Option<u16>,
    /// When the action was recorded.
    pub recorded_at: SystemTime,
}

/// Aggregate match entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Opponent club name.
    pub opponent: String,
    /// Branch of the tracked lineup.
    pub branch: Branch,
    /// Lineup the match started from.
    pub lineup_id: Uuid,
    /// When tracking started.
    pub started_at: SystemTime,
    /// Whether the match was tracked to completion.
    pub completed: bool,
    /// Sets taken by the tracked team.
    pub sets_local: u16,
    /// Sets taken by the rival.
    pub sets_rival: u16,
}

/// Training attendance entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingEntity {
    /// Primary key of the training session.
    pub id: Uuid,
    /// When tracking started.
    pub started_at: SystemTime,
    /// Players who attended.
    pub attendees: Vec<Uuid>,
}

/// Attitude grade already persisted for one player within a training
/// session, read back as the grading prefill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttitudeDefaultEntity {
    /// Player the prefill applies to.
    pub player_id: Uuid,
    /// Suggested grade.
    pub grade: AttitudeGrade,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup(formation: &[(Slot, Uuid)], libero: Option<Uuid>) -> LineupEntity {
        LineupEntity {
            id: Uuid::new_v4(),
            name: "starting six".into(),
            branch: Branch::Female,
            formation: formation.iter().copied().collect(),
            libero,
        }
    }

    #[test]
    fn full_distinct_lineup_validates() {
        let players: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        let formation: Vec<(Slot, Uuid)> =
            Slot::ALL.iter().zip(&players).map(|(&s, &p)| (s, p)).collect();
        assert_eq!(lineup(&formation, Some(Uuid::new_v4())).validate(), Ok(()));
    }

    #[test]
    fn incomplete_lineup_is_rejected() {
        let formation = [(Slot::Pos1, Uuid::new_v4()), (Slot::Pos2, Uuid::new_v4())];
        assert_eq!(
            lineup(&formation, None).validate(),
            Err(LineupValidationError::IncompleteFormation(2))
        );
    }

    #[test]
    fn duplicated_player_is_rejected() {
        let mut players: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        players.push(players[0]);
        let formation: Vec<(Slot, Uuid)> =
            Slot::ALL.iter().zip(&players).map(|(&s, &p)| (s, p)).collect();
        assert_eq!(
            lineup(&formation, None).validate(),
            Err(LineupValidationError::DuplicatePlayer(players[0]))
        );
    }

    #[test]
    fn libero_standing_in_a_slot_is_rejected() {
        let players: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        let formation: Vec<(Slot, Uuid)> =
            Slot::ALL.iter().zip(&players).map(|(&s, &p)| (s, p)).collect();
        assert_eq!(
            lineup(&formation, Some(players[3])).validate(),
            Err(LineupValidationError::LiberoOnCourt(players[3]))
        );
    }
}
