use std::time::SystemTime;

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    court::{Branch, Formation, Role, libero::resolved_court, rotation::rotate_clockwise},
    dao::models::{PlayerEntity, StatContext},
    state::set_machine::{RallyRecap, SetScoreboard, TeamSide},
};

/// Club player tracked during a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Primary key of the player.
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

impl From<PlayerEntity> for Player {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            number: value.number,
            role: value.role,
            branch: value.branch,
        }
    }
}

/// What kind of live session is open and which persisted document it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionContext {
    /// Competitive match against an opponent.
    Match {
        /// Identifier of the match document.
        match_id: Uuid,
        /// Opponent club name.
        opponent: String,
    },
    /// Training attendance session.
    Training {
        /// Identifier of the training document.
        session_id: Uuid,
    },
}

impl SessionContext {
    /// Statistics bucket this session aggregates into.
    pub fn stat_context(&self) -> StatContext {
        match self {
            SessionContext::Match { .. } => StatContext::Match,
            SessionContext::Training { .. } => StatContext::Training,
        }
    }

    /// Identifier of the persisted session document.
    pub fn context_id(&self) -> Uuid {
        match self {
            SessionContext::Match { match_id, .. } => *match_id,
            SessionContext::Training { session_id } => *session_id,
        }
    }
}

/// Errors raised when validating a substitution request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    /// The leaving player does not stand in the starting formation.
    #[error("player {0} is not on court")]
    NotOnCourt(Uuid),
    /// The entering player already stands in the starting formation.
    #[error("player {0} is already on court")]
    AlreadyOnCourt(Uuid),
    /// The entering player belongs to the other branch of the club.
    #[error("player {0} belongs to a different branch")]
    BranchMismatch(Uuid),
    /// The player is not part of the session roster.
    #[error("player {0} is not in the session roster")]
    UnknownPlayer(Uuid),
}

/// In-memory state of the live session being tracked.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    /// Runtime identifier of the session.
    pub id: Uuid,
    /// Match or training context.
    pub context: SessionContext,
    /// When the session was opened.
    pub started_at: SystemTime,
    /// Players available in this session, keyed by id.
    pub roster: IndexMap<Uuid, Player>,
    /// Starting formation by rotational slot (empty in training).
    pub formation: Formation,
    /// Designated libero, if any.
    pub libero: Option<Uuid>,
    /// Scoreboard (meaningful in match context only).
    pub scoreboard: SetScoreboard,
}

impl TrackerSession {
    /// Open a match session with a starting six and optional libero.
    pub fn new_match(
        opponent: String,
        roster: IndexMap<Uuid, Player>,
        formation: Formation,
        libero: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            context: SessionContext::Match {
                match_id: Uuid::new_v4(),
                opponent,
            },
            started_at: SystemTime::now(),
            roster,
            formation,
            libero,
            scoreboard: SetScoreboard::default(),
        }
    }

    /// Open a training session for the given attendees.
    pub fn new_training(roster: IndexMap<Uuid, Player>) -> Self {
        Self {
            id: Uuid::new_v4(),
            context: SessionContext::Training {
                session_id: Uuid::new_v4(),
            },
            started_at: SystemTime::now(),
            roster,
            formation: Formation::new(),
            libero: None,
            scoreboard: SetScoreboard::default(),
        }
    }

    /// Whether the tracked team currently holds serve.
    pub fn tracked_serving(&self) -> bool {
        self.scoreboard.local_serving()
    }

    /// Rotate the starting formation one position clockwise.
    pub fn rotate(&mut self) {
        self.formation = rotate_clockwise(&self.formation);
    }

    /// Award a rally and rotate the formation when the recap calls for it.
    pub fn apply_rally(&mut self, winner: TeamSide) -> RallyRecap {
        let recap = self.scoreboard.award_point(winner);
        if recap.rotate_tracked {
            self.rotate();
        }
        recap
    }

    /// Formation as actually standing on court, with the libero swapped in
    /// for the eligible back-row middle.
    pub fn resolved_court(&self) -> Formation {
        resolved_court(
            &self.formation,
            &self.roster,
            self.libero,
            &self.scoreboard.serve,
            self.scoreboard.rally_live,
        )
    }

    /// Swap a court player for a bench player in the starting formation.
    pub fn substitute(&mut self, leaving: Uuid, entering: Uuid) -> Result<(), SubstitutionError> {
        let entering_player = self
            .roster
            .get(&entering)
            .ok_or(SubstitutionError::UnknownPlayer(entering))?;
        let leaving_player = self
            .roster
            .get(&leaving)
            .ok_or(SubstitutionError::UnknownPlayer(leaving))?;
        if entering_player.branch != leaving_player.branch {
            return Err(SubstitutionError::BranchMismatch(entering));
        }
        if self.formation.values().any(|&id| id == entering) || self.libero == Some(entering) {
            return Err(SubstitutionError::AlreadyOnCourt(entering));
        }
        if self.libero == Some(leaving) {
            self.libero = Some(entering);
            return Ok(());
        }
        let slot = self
            .formation
            .iter()
            .find_map(|(&slot, &id)| (id == leaving).then_some(slot))
            .ok_or(SubstitutionError::NotOnCourt(leaving))?;
        self.formation.insert(slot, entering);
        Ok(())
    }

    /// Roster players not currently standing on court, restricted to the
    /// leaving player's branch.
    pub fn eligible_substitutes(&self, leaving: Uuid) -> Vec<&Player> {
        let Some(leaving_player) = self.roster.get(&leaving) else {
            return Vec::new();
        };
        self.roster
            .values()
            .filter(|player| {
                player.id != leaving
                    && player.branch == leaving_player.branch
                    && self.libero != Some(player.id)
                    && !self.formation.values().any(|&id| id == player.id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Slot;
    use crate::state::set_machine::ServeState;

    fn player(name: &str, role: Role) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.into(),
            number: 7,
            role,
            branch: Branch::Female,
        }
    }

    fn match_session() -> (TrackerSession, Vec<Uuid>) {
        let players: Vec<Player> = [
            ("setter", Role::Setter),
            ("opposite", Role::Opposite),
            ("middle-1", Role::Middle),
            ("middle-2", Role::Middle),
            ("outside-1", Role::Outside),
            ("outside-2", Role::Outside),
            ("bench", Role::Outside),
        ]
        .into_iter()
        .map(|(name, role)| player(name, role))
        .collect();
        let ids: Vec<Uuid> = players.iter().map(|p| p.id).collect();
        let roster: IndexMap<Uuid, Player> =
            players.into_iter().map(|p| (p.id, p)).collect();
        let formation: Formation = Slot::ALL.iter().zip(&ids).map(|(&s, &id)| (s, id)).collect();
        let session = TrackerSession::new_match("CV Rival".into(), roster, formation, None);
        (session, ids)
    }

    #[test]
    fn winning_back_serve_rotates_the_session_formation() {
        let (mut session, ids) = match_session();
        session.scoreboard.serve = ServeState::Serving(TeamSide::Rival);
        let recap = session.apply_rally(TeamSide::Local);
        assert!(recap.rotate_tracked);
        // Pos2's occupant moves into the serving slot.
        assert_eq!(session.formation.get(&Slot::Pos1), Some(&ids[1]));
    }

    #[test]
    fn substitution_replaces_the_leaving_player_in_place() {
        let (mut session, ids) = match_session();
        let bench = ids[6];
        session.substitute(ids[2], bench).unwrap();
        assert_eq!(session.formation.get(&Slot::Pos3), Some(&bench));
        assert!(!session.formation.values().any(|&id| id == ids[2]));
    }

    #[test]
    fn substitution_rejects_players_already_on_court() {
        let (mut session, ids) = match_session();
        assert_eq!(
            session.substitute(ids[0], ids[1]),
            Err(SubstitutionError::AlreadyOnCourt(ids[1]))
        );
    }

    #[test]
    fn substitution_rejects_cross_branch_entrants() {
        let (mut session, ids) = match_session();
        let mut stranger = player("stranger", Role::Middle);
        stranger.branch = Branch::Male;
        let stranger_id = stranger.id;
        session.roster.insert(stranger_id, stranger);
        assert_eq!(
            session.substitute(ids[0], stranger_id),
            Err(SubstitutionError::BranchMismatch(stranger_id))
        );
    }

    #[test]
    fn substitution_rejects_unknown_players() {
        let (mut session, ids) = match_session();
        let ghost = Uuid::new_v4();
        assert_eq!(
            session.substitute(ids[0], ghost),
            Err(SubstitutionError::UnknownPlayer(ghost))
        );
    }

    #[test]
    fn eligible_substitutes_exclude_court_and_other_branch() {
        let (mut session, ids) = match_session();
        let mut stranger = player("stranger", Role::Middle);
        stranger.branch = Branch::Male;
        session.roster.insert(stranger.id, stranger);

        let eligible = session.eligible_substitutes(ids[0]);
        let eligible_ids: Vec<Uuid> = eligible.iter().map(|p| p.id).collect();
        assert_eq!(eligible_ids, vec![ids[6]]);
    }

    #[test]
    fn libero_substitution_swaps_the_designation() {
        let (mut session, ids) = match_session();
        session.libero = Some(ids[6]);
        let mut fresh = player("fresh", Role::Libero);
        fresh.branch = Branch::Female;
        let fresh_id = fresh.id;
        session.roster.insert(fresh_id, fresh);
        session.substitute(ids[6], fresh_id).unwrap();
        assert_eq!(session.libero, Some(fresh_id));
    }

    #[test]
    fn training_sessions_start_with_an_empty_court() {
        let roster: IndexMap<Uuid, Player> = [player("a", Role::Setter)]
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let session = TrackerSession::new_training(roster);
        assert!(session.formation.is_empty());
        assert!(session.libero.is_none());
        assert_eq!(session.context.stat_context(), StatContext::Training);
    }
}
