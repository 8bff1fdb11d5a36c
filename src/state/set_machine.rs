//! Scoreboard state machine for a tracked match: points, serve possession,
//! side-outs, rotations and set completion.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Points needed to close a set.
pub const SET_TARGET_POINTS: u16 = 25;
/// Minimum lead required to close a set.
pub const SET_WIN_MARGIN: u16 = 2;

/// One of the two sides of the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    /// The tracked club team.
    Local,
    /// The opponent.
    Rival,
}

/// Who currently holds serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", content = "side", rename_all = "snake_case")]
pub enum ServeState {
    /// No initial server has been designated yet.
    NoServer,
    /// The given side is serving.
    Serving(TeamSide),
}

/// Errors raised by explicit scoreboard commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreboardError {
    /// The initial server can only be set while nobody holds serve.
    #[error("the initial server is already designated")]
    ServerAlreadySet,
}

/// Outcome of awarding a rally, consumed by the service layer to decide
/// broadcasts and follow-up persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RallyRecap {
    /// Which side won the rally.
    pub winner: TeamSide,
    /// The winner did not hold serve before the rally.
    pub side_out: bool,
    /// The tracked team must rotate clockwise before the next rally.
    pub rotate_tracked: bool,
    /// Present when the rally closed the set.
    pub set_won: Option<SetRecap>,
}

/// Details of a completed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRecap {
    /// Side that took the set.
    pub winner: TeamSide,
    /// Final local score of the set.
    pub score_local: u16,
    /// Final rival score of the set.
    pub score_rival: u16,
    /// 1-based number of the set that just finished.
    pub set_number: u16,
}

/// Live scoreboard for the match in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SetScoreboard {
    /// Points of the tracked team in the current set.
    pub score_local: u16,
    /// Points of the rival in the current set.
    pub score_rival: u16,
    /// 1-based number of the set being played.
    pub current_set: u16,
    /// Sets taken by the tracked team.
    pub sets_local: u16,
    /// Sets taken by the rival.
    pub sets_rival: u16,
    /// Current serve possession.
    pub serve: ServeState,
    /// A serve has landed in play and the rally is still open.
    pub rally_live: bool,
}

impl Default for SetScoreboard {
    fn default() -> Self {
        Self {
            score_local: 0,
            score_rival: 0,
            current_set: 1,
            sets_local: 0,
            sets_rival: 0,
            serve: ServeState::NoServer,
            rally_live: false,
        }
    }
}

impl SetScoreboard {
    /// Whether the tracked team holds serve right now.
    pub fn local_serving(&self) -> bool {
        self.serve == ServeState::Serving(TeamSide::Local)
    }

    /// Designate the side serving first. Only valid while serve possession
    /// is still undetermined.
    pub fn set_initial_server(&mut self, side: TeamSide) -> Result<(), ScoreboardError> {
        if self.serve != ServeState::NoServer {
            return Err(ScoreboardError::ServerAlreadySet);
        }
        self.serve = ServeState::Serving(side);
        Ok(())
    }

    /// Mark the current rally as live (serve landed in play).
    pub fn mark_rally_live(&mut self) {
        self.rally_live = true;
    }

    /// Award the rally to a side: bump the score, resolve serve possession
    /// and side-out, detect set completion and reset for the next set when
    /// it happens.
    pub fn award_point(&mut self, winner: TeamSide) -> RallyRecap {
        let serve_before = self.serve;
        match winner {
            TeamSide::Local => self.score_local += 1,
            TeamSide::Rival => self.score_rival += 1,
        }
        let side_out = serve_before != ServeState::Serving(winner);
        // The tracked lineup rotates only when it wins back the serve.
        let rotate_tracked =
            winner == TeamSide::Local && serve_before == ServeState::Serving(TeamSide::Rival);
        self.serve = ServeState::Serving(winner);
        self.rally_live = false;

        let set_won = self.close_set_if_won();
        RallyRecap {
            winner,
            side_out,
            rotate_tracked,
            set_won,
        }
    }

    /// Nudge a side's score by one, clamped at zero. Manual adjustments
    /// never touch serve possession and never complete a set.
    pub fn adjust_score(&mut self, side: TeamSide, delta: i8) {
        let score = match side {
            TeamSide::Local => &mut self.score_local,
            TeamSide::Rival => &mut self.score_rival,
        };
        if delta >= 0 {
            *score = score.saturating_add(delta as u16);
        } else {
            *score = score.saturating_sub(delta.unsigned_abs() as u16);
        }
    }

    fn close_set_if_won(&mut self) -> Option<SetRecap> {
        let (leader, lead_score, trail_score) = if self.score_local >= self.score_rival {
            (TeamSide::Local, self.score_local, self.score_rival)
        } else {
            (TeamSide::Rival, self.score_rival, self.score_local)
        };
        if lead_score < SET_TARGET_POINTS || lead_score - trail_score < SET_WIN_MARGIN {
            return None;
        }
        let recap = SetRecap {
            winner: leader,
            score_local: self.score_local,
            score_rival: self.score_rival,
            set_number: self.current_set,
        };
        match leader {
            TeamSide::Local => self.sets_local += 1,
            TeamSide::Rival => self.sets_rival += 1,
        }
        self.current_set += 1;
        self.score_local = 0;
        self.score_rival = 0;
        self.serve = ServeState::NoServer;
        self.rally_live = false;
        Some(recap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_point_while_serving_keeps_serve_without_rotation() {
        let mut board = SetScoreboard::default();
        board.set_initial_server(TeamSide::Local).unwrap();
        let recap = board.award_point(TeamSide::Local);
        assert_eq!(board.score_local, 1);
        assert!(!recap.side_out);
        assert!(!recap.rotate_tracked);
        assert_eq!(board.serve, ServeState::Serving(TeamSide::Local));
    }

    #[test]
    fn winning_back_the_serve_triggers_a_rotation() {
        let mut board = SetScoreboard::default();
        board.set_initial_server(TeamSide::Rival).unwrap();
        let recap = board.award_point(TeamSide::Local);
        assert!(recap.side_out);
        assert!(recap.rotate_tracked);
        assert_eq!(board.serve, ServeState::Serving(TeamSide::Local));
    }

    #[test]
    fn rival_side_out_never_rotates_the_tracked_team() {
        let mut board = SetScoreboard::default();
        board.set_initial_server(TeamSide::Local).unwrap();
        let recap = board.award_point(TeamSide::Rival);
        assert!(recap.side_out);
        assert!(!recap.rotate_tracked);
        assert_eq!(board.serve, ServeState::Serving(TeamSide::Rival));
    }

    #[test]
    fn set_closes_at_target_with_two_point_margin() {
        let mut board = SetScoreboard {
            score_local: 24,
            score_rival: 20,
            serve: ServeState::Serving(TeamSide::Local),
            ..SetScoreboard::default()
        };
        let recap = board.award_point(TeamSide::Local);
        let set = recap.set_won.expect("set should close at 25-20");
        assert_eq!(set.winner, TeamSide::Local);
        assert_eq!((set.score_local, set.score_rival), (25, 20));
        assert_eq!(set.set_number, 1);
        assert_eq!(board.current_set, 2);
        assert_eq!((board.score_local, board.score_rival), (0, 0));
        assert_eq!(board.sets_local, 1);
        assert_eq!(board.serve, ServeState::NoServer);
        assert!(!board.rally_live);
    }

    #[test]
    fn set_stays_open_at_twenty_four_all() {
        let mut board = SetScoreboard {
            score_local: 24,
            score_rival: 24,
            serve: ServeState::Serving(TeamSide::Rival),
            ..SetScoreboard::default()
        };
        assert!(board.award_point(TeamSide::Local).set_won.is_none());
        assert_eq!((board.score_local, board.score_rival), (25, 24));
        assert!(board.award_point(TeamSide::Local).set_won.is_some());
    }

    #[test]
    fn manual_adjustment_clamps_at_zero_and_never_closes_a_set() {
        let mut board = SetScoreboard::default();
        board.adjust_score(TeamSide::Local, -1);
        assert_eq!(board.score_local, 0);

        board.score_local = 24;
        board.score_rival = 10;
        board.serve = ServeState::Serving(TeamSide::Rival);
        board.adjust_score(TeamSide::Local, 1);
        assert_eq!(board.score_local, 25);
        assert_eq!(board.current_set, 1);
        assert_eq!(board.serve, ServeState::Serving(TeamSide::Rival));
    }

    #[test]
    fn initial_server_can_only_be_set_once() {
        let mut board = SetScoreboard::default();
        board.set_initial_server(TeamSide::Local).unwrap();
        assert_eq!(
            board.set_initial_server(TeamSide::Rival),
            Err(ScoreboardError::ServerAlreadySet)
        );
    }

    #[test]
    fn awarding_a_point_clears_the_live_rally() {
        let mut board = SetScoreboard::default();
        board.set_initial_server(TeamSide::Local).unwrap();
        board.mark_rally_live();
        assert!(board.rally_live);
        board.award_point(TeamSide::Rival);
        assert!(!board.rally_live);
    }
}
