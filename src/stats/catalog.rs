//! Declarative lookup tables driving the tracking engine: counter mapping,
//! point decisions, and per-role category eligibility.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    court::Role,
    dao::models::StatContext,
    stats::action::{
        Action, AttackResult, AttitudeGrade, BlockResult, Category, DefenseResult, ReceptionResult,
        ServeResult,
    },
};

/// Named cumulative counter in a player's global statistics document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CounterField {
    ServeAces,
    ServeErrors,
    ServeGood,
    AttackKills,
    AttackErrors,
    AttackDefended,
    AttackBlocked,
    BlockDirect,
    BlockTouches,
    BlockUsed,
    ReceptionGood,
    ReceptionRegular,
    ReceptionBad,
    DefenseGood,
    DefenseRegular,
    DefenseErrors,
    AttitudePerfect,
    AttitudeGood,
    AttitudeRegular,
    AttitudeBad,
    AttitudeTerrible,
}

impl CounterField {
    /// Stable field name used in the persisted statistics document.
    pub fn as_str(self) -> &'static str {
        match self {
            CounterField::ServeAces => "serve_aces",
            CounterField::ServeErrors => "serve_errors",
            CounterField::ServeGood => "serve_good",
            CounterField::AttackKills => "attack_kills",
            CounterField::AttackErrors => "attack_errors",
            CounterField::AttackDefended => "attack_defended",
            CounterField::AttackBlocked => "attack_blocked",
            CounterField::BlockDirect => "block_direct",
            CounterField::BlockTouches => "block_touches",
            CounterField::BlockUsed => "block_used",
            CounterField::ReceptionGood => "reception_good",
            CounterField::ReceptionRegular => "reception_regular",
            CounterField::ReceptionBad => "reception_bad",
            CounterField::DefenseGood => "defense_good",
            CounterField::DefenseRegular => "defense_regular",
            CounterField::DefenseErrors => "defense_errors",
            CounterField::AttitudePerfect => "attitude_perfect",
            CounterField::AttitudeGood => "attitude_good",
            CounterField::AttitudeRegular => "attitude_regular",
            CounterField::AttitudeBad => "attitude_bad",
            CounterField::AttitudeTerrible => "attitude_terrible",
        }
    }
}

/// Global counter incremented for an action, if one exists.
///
/// Combinations without a counter (every placement grade, for instance)
/// return `None` and are silently skipped by the aggregation step; the
/// event log still records them.
pub fn counter_for(action: &Action) -> Option<CounterField> {
    let field = match action {
        Action::Serve(ServeResult::Ace) => CounterField::ServeAces,
        Action::Serve(ServeResult::Error) => CounterField::ServeErrors,
        Action::Serve(ServeResult::InPlay) => CounterField::ServeGood,
        Action::Attack(AttackResult::Kill) => CounterField::AttackKills,
        Action::Attack(AttackResult::Error) => CounterField::AttackErrors,
        Action::Attack(AttackResult::Defended) => CounterField::AttackDefended,
        Action::Attack(AttackResult::Blocked) => CounterField::AttackBlocked,
        Action::Block(BlockResult::Direct) => CounterField::BlockDirect,
        Action::Block(BlockResult::Touch) => CounterField::BlockTouches,
        // A net fault while blocking shares the "used" counter, as the
        // historical statistics document did.
        Action::Block(BlockResult::Used) | Action::Block(BlockResult::Net) => {
            CounterField::BlockUsed
        }
        Action::Reception(ReceptionResult::Good) => CounterField::ReceptionGood,
        Action::Reception(ReceptionResult::Regular) => CounterField::ReceptionRegular,
        Action::Reception(ReceptionResult::Bad) => CounterField::ReceptionBad,
        Action::Defense(DefenseResult::Good) => CounterField::DefenseGood,
        Action::Defense(DefenseResult::Regular) => CounterField::DefenseRegular,
        Action::Defense(DefenseResult::Error) => CounterField::DefenseErrors,
        Action::Attitude(AttitudeGrade::Perfect) => CounterField::AttitudePerfect,
        Action::Attitude(AttitudeGrade::Good) => CounterField::AttitudeGood,
        Action::Attitude(AttitudeGrade::Regular) => CounterField::AttitudeRegular,
        Action::Attitude(AttitudeGrade::Bad) => CounterField::AttitudeBad,
        Action::Attitude(AttitudeGrade::Terrible) => CounterField::AttitudeTerrible,
        Action::Placement(_) => return None,
    };
    Some(field)
}

/// Immediate effect of an action on the rally, applied in match context
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointDecision {
    /// Point for the tracked team.
    TrackedPoint,
    /// Point for the rival.
    RivalPoint,
    /// The serve landed in play; the rally is now live.
    RallyLive,
    /// No immediate effect on the score.
    NoPoint,
}

/// Decide how an action affects the current rally.
pub fn point_decision(action: &Action) -> PointDecision {
    match action {
        Action::Serve(ServeResult::Ace) => PointDecision::TrackedPoint,
        Action::Serve(ServeResult::Error) => PointDecision::RivalPoint,
        Action::Serve(ServeResult::InPlay) => PointDecision::RallyLive,
        Action::Attack(AttackResult::Kill) | Action::Block(BlockResult::Direct) => {
            PointDecision::TrackedPoint
        }
        Action::Attack(AttackResult::Error)
        | Action::Block(BlockResult::Net)
        | Action::Block(BlockResult::Used)
        | Action::Reception(ReceptionResult::Bad)
        | Action::Defense(DefenseResult::Error) => PointDecision::RivalPoint,
        _ => PointDecision::NoPoint,
    }
}

/// Categories a player may register, given their role, the session context,
/// and whether the tracked team currently holds serve.
///
/// Match context: the libero is never offered serve, attack or block;
/// reception is hidden while the tracked team serves; placement is reserved
/// for setters and liberos. Training exposes every category to every role.
pub fn allowed_categories(role: Role, context: StatContext, tracked_serving: bool) -> Vec<Category> {
    match context {
        StatContext::Training => vec![
            Category::Serve,
            Category::Attack,
            Category::Block,
            Category::Reception,
            Category::Defense,
            Category::Placement,
            Category::Attitude,
        ],
        StatContext::Match => {
            let mut categories = vec![Category::Serve];
            if role != Role::Libero {
                categories.extend([Category::Attack, Category::Block]);
            } else {
                categories.clear();
            }
            if !tracked_serving {
                categories.push(Category::Reception);
            }
            categories.push(Category::Defense);
            if matches!(role, Role::Setter | Role::Libero) {
                categories.push(Category::Placement);
            }
            categories.push(Category::Attitude);
            categories
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::action::PlacementResult;

    #[test]
    fn ace_maps_to_serve_aces() {
        assert_eq!(
            counter_for(&Action::Serve(ServeResult::Ace)),
            Some(CounterField::ServeAces)
        );
    }

    #[test]
    fn block_net_shares_the_used_counter() {
        assert_eq!(
            counter_for(&Action::Block(BlockResult::Net)),
            Some(CounterField::BlockUsed)
        );
        assert_eq!(
            counter_for(&Action::Block(BlockResult::Used)),
            Some(CounterField::BlockUsed)
        );
    }

    #[test]
    fn placement_grades_have_no_counter() {
        for result in [
            PlacementResult::Excellent,
            PlacementResult::Good,
            PlacementResult::Error,
        ] {
            assert_eq!(counter_for(&Action::Placement(result)), None);
        }
    }

    #[test]
    fn point_decisions_follow_the_result_class() {
        assert_eq!(
            point_decision(&Action::Attack(AttackResult::Kill)),
            PointDecision::TrackedPoint
        );
        assert_eq!(
            point_decision(&Action::Block(BlockResult::Direct)),
            PointDecision::TrackedPoint
        );
        assert_eq!(
            point_decision(&Action::Serve(ServeResult::InPlay)),
            PointDecision::RallyLive
        );
        for rival in [
            Action::Serve(ServeResult::Error),
            Action::Attack(AttackResult::Error),
            Action::Block(BlockResult::Net),
            Action::Block(BlockResult::Used),
            Action::Reception(ReceptionResult::Bad),
            Action::Defense(DefenseResult::Error),
        ] {
            assert_eq!(point_decision(&rival), PointDecision::RivalPoint);
        }
        for neutral in [
            Action::Attack(AttackResult::Defended),
            Action::Attack(AttackResult::Blocked),
            Action::Block(BlockResult::Touch),
            Action::Reception(ReceptionResult::Regular),
            Action::Defense(DefenseResult::Good),
            Action::Placement(PlacementResult::Excellent),
            Action::Attitude(AttitudeGrade::Perfect),
        ] {
            assert_eq!(point_decision(&neutral), PointDecision::NoPoint);
        }
    }

    #[test]
    fn libero_is_never_offered_attack_block_or_serve_in_matches() {
        let categories = allowed_categories(Role::Libero, StatContext::Match, false);
        assert!(!categories.contains(&Category::Serve));
        assert!(!categories.contains(&Category::Attack));
        assert!(!categories.contains(&Category::Block));
        assert!(categories.contains(&Category::Placement));
    }

    #[test]
    fn reception_is_hidden_while_the_tracked_team_serves() {
        let serving = allowed_categories(Role::Outside, StatContext::Match, true);
        assert!(!serving.contains(&Category::Reception));

        let receiving = allowed_categories(Role::Outside, StatContext::Match, false);
        assert!(receiving.contains(&Category::Reception));
    }

    #[test]
    fn training_offers_every_category_to_every_role() {
        for role in [Role::Setter, Role::Middle, Role::Libero] {
            let categories = allowed_categories(role, StatContext::Training, true);
            assert!(categories.contains(&Category::Serve));
            assert!(categories.contains(&Category::Attack));
            assert!(categories.contains(&Category::Reception));
        }
    }

    #[test]
    fn placement_is_reserved_for_setters_and_liberos_in_matches() {
        for role in [Role::Middle, Role::Outside, Role::Opposite] {
            let categories = allowed_categories(role, StatContext::Match, false);
            assert!(!categories.contains(&Category::Placement));
        }
        let setter = allowed_categories(Role::Setter, StatContext::Match, false);
        assert!(setter.contains(&Category::Placement));
    }
}
