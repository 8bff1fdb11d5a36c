//! Read-only projections of a formation: libero stand-ins and the
//! spectator-facing tactical ("game view") ordering.
//!
//! The underlying rotation always stores real players; the functions here
//! only change who is *displayed* at each slot.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    court::{Formation, Role, Slot},
    state::{
        session::Player,
        set_machine::{ServeState, TeamSide},
    },
};

/// Compute the player displayed at each slot once the designated libero is
/// taken into account.
///
/// A back-row slot occupied by a middle blocker shows the libero instead,
/// with one exception: at the serving slot the original middle stays
/// visible while the tracked team holds serve, or while no server has been
/// chosen yet, because the libero cannot legally serve.
pub fn resolved_court(
    formation: &Formation,
    roster: &IndexMap<Uuid, Player>,
    libero: Option<Uuid>,
    serve: &ServeState,
    rally_live: bool,
) -> Formation {
    let Some(libero_id) = libero else {
        return formation.clone();
    };

    formation
        .iter()
        .map(|(&slot, &player_id)| {
            let is_middle = roster
                .get(&player_id)
                .is_some_and(|player| player.role == Role::Middle);

            let swapped = slot.is_back_row()
                && is_middle
                && !(slot == Slot::Pos1 && middle_keeps_serving_slot(serve, rally_live));

            (slot, if swapped { libero_id } else { player_id })
        })
        .collect()
}

/// The serving slot keeps its real occupant while the tracked team serves,
/// and while serve possession is still undetermined before the rally is
/// resolved.
fn middle_keeps_serving_slot(serve: &ServeState, rally_live: bool) -> bool {
    match serve {
        ServeState::Serving(TeamSide::Local) => true,
        ServeState::NoServer => !rally_live,
        ServeState::Serving(TeamSide::Rival) => false,
    }
}

/// Preferred role at each tactical slot of the game view. Back-row
/// defensive slots take whoever remains.
const TACTICAL_TEMPLATE: [(Slot, Option<Role>); 6] = [
    (Slot::Pos4, Some(Role::Outside)),
    (Slot::Pos3, Some(Role::Middle)),
    (Slot::Pos2, Some(Role::Opposite)),
    (Slot::Pos1, Some(Role::Setter)),
    (Slot::Pos5, None),
    (Slot::Pos6, None),
];

/// Re-order a resolved court into canonical tactical slots by role for the
/// spectator display.
///
/// Each templated slot takes the first displayed player of the preferred
/// role; slots left unmatched are filled with the remaining players in
/// court order.
pub fn game_view(resolved: &Formation, roster: &IndexMap<Uuid, Player>) -> Formation {
    let mut pool: Vec<Uuid> = Slot::ALL
        .iter()
        .filter_map(|slot| resolved.get(slot).copied())
        .collect();

    let mut view: Vec<(Slot, Option<Uuid>)> = Vec::with_capacity(6);
    for (slot, wanted) in TACTICAL_TEMPLATE {
        let picked = wanted.and_then(|role| {
            pool.iter()
                .position(|id| roster.get(id).is_some_and(|player| player.role == role))
                .map(|index| pool.remove(index))
        });
        view.push((slot, picked));
    }

    // Fill the slots that found no role match with whoever is left.
    let mut leftovers = pool.into_iter();
    let mut assigned: IndexMap<Slot, Uuid> = view
        .into_iter()
        .filter_map(|(slot, picked)| {
            picked.or_else(|| leftovers.next()).map(|id| (slot, id))
        })
        .collect();

    assigned.sort_by(|a, _, b, _| {
        let rank = |slot: &Slot| Slot::ALL.iter().position(|s| s == slot);
        rank(a).cmp(&rank(b))
    });
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Branch;

    fn player(role: Role) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: format!("{role:?}"),
            number: 1,
            role,
            branch: Branch::Male,
        }
    }

    fn squad() -> (Formation, IndexMap<Uuid, Player>, Uuid) {
        // Standard 5-1: middle rotated into the serving slot.
        let roles = [
            Role::Middle,
            Role::Setter,
            Role::Outside,
            Role::Middle,
            Role::Opposite,
            Role::Outside,
        ];
        let mut roster = IndexMap::new();
        let mut formation = Formation::new();
        for (slot, role) in Slot::ALL.into_iter().zip(roles) {
            let p = player(role);
            formation.insert(slot, p.id);
            roster.insert(p.id, p);
        }
        let libero = player(Role::Libero);
        let libero_id = libero.id;
        roster.insert(libero_id, libero);
        (formation, roster, libero_id)
    }

    #[test]
    fn libero_replaces_back_row_middle_when_rival_serves() {
        let (formation, roster, libero_id) = squad();
        let serve = ServeState::Serving(TeamSide::Rival);

        let resolved = resolved_court(&formation, &roster, Some(libero_id), &serve, true);

        assert_eq!(resolved[&Slot::Pos1], libero_id);
        // Non-middle back-row slots keep their occupants.
        assert_eq!(resolved[&Slot::Pos5], formation[&Slot::Pos5]);
        assert_eq!(resolved[&Slot::Pos6], formation[&Slot::Pos6]);
    }

    #[test]
    fn libero_never_shown_at_serving_slot_while_local_serves() {
        let (formation, roster, libero_id) = squad();
        let serve = ServeState::Serving(TeamSide::Local);

        for rally_live in [false, true] {
            let resolved =
                resolved_court(&formation, &roster, Some(libero_id), &serve, rally_live);
            assert_eq!(resolved[&Slot::Pos1], formation[&Slot::Pos1]);
        }
    }

    #[test]
    fn middle_stays_at_serving_slot_while_server_undecided() {
        let (formation, roster, libero_id) = squad();

        let resolved =
            resolved_court(&formation, &roster, Some(libero_id), &ServeState::NoServer, false);
        assert_eq!(resolved[&Slot::Pos1], formation[&Slot::Pos1]);
    }

    #[test]
    fn no_assigned_libero_leaves_the_court_untouched() {
        let (formation, roster, _) = squad();
        let serve = ServeState::Serving(TeamSide::Rival);

        let resolved = resolved_court(&formation, &roster, None, &serve, true);
        assert_eq!(resolved, formation);
    }

    #[test]
    fn front_row_middle_is_never_swapped() {
        let (mut formation, mut roster, libero_id) = squad();
        // Force a middle into a front-row slot.
        let middle = player(Role::Middle);
        formation.insert(Slot::Pos3, middle.id);
        roster.insert(middle.id, middle.clone());

        let serve = ServeState::Serving(TeamSide::Rival);
        let resolved = resolved_court(&formation, &roster, Some(libero_id), &serve, true);
        assert_eq!(resolved[&Slot::Pos3], middle.id);
    }

    #[test]
    fn game_view_places_roles_at_tactical_slots() {
        let (formation, roster, _) = squad();

        let view = game_view(&formation, &roster);

        let role_at = |slot: Slot| roster[&view[&slot]].role;
        assert_eq!(role_at(Slot::Pos4), Role::Outside);
        assert_eq!(role_at(Slot::Pos3), Role::Middle);
        assert_eq!(role_at(Slot::Pos2), Role::Opposite);
        assert_eq!(role_at(Slot::Pos1), Role::Setter);
        assert_eq!(view.len(), 6);
    }

    #[test]
    fn game_view_fills_unmatched_slots_with_leftovers() {
        // Six outsides: only Pos4 matches by role, the rest are fill-ins.
        let mut roster = IndexMap::new();
        let mut formation = Formation::new();
        for slot in Slot::ALL {
            let p = player(Role::Outside);
            formation.insert(slot, p.id);
            roster.insert(p.id, p);
        }

        let view = game_view(&formation, &roster);
        assert_eq!(view.len(), 6);

        let mut shown: Vec<_> = view.values().copied().collect();
        let mut expected: Vec<_> = formation.values().copied().collect();
        shown.sort();
        expected.sort();
        assert_eq!(shown, expected);
    }
}
