use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::BracketError;
use crate::invalidation::{clear_team, clear_team_cascade};
use crate::progression::apply_result;
use crate::seeding::initialize;
use crate::standings::{champion, ready_matches, team_statuses, TeamStanding};
use crate::store::BracketStore;
use crate::types::*;

// ── Helpers ─────────────────────────────────────────────────────────────

pub fn shared_tournament(store: Box<dyn BracketStore + Send>, cascade_clears: bool) -> SharedTournament {
    Arc::new(Mutex::new(TournamentState { store, cascade_clears }))
}

/// Lock the mutex, then call `f` with the tournament state.
fn with_state<F, R>(shared: &SharedTournament, f: F) -> Result<R, String>
where
    F: FnOnce(&mut TournamentState) -> Result<R, String>,
{
    let mut guard = shared.lock().map_err(|e| e.to_string())?;
    f(&mut guard)
}

/// Read the stored bracket, run one engine step on it, write the result back.
/// Without a stored bracket nothing runs and `None` is returned.
fn with_bracket<F>(shared: &SharedTournament, f: F) -> Result<Option<Bracket>, String>
where
    F: FnOnce(&Bracket, bool) -> Result<Bracket, BracketError>,
{
    with_state(shared, |state| {
        let Some(current) = state.store.load().map_err(|e| e.to_string())? else {
            debug!("no bracket stored; command ignored");
            return Ok(None);
        };
        let next = f(&current, state.cascade_clears).map_err(|e| e.to_string())?;
        state.store.save(&next).map_err(|e| e.to_string())?;
        Ok(Some(next))
    })
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub ready_matches: Vec<MatchId>,
    pub champion: Option<Team>,
    pub teams: Vec<TeamStanding>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceStatus {
    pub location: String,
    pub has_bracket: bool,
    pub cascade_clears: bool,
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn tournament_state(shared: &SharedTournament) -> Result<Option<Bracket>, String> {
    with_state(shared, |state| state.store.load().map_err(|e| e.to_string()))
}

/// Seed a new bracket, replacing any stored one. On a precondition failure the
/// stored bracket is left as it was.
pub fn tournament_initialize(
    teams: Vec<Team>,
    players: Vec<Player>,
    shared: &SharedTournament,
) -> Result<Bracket, String> {
    with_state(shared, |state| {
        let bracket = initialize(&teams, &players).map_err(|e| {
            warn!("bracket not initialized: {e}");
            e.to_string()
        })?;
        state.store.save(&bracket).map_err(|e| e.to_string())?;
        info!(location = %state.store.location(), "tournament bracket replaced");
        Ok(bracket)
    })
}

pub fn tournament_apply_result(
    section: Section,
    round_index: usize,
    match_index: usize,
    winner: Team,
    shared: &SharedTournament,
) -> Result<Option<Bracket>, String> {
    let at = MatchRef::new(section, round_index, match_index);
    with_bracket(shared, |bracket, _| apply_result(bracket, at, &winner))
}

/// Clear a team from a match, cascading when the tournament is configured to.
/// An unknown match id leaves the bracket unchanged.
pub fn tournament_clear_team(
    match_id: String,
    team_id: TeamId,
    shared: &SharedTournament,
) -> Result<Option<Bracket>, String> {
    let parsed = match match_id.parse::<MatchId>() {
        Ok(id) => Some(id),
        Err(e) => {
            debug!("clear ignored: {e}");
            None
        }
    };
    with_bracket(shared, |bracket, cascade| {
        let Some(id) = parsed else {
            return Ok(bracket.clone());
        };
        if cascade {
            Ok(clear_team_cascade(bracket, id, team_id))
        } else {
            Ok(clear_team(bracket, id, team_id))
        }
    })
}

pub fn tournament_reset(shared: &SharedTournament) -> Result<(), String> {
    with_state(shared, |state| {
        state.store.clear().map_err(|e| e.to_string())?;
        info!(location = %state.store.location(), "tournament bracket removed");
        Ok(())
    })
}

pub fn tournament_summary(shared: &SharedTournament) -> Result<Option<TournamentSummary>, String> {
    let Some(bracket) = tournament_state(shared)? else {
        return Ok(None);
    };
    Ok(Some(TournamentSummary {
        ready_matches: ready_matches(&bracket),
        champion: champion(&bracket).cloned(),
        teams: team_statuses(&bracket),
    }))
}

pub fn tournament_persistence_status(shared: &SharedTournament) -> Result<PersistenceStatus, String> {
    with_state(shared, |state| {
        Ok(PersistenceStatus {
            location: state.store.location(),
            has_bracket: state.store.load().map_err(|e| e.to_string())?.is_some(),
            cascade_clears: state.cascade_clears,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::tests::roster;
    use crate::store::MemoryStore;

    fn seeded_shared(cascade: bool) -> SharedTournament {
        let shared = shared_tournament(Box::new(MemoryStore::new()), cascade);
        let (teams, players) = roster();
        tournament_initialize(teams, players, &shared).unwrap();
        shared
    }

    fn team_at(bracket: &Bracket, id: MatchId, slot: Slot) -> Team {
        bracket.find_match(id).unwrap().slot(slot).cloned().unwrap()
    }

    #[test]
    fn test_commands_without_bracket_are_ignored() {
        let shared = shared_tournament(Box::new(MemoryStore::new()), true);
        assert_eq!(tournament_state(&shared).unwrap(), None);
        let (teams, _) = roster();
        let result = tournament_apply_result(Section::Winners, 0, 0, teams[0].clone(), &shared).unwrap();
        assert_eq!(result, None);
        assert!(tournament_summary(&shared).unwrap().is_none());
    }

    #[test]
    fn test_failed_initialize_keeps_stored_bracket() {
        let shared = seeded_shared(true);
        let before = tournament_state(&shared).unwrap();
        let (teams, players) = roster();
        let err = tournament_initialize(teams[..10].to_vec(), players, &shared).unwrap_err();
        assert!(err.contains("at least 12 teams"));
        assert_eq!(tournament_state(&shared).unwrap(), before);
    }

    #[test]
    fn test_apply_result_persists_snapshot() {
        let shared = seeded_shared(true);
        let bracket = tournament_state(&shared).unwrap().unwrap();
        let winner = team_at(&bracket, MatchId::Winners(1), Slot::Team2);
        let next = tournament_apply_result(Section::Winners, 0, 0, winner, &shared)
            .unwrap()
            .unwrap();
        assert_eq!(tournament_state(&shared).unwrap(), Some(next.clone()));
        assert_eq!(
            next.find_match(MatchId::Winners(5)).unwrap().team2.as_ref().map(|t| t.id),
            Some(12)
        );
    }

    #[test]
    fn test_invalid_winner_is_reported_and_not_saved() {
        let shared = seeded_shared(true);
        let before = tournament_state(&shared).unwrap();
        let bracket = before.clone().unwrap();
        let outsider = team_at(&bracket, MatchId::Winners(2), Slot::Team1);
        let err = tournament_apply_result(Section::Winners, 0, 0, outsider, &shared).unwrap_err();
        assert!(err.contains("not a participant of W1"));
        assert_eq!(tournament_state(&shared).unwrap(), before);
    }

    #[test]
    fn test_clear_policy_follows_configuration() {
        for cascade in [true, false] {
            let shared = seeded_shared(cascade);
            let bracket = tournament_state(&shared).unwrap().unwrap();
            let winner = team_at(&bracket, MatchId::Winners(1), Slot::Team2);
            tournament_apply_result(Section::Winners, 0, 0, winner, &shared).unwrap();

            let next = tournament_clear_team("W1".to_string(), 12, &shared).unwrap().unwrap();
            let w5_team2 = next.find_match(MatchId::Winners(5)).unwrap().team2.as_ref().map(|t| t.id);
            if cascade {
                assert_eq!(w5_team2, None);
            } else {
                assert_eq!(w5_team2, Some(12));
            }
            let w1 = next.find_match(MatchId::Winners(1)).unwrap();
            assert!(w1.winner.is_none());
            assert!(w1.team2.is_none());
            assert_eq!(w1.team1.as_ref().map(|t| t.id), Some(5));
        }
    }

    #[test]
    fn test_clear_with_unknown_match_id_is_ignored() {
        let shared = seeded_shared(true);
        let before = tournament_state(&shared).unwrap();
        let after = tournament_clear_team("Z9".to_string(), 1, &shared).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_reset_and_status() {
        let shared = seeded_shared(false);
        let status = tournament_persistence_status(&shared).unwrap();
        assert!(status.has_bracket);
        assert!(!status.cascade_clears);
        assert_eq!(status.location, "memory");
        let summary = tournament_summary(&shared).unwrap().unwrap();
        assert_eq!(summary.ready_matches.len(), 4);
        assert!(summary.champion.is_none());
        tournament_reset(&shared).unwrap();
        assert!(!tournament_persistence_status(&shared).unwrap().has_bracket);
    }
}
