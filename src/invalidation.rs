//! Retracting teams and results from a bracket.
//!
//! [`clear_team`] touches a single match. [`clear_team_cascade`] also withdraws
//! everything the match's result placed downstream, following the router edges
//! forward until no placed team remains. The requested slot is always emptied.
//! Downstream, a first-round seed in `team1` of `W1..W4` stays put and only the
//! decision on that match is retracted.

use tracing::{debug, info};

use crate::router;
use crate::types::{Bracket, Match, MatchId, Slot, Team, TeamId};

#[derive(Clone, Debug)]
struct Retraction {
  /// Winner and loser of the match before it was cleared, if it was decided.
  decided: Option<(Team, Option<Team>)>,
}

/// Clears `team_id` from its slot and retracts the match's winner, whichever
/// slot held it. `keep_protected` leaves a first-round seed in place.
fn retract_slot(m: &mut Match, team_id: TeamId, keep_protected: bool) -> Option<Retraction> {
  let slot = m.slot_of(team_id)?;
  let decided = m
    .winner
    .clone()
    .map(|winner| (winner, m.loser().cloned()));
  m.winner = None;
  if keep_protected && router::cascade_protected_slots(m.id).contains(&slot) {
    debug!(match_id = %m.id, ?slot, "seeded slot kept");
  } else {
    *m.slot_mut(slot) = None;
  }
  Some(Retraction { decided })
}

/// Removes `team_id` from `match_id` and clears that match's winner.
/// Downstream placements are left as they are.
pub fn clear_team(bracket: &Bracket, match_id: MatchId, team_id: TeamId) -> Bracket {
  let mut next = bracket.clone();
  let Some(m) = next.find_match_mut(match_id) else {
    debug!(%match_id, "unknown match; clear ignored");
    return next;
  };
  match retract_slot(m, team_id, false) {
    Some(_) => info!(%match_id, team_id, "team cleared"),
    None => debug!(%match_id, team_id, "team not in match; clear ignored"),
  }
  next
}

/// Like [`clear_team`], then withdraws every downstream placement that came
/// from the retracted result.
pub fn clear_team_cascade(bracket: &Bracket, match_id: MatchId, team_id: TeamId) -> Bracket {
  let mut next = bracket.clone();
  let Some(m) = next.find_match_mut(match_id) else {
    debug!(%match_id, "unknown match; clear ignored");
    return next;
  };
  let Some(retraction) = retract_slot(m, team_id, false) else {
    debug!(%match_id, team_id, "team not in match; clear ignored");
    return next;
  };
  info!(%match_id, team_id, "team cleared with cascade");
  if let Some((winner, loser)) = retraction.decided {
    retract_downstream(&mut next, match_id, &winner, loser.as_ref());
  }
  next
}

fn retract_downstream(bracket: &mut Bracket, from: MatchId, winner: &Team, loser: Option<&Team>) {
  if from == MatchId::Finals && bracket.finals.true_finals.take().is_some() {
    info!("true finals removed");
  }
  for (outcome, route) in router::routes_from(from) {
    let team = match outcome {
      router::Outcome::Winner => Some(winner),
      router::Outcome::Loser => loser,
    };
    if let Some(team) = team {
      withdraw(bracket, route.to, team.id);
    }
  }
}

fn withdraw(bracket: &mut Bracket, match_id: MatchId, team_id: TeamId) {
  let Some(m) = bracket.find_match_mut(match_id) else {
    return;
  };
  let Some(retraction) = retract_slot(m, team_id, true) else {
    return;
  };
  debug!(%match_id, team_id, "downstream placement withdrawn");
  if let Some((winner, loser)) = retraction.decided {
    retract_downstream(bracket, match_id, &winner, loser.as_ref());
  }
}

/// Which slot of `match_id` holds `team_id`, for callers deciding what to clear.
pub fn slot_of(bracket: &Bracket, match_id: MatchId, team_id: TeamId) -> Option<Slot> {
  bracket.find_match(match_id)?.slot_of(team_id)
}
