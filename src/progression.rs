use tracing::{debug, info, warn};

use crate::error::BracketError;
use crate::router::{self, Placement, Route};
use crate::types::{Bracket, Match, MatchId, MatchRef, Slot, Team};

/// Records `winner` for the match at `at` and routes both teams onward.
///
/// Returns the input unchanged when the match does not exist, is missing a
/// participant, or is already decided. A winner that is not in the match is
/// rejected.
pub fn apply_result(bracket: &Bracket, at: MatchRef, winner: &Team) -> Result<Bracket, BracketError> {
  let Some(id) = bracket.match_at(at).map(|m| m.id) else {
    debug!(?at, "no match at position; result ignored");
    return Ok(bracket.clone());
  };
  apply_result_by_id(bracket, id, winner)
}

pub fn apply_result_by_id(bracket: &Bracket, id: MatchId, winner: &Team) -> Result<Bracket, BracketError> {
  let Some(current) = bracket.find_match(id) else {
    debug!(match_id = %id, "unknown match; result ignored");
    return Ok(bracket.clone());
  };
  let (Some(_), Some(_)) = (&current.team1, &current.team2) else {
    debug!(match_id = %id, "match is missing a participant; result ignored");
    return Ok(bracket.clone());
  };
  if current.is_decided() {
    debug!(match_id = %id, "match already decided; clear it before recording a new result");
    return Ok(bracket.clone());
  }
  let winner_slot = current.slot_of(winner.id).ok_or(BracketError::WinnerNotInMatch {
    match_id: id,
    team_id: winner.id,
  })?;

  let mut next = bracket.clone();
  let (winner_team, loser_team) = {
    let Some(m) = next.find_match_mut(id) else {
      return Ok(bracket.clone());
    };
    let (Some(winner_team), Some(loser_team)) =
      (m.slot(winner_slot).cloned(), m.slot(winner_slot.other()).cloned())
    else {
      return Ok(bracket.clone());
    };
    m.winner = Some(winner_team.clone());
    (winner_team, loser_team)
  };
  info!(match_id = %id, winner = %winner_team.name, loser = %loser_team.name, "result recorded");

  match id {
    MatchId::Winners(_) | MatchId::Losers(_) => {
      if let Some(route) = router::winner_route(id) {
        place_team(&mut next, id, route, winner_team);
      }
      if let Some(route) = router::loser_route(id) {
        place_team(&mut next, id, route, loser_team);
      }
    }
    MatchId::Finals => {
      if winner_slot == Slot::Team2 && next.finals.true_finals.is_none() {
        let grand_final = &next.finals.grand_final;
        next.finals.true_finals = Some(Match {
          id: MatchId::TrueFinals,
          team1: grand_final.team1.clone(),
          team2: grand_final.team2.clone(),
          winner: None,
        });
        info!(
          "losers bracket representative {} took F1; true finals created",
          winner_team.name
        );
      } else if winner_slot == Slot::Team1 {
        info!(champion = %winner_team.name, "tournament complete");
      }
    }
    MatchId::TrueFinals => {
      info!(champion = %winner_team.name, "tournament complete");
    }
  }

  Ok(next)
}

/// Puts `team` into the destination of `route`. Decided destinations are left alone.
fn place_team(bracket: &mut Bracket, from: MatchId, route: Route, team: Team) {
  let Some(dest) = bracket.find_match_mut(route.to) else {
    warn!(%from, to = %route.to, "routing destination missing");
    return;
  };
  if dest.is_decided() {
    warn!(%from, to = %route.to, team = %team.name, "routing destination already decided; team not placed");
    return;
  }
  let slot = match route.placement {
    Placement::Fixed(slot) => slot,
    Placement::FirstOpen => {
      if dest.contains(team.id) {
        return;
      }
      if dest.team1.is_none() {
        Slot::Team1
      } else if dest.team2.is_none() {
        Slot::Team2
      } else {
        warn!(%from, to = %route.to, team = %team.name, "no open slot at destination; team not placed");
        return;
      }
    }
  };
  debug!(%from, to = %route.to, ?slot, team = %team.name, "team routed");
  *dest.slot_mut(slot) = Some(team);
}
