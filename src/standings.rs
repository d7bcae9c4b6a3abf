use serde::Serialize;
use std::collections::HashMap;

use crate::types::{Bracket, MatchId, MatchState, Slot, Team, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TeamStatus {
  Active,
  Eliminated,
  Champion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
  pub team: Team,
  pub status: TeamStatus,
}

/// Tournament winner once no further match is playable.
pub fn champion(bracket: &Bracket) -> Option<&Team> {
  if let Some(true_finals) = bracket.finals.true_finals.as_ref() {
    return true_finals.winner.as_ref();
  }
  let grand_final = &bracket.finals.grand_final;
  match grand_final.winner_slot() {
    Some(Slot::Team1) => grand_final.winner.as_ref(),
    _ => None,
  }
}

pub fn is_complete(bracket: &Bracket) -> bool {
  champion(bracket).is_some()
}

/// Matches with both teams set and no result, in bracket order.
pub fn ready_matches(bracket: &Bracket) -> Vec<MatchId> {
  bracket
    .matches()
    .filter(|m| m.state() == MatchState::Ready)
    .map(|m| m.id)
    .collect()
}

/// Every team placed in the bracket, in order of first appearance.
///
/// A team is eliminated by a loss in the losers bracket or in the deciding
/// finals match. Losing a winners-bracket match only drops it down.
pub fn team_statuses(bracket: &Bracket) -> Vec<TeamStanding> {
  let mut order: Vec<TeamId> = Vec::new();
  let mut standings: HashMap<TeamId, TeamStanding> = HashMap::new();

  for m in bracket.matches() {
    for team in [m.team1.as_ref(), m.team2.as_ref()].into_iter().flatten() {
      if !standings.contains_key(&team.id) {
        order.push(team.id);
        standings.insert(
          team.id,
          TeamStanding { team: team.clone(), status: TeamStatus::Active },
        );
      }
    }

    let eliminating = match m.id {
      MatchId::Losers(_) | MatchId::TrueFinals => true,
      MatchId::Finals => m.winner_slot() == Some(Slot::Team1),
      MatchId::Winners(_) => false,
    };
    if !eliminating {
      continue;
    }
    if let Some(loser) = m.loser() {
      if let Some(standing) = standings.get_mut(&loser.id) {
        standing.status = TeamStatus::Eliminated;
      }
    }
  }

  if let Some(winner) = champion(bracket) {
    if let Some(standing) = standings.get_mut(&winner.id) {
      standing.status = TeamStatus::Champion;
    }
  }

  order
    .into_iter()
    .filter_map(|id| standings.remove(&id))
    .collect()
}
