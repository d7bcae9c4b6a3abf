use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::BracketError;
use crate::router;
use crate::types::{Bracket, MatchId, Player, PlayerId, Team, REQUIRED_TEAMS};

/// First-round pairings as 1-indexed seeds, in `W1..W4` order.
const FIRST_ROUND_PAIRS: [(usize, usize); 4] = [(5, 12), (6, 11), (7, 10), (8, 9)];

/// Sum of the team's player skill levels. Unknown player ids count as 0.
pub fn skill_score(team: &Team, players: &[Player]) -> i64 {
  let skills = skill_index(players);
  score_with(team, &skills)
}

fn skill_index(players: &[Player]) -> HashMap<PlayerId, i64> {
  players.iter().map(|p| (p.id, p.skill_level as i64)).collect()
}

fn score_with(team: &Team, skills: &HashMap<PlayerId, i64>) -> i64 {
  team
    .player_ids
    .iter()
    .map(|id| skills.get(id).copied().unwrap_or(0))
    .sum()
}

/// Teams strongest first. Equal scores keep their input order.
pub fn seed_order(teams: &[Team], players: &[Player]) -> Vec<Team> {
  let skills = skill_index(players);
  let mut scored = teams
    .iter()
    .map(|team| (score_with(team, &skills), team))
    .collect::<Vec<_>>();
  scored.sort_by_key(|(score, _)| Reverse(*score));
  scored.into_iter().map(|(_, team)| team.clone()).collect()
}

/// Builds a fresh bracket from roster snapshots.
///
/// Seeds 5-12 meet in `W1..W4`; seeds 1-4 take the byes as `team1` of `W5..W8`.
/// Every other slot starts empty. Nothing is built when the roster is too small.
pub fn initialize(teams: &[Team], players: &[Player]) -> Result<Bracket, BracketError> {
  if teams.len() < REQUIRED_TEAMS {
    return Err(BracketError::not_enough_teams(teams.len()));
  }
  if players.is_empty() {
    return Err(BracketError::NoPlayers);
  }
  router::ensure_valid()?;

  let seeds = seed_order(teams, players);
  if seeds.len() > REQUIRED_TEAMS {
    debug!(unseeded = seeds.len() - REQUIRED_TEAMS, "teams beyond seed 12 are left out");
  }
  let seed = |n: usize| seeds[n - 1].clone();

  let mut bracket = Bracket::empty();
  for (index, (high, low)) in FIRST_ROUND_PAIRS.iter().enumerate() {
    let id = MatchId::Winners(index as u8 + 1);
    if let Some(m) = bracket.find_match_mut(id) {
      m.team1 = Some(seed(*high));
      m.team2 = Some(seed(*low));
    }
  }
  for n in 1..=4usize {
    let id = MatchId::Winners(n as u8 + 4);
    if let Some(m) = bracket.find_match_mut(id) {
      m.team1 = Some(seed(n));
    }
  }

  info!(
    teams = teams.len(),
    players = players.len(),
    top_seed = %seeds[0].name,
    "bracket initialized"
  );
  Ok(bracket)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::types::MatchState;

  pub(crate) fn team(id: u64, player_ids: Vec<u64>) -> Team {
    Team {
      id,
      name: format!("Team {id}"),
      color: "#7CB9E8".to_string(),
      icon_name: "Star".to_string(),
      player_ids,
      rank: id as u32,
    }
  }

  pub(crate) fn player(id: u64, skill_level: i32) -> Player {
    Player {
      id,
      name: format!("Player {id}"),
      skill_level,
      rank: id as u32,
    }
  }

  /// Twelve single-player teams where team `n` has skill `13 - n`, so team id == seed.
  pub(crate) fn roster() -> (Vec<Team>, Vec<Player>) {
    let players = (1..=12).map(|n| player(100 + n, 13 - n as i32)).collect::<Vec<_>>();
    let teams = (1..=12).map(|n| team(n, vec![100 + n])).collect::<Vec<_>>();
    (teams, players)
  }

  fn ids(m: &crate::types::Match) -> (Option<u64>, Option<u64>) {
    (m.team1.as_ref().map(|t| t.id), m.team2.as_ref().map(|t| t.id))
  }

  #[test]
  fn test_skill_score_sums_players() {
    let players = vec![player(1, 3), player(2, 5)];
    assert_eq!(skill_score(&team(1, vec![1, 2]), &players), 8);
    assert_eq!(skill_score(&team(2, vec![]), &players), 0);
    assert_eq!(skill_score(&team(3, vec![1, 99]), &players), 3);
  }

  #[test]
  fn test_seed_order_is_stable_on_ties() {
    let players = vec![player(1, 2), player(2, 2), player(3, 4)];
    let teams = vec![team(10, vec![1]), team(11, vec![2]), team(12, vec![3])];
    let order = seed_order(&teams, &players).iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(order, vec![12, 10, 11]);
  }

  #[test]
  fn test_initialize_places_seeds() {
    let (mut teams, players) = roster();
    teams.reverse();
    let bracket = initialize(&teams, &players).unwrap();

    let expected = [(5, 12), (6, 11), (7, 10), (8, 9)];
    for (n, (a, b)) in expected.iter().enumerate() {
      let m = bracket.find_match(MatchId::Winners(n as u8 + 1)).unwrap();
      assert_eq!(ids(m), (Some(*a), Some(*b)));
      assert!(m.winner.is_none());
    }
    for n in 1..=4u64 {
      let m = bracket.find_match(MatchId::Winners(n as u8 + 4)).unwrap();
      assert_eq!(ids(m), (Some(n), None));
    }
    for id in [9, 10, 11] {
      assert_eq!(bracket.find_match(MatchId::Winners(id)).unwrap().state(), MatchState::Empty);
    }
    for id in 1..=10 {
      assert_eq!(bracket.find_match(MatchId::Losers(id)).unwrap().state(), MatchState::Empty);
    }
    assert_eq!(bracket.finals.grand_final.state(), MatchState::Empty);
    assert!(bracket.finals.true_finals.is_none());
  }

  #[test]
  fn test_initialize_rejects_short_roster() {
    let (teams, players) = roster();
    let err = initialize(&teams[..10], &players).unwrap_err();
    assert_eq!(err, BracketError::NotEnoughTeams { required: 12, found: 10 });
    assert_eq!(initialize(&teams, &[]).unwrap_err(), BracketError::NoPlayers);
  }

  #[test]
  fn test_initialize_ignores_teams_past_twelfth_seed() {
    let (mut teams, mut players) = roster();
    players.push(player(200, 1));
    teams.push(team(13, vec![200]));
    let bracket = initialize(&teams, &players).unwrap();
    assert!(bracket.matches().all(|m| !m.contains(13)));
  }
}
