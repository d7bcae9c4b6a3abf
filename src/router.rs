//! Static routing tables for the 12-team double-elimination topology.
//!
//! Three tables cover every non-terminal match exactly once:
//! winners-bracket winners, winners-bracket losers, and losers-bracket winners.
//! The tables are checked once per process by [`ensure_valid`].

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::BracketError;
use crate::types::{MatchId, Slot, LOSERS_MATCH_COUNT, WINNERS_MATCH_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
  Fixed(Slot),
  /// First arrival fills `team1`, the second fills `team2`.
  FirstOpen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
  pub to: MatchId,
  pub placement: Placement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
  Winner,
  Loser,
}

const fn fixed(to: MatchId, slot: Slot) -> Route {
  Route { to, placement: Placement::Fixed(slot) }
}

const fn first_open(to: MatchId) -> Route {
  Route { to, placement: Placement::FirstOpen }
}

use MatchId::{Finals as F1, Losers as L, Winners as W};
use Slot::{Team1, Team2};

pub const WINNER_ROUTES: [(MatchId, Route); 11] = [
  (W(1), fixed(W(5), Team2)),
  (W(2), fixed(W(6), Team2)),
  (W(3), fixed(W(7), Team2)),
  (W(4), fixed(W(8), Team2)),
  (W(5), first_open(W(9))),
  (W(6), first_open(W(9))),
  (W(7), first_open(W(10))),
  (W(8), first_open(W(10))),
  (W(9), first_open(W(11))),
  (W(10), first_open(W(11))),
  (W(11), fixed(F1, Team1)),
];

pub const LOSER_ROUTES: [(MatchId, Route); 11] = [
  (W(1), fixed(L(1), Team2)),
  (W(2), fixed(L(1), Team1)),
  (W(3), fixed(L(2), Team2)),
  (W(4), fixed(L(2), Team1)),
  (W(5), fixed(L(3), Team2)),
  (W(6), fixed(L(3), Team1)),
  (W(7), fixed(L(4), Team2)),
  (W(8), fixed(L(4), Team1)),
  (W(9), fixed(L(7), Team2)),
  (W(10), fixed(L(8), Team2)),
  (W(11), fixed(L(10), Team2)),
];

pub const LOSERS_WINNER_ROUTES: [(MatchId, Route); 10] = [
  (L(1), fixed(L(5), Team1)),
  (L(2), fixed(L(5), Team2)),
  (L(3), fixed(L(6), Team1)),
  (L(4), fixed(L(6), Team2)),
  (L(5), fixed(L(7), Team1)),
  (L(6), fixed(L(8), Team1)),
  (L(7), fixed(L(9), Team1)),
  (L(8), fixed(L(9), Team2)),
  (L(9), fixed(L(10), Team1)),
  (L(10), fixed(F1, Team2)),
];

fn lookup(table: &[(MatchId, Route)], id: MatchId) -> Option<Route> {
  table.iter().find(|(from, _)| *from == id).map(|(_, route)| *route)
}

/// Where the winner of `id` travels. `None` for the finals.
pub fn winner_route(id: MatchId) -> Option<Route> {
  match id {
    MatchId::Winners(_) => lookup(&WINNER_ROUTES, id),
    MatchId::Losers(_) => lookup(&LOSERS_WINNER_ROUTES, id),
    MatchId::Finals | MatchId::TrueFinals => None,
  }
}

/// Where the loser of `id` drops. Only winners-bracket matches send their loser on.
pub fn loser_route(id: MatchId) -> Option<Route> {
  match id {
    MatchId::Winners(_) => lookup(&LOSER_ROUTES, id),
    _ => None,
  }
}

/// Every downstream edge leaving `id`.
pub fn routes_from(id: MatchId) -> Vec<(Outcome, Route)> {
  let mut out = Vec::with_capacity(2);
  if let Some(route) = winner_route(id) {
    out.push((Outcome::Winner, route));
  }
  if let Some(route) = loser_route(id) {
    out.push((Outcome::Loser, route));
  }
  out
}

/// Slots filled by seeding rather than by progression.
pub fn seeded_slots(id: MatchId) -> &'static [Slot] {
  if id.is_first_round() {
    &[Team1, Team2]
  } else if id.has_seeded_bye() {
    &[Team1]
  } else {
    &[]
  }
}

/// Slots a cascade leaves in place when it withdraws a team: the seed in `team1` of `W1..W4`.
pub fn cascade_protected_slots(id: MatchId) -> &'static [Slot] {
  if id.is_first_round() {
    &[Team1]
  } else {
    &[]
  }
}

fn all_match_ids() -> Vec<MatchId> {
  (1..=WINNERS_MATCH_COUNT)
    .map(MatchId::Winners)
    .chain((1..=LOSERS_MATCH_COUNT).map(MatchId::Losers))
    .chain(std::iter::once(MatchId::Finals))
    .collect()
}

/// Checks the three tables against the fixed topology.
pub fn validate_tables() -> Result<(), String> {
  let mut sources: HashMap<MatchId, usize> = HashMap::new();
  for (from, _) in WINNER_ROUTES.iter().chain(LOSER_ROUTES.iter()) {
    if !matches!(from, MatchId::Winners(_)) {
      return Err(format!("{from} is routed by a winners-bracket table."));
    }
    *sources.entry(*from).or_default() += 1;
  }
  for (from, _) in LOSERS_WINNER_ROUTES.iter() {
    if !matches!(from, MatchId::Losers(_)) {
      return Err(format!("{from} is routed by the losers-bracket table."));
    }
    *sources.entry(*from).or_default() += 1;
  }

  let mut fixed_feeds: HashMap<(MatchId, Slot), usize> = HashMap::new();
  let mut incoming: HashMap<MatchId, usize> = HashMap::new();
  for (from, route) in WINNER_ROUTES
    .iter()
    .chain(LOSER_ROUTES.iter())
    .chain(LOSERS_WINNER_ROUTES.iter())
  {
    if !route.to.is_valid() || route.to == MatchId::TrueFinals {
      return Err(format!("{from} routes to unknown match {}.", route.to));
    }
    if route.to == *from {
      return Err(format!("{from} routes to itself."));
    }
    if let Placement::Fixed(slot) = route.placement {
      if seeded_slots(route.to).contains(&slot) {
        return Err(format!("{from} routes into a seeded slot of {}.", route.to));
      }
      *fixed_feeds.entry((route.to, slot)).or_default() += 1;
    }
    *incoming.entry(route.to).or_default() += 1;
  }

  for id in all_match_ids() {
    let expected_sources = match id {
      MatchId::Winners(_) => 2,
      MatchId::Losers(_) => 1,
      _ => 0,
    };
    let found = sources.get(&id).copied().unwrap_or(0);
    if found != expected_sources {
      return Err(format!("{id} has {found} outgoing routes, expected {expected_sources}."));
    }
    let expected_incoming = 2 - seeded_slots(id).len();
    let found = incoming.get(&id).copied().unwrap_or(0);
    if found != expected_incoming {
      return Err(format!("{id} receives {found} teams, expected {expected_incoming}."));
    }
  }

  if let Some(((to, slot), _)) = fixed_feeds.iter().find(|(_, count)| **count > 1) {
    return Err(format!("{to} {slot:?} is fed by more than one route."));
  }
  Ok(())
}

static TABLES_CHECKED: OnceLock<Result<(), String>> = OnceLock::new();

pub fn ensure_valid() -> Result<(), BracketError> {
  TABLES_CHECKED
    .get_or_init(validate_tables)
    .clone()
    .map_err(BracketError::InvalidTopology)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tables_cover_topology() {
    assert_eq!(validate_tables(), Ok(()));
    assert!(ensure_valid().is_ok());
  }

  #[test]
  fn test_winner_routes() {
    assert_eq!(winner_route(W(1)), Some(fixed(W(5), Team2)));
    assert_eq!(winner_route(W(6)), Some(first_open(W(9))));
    assert_eq!(winner_route(W(11)), Some(fixed(F1, Team1)));
    assert_eq!(winner_route(L(10)), Some(fixed(F1, Team2)));
    assert_eq!(winner_route(F1), None);
    assert_eq!(winner_route(MatchId::TrueFinals), None);
  }

  #[test]
  fn test_loser_routes_only_leave_winners_bracket() {
    assert_eq!(loser_route(W(1)), Some(fixed(L(1), Team2)));
    assert_eq!(loser_route(W(2)), Some(fixed(L(1), Team1)));
    assert_eq!(loser_route(W(11)), Some(fixed(L(10), Team2)));
    assert_eq!(loser_route(L(3)), None);
    assert_eq!(loser_route(F1), None);
  }

  #[test]
  fn test_routes_from_lists_both_edges() {
    let edges = routes_from(W(9));
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0], (Outcome::Winner, first_open(W(11))));
    assert_eq!(edges[1], (Outcome::Loser, fixed(L(7), Team2)));
    assert_eq!(routes_from(L(9)).len(), 1);
    assert!(routes_from(F1).is_empty());
  }

  #[test]
  fn test_seeded_slots() {
    assert_eq!(seeded_slots(W(2)), &[Team1, Team2]);
    assert_eq!(seeded_slots(W(7)), &[Team1]);
    assert!(seeded_slots(W(9)).is_empty());
    assert!(seeded_slots(L(1)).is_empty());
  }

  #[test]
  fn test_cascade_protects_first_round_seed_only() {
    assert_eq!(cascade_protected_slots(W(1)), &[Team1]);
    assert_eq!(cascade_protected_slots(W(4)), &[Team1]);
    assert!(cascade_protected_slots(W(5)).is_empty());
    assert!(cascade_protected_slots(L(2)).is_empty());
    assert!(cascade_protected_slots(F1).is_empty());
  }
}
