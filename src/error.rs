//! Error taxonomy for bracket operations.

use thiserror::Error;

use crate::types::{MatchId, TeamId, REQUIRED_TEAMS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Fewer teams than the fixed topology seats
    #[error("Need at least {required} teams to start the tournament (found {found}).")]
    NotEnoughTeams { required: usize, found: usize },

    /// Seeding needs at least one player to score teams
    #[error("No players available.")]
    NoPlayers,

    /// The submitted winner is neither participant of the match
    #[error("Team {team_id} is not a participant of {match_id}.")]
    WinnerNotInMatch { match_id: MatchId, team_id: TeamId },

    /// Routing tables failed validation
    #[error("Invalid bracket topology: {0}")]
    InvalidTopology(String),

    #[error("Bracket store error: {0}")]
    Store(String),
}

impl BracketError {
    pub fn not_enough_teams(found: usize) -> Self {
        BracketError::NotEnoughTeams { required: REQUIRED_TEAMS, found }
    }

    /// Failures raised before any bracket is built.
    pub fn is_precondition(&self) -> bool {
        matches!(self, BracketError::NotEnoughTeams { .. } | BracketError::NoPlayers)
    }
}
