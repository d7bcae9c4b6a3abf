pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod router;
pub mod seeding;
pub mod progression;
pub mod invalidation;
pub mod standings;
pub mod store;
pub mod tournament_commands;

pub use error::BracketError;
pub use invalidation::{clear_team, clear_team_cascade};
pub use progression::{apply_result, apply_result_by_id};
pub use seeding::initialize;
pub use types::{Bracket, Match, MatchId, MatchRef, Player, Section, Slot, Team};

use config::{load_config_inner, load_env_file};
use store::JsonFileStore;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use types::SharedTournament;

// ── Entry point ────────────────────────────────────────────────────────

/// Wires env, config, logging and the JSON store for a host application.
pub fn bootstrap() -> Result<(SharedTournament, WorkerGuard), String> {
    load_env_file();
    let config = load_config_inner()?;
    let guard = logging::init_logging(&config)?;
    router::ensure_valid().map_err(|e| e.to_string())?;

    let bracket_file = config.bracket_file();
    info!(
        bracket = %bracket_file.display(),
        cascade_clears = config.cascade_clears,
        "tournament bracket engine starting"
    );
    let store = JsonFileStore::new(bracket_file);
    let shared = tournament_commands::shared_tournament(Box::new(store), config.cascade_clears);
    Ok((shared, guard))
}
