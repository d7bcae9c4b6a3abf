use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};

use crate::store::BracketStore;

// ── Constants ──────────────────────────────────────────────────────────

pub const REQUIRED_TEAMS: usize = 12;
pub const WINNERS_MATCH_COUNT: u8 = 11;
pub const LOSERS_MATCH_COUNT: u8 = 10;

/// Match ids per round, winners side. Round 1 pairs seeds 5-12, round 2 holds the byes.
pub const WINNERS_LAYOUT: [&[u8]; 4] = [&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 10], &[11]];
pub const LOSERS_LAYOUT: [&[u8]; 5] = [&[1, 2, 3, 4], &[5, 6], &[7, 8], &[9], &[10]];

// ── Shared state type aliases ──────────────────────────────────────────

pub type TeamId = u64;
pub type PlayerId = u64;
pub type SharedTournament = Arc<Mutex<TournamentState>>;

pub struct TournamentState {
    pub store: Box<dyn BracketStore + Send>,
    pub cascade_clears: bool,
}

// ── Roster snapshots ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    pub skill_level: i32,
    #[serde(default)]
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub rank: u32,
}

/// Display label for a player's skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Novice,
    Intermediate,
    Advanced,
    Expert,
    Unknown,
}

impl SkillLevel {
    pub fn from_level(level: i32) -> Self {
        match level {
            1 => SkillLevel::Beginner,
            2 => SkillLevel::Novice,
            3 => SkillLevel::Intermediate,
            4 => SkillLevel::Advanced,
            5 => SkillLevel::Expert,
            _ => SkillLevel::Unknown,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Novice => "Novice",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
            SkillLevel::Unknown => "Unknown",
        }
    }
}

impl Player {
    pub fn skill(&self) -> SkillLevel {
        SkillLevel::from_level(self.skill_level)
    }
}

// ── Match identity ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Winners,
    Losers,
    Finals,
}

/// `W1..W11`, `L1..L10`, `F1`, `F2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchId {
    Winners(u8),
    Losers(u8),
    Finals,
    TrueFinals,
}

impl MatchId {
    pub fn section(self) -> Section {
        match self {
            MatchId::Winners(_) => Section::Winners,
            MatchId::Losers(_) => Section::Losers,
            MatchId::Finals | MatchId::TrueFinals => Section::Finals,
        }
    }

    /// Whether the id names a match of the fixed 12-team topology.
    pub fn is_valid(self) -> bool {
        match self {
            MatchId::Winners(n) => (1..=WINNERS_MATCH_COUNT).contains(&n),
            MatchId::Losers(n) => (1..=LOSERS_MATCH_COUNT).contains(&n),
            MatchId::Finals | MatchId::TrueFinals => true,
        }
    }

    /// Round-2 winners matches whose `team1` is a seeded bye.
    pub fn has_seeded_bye(self) -> bool {
        matches!(self, MatchId::Winners(5..=8))
    }

    pub fn is_first_round(self) -> bool {
        matches!(self, MatchId::Winners(1..=4))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchId::Winners(n) => write!(f, "W{n}"),
            MatchId::Losers(n) => write!(f, "L{n}"),
            MatchId::Finals => write!(f, "F1"),
            MatchId::TrueFinals => write!(f, "F2"),
        }
    }
}

impl FromStr for MatchId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let id = match trimmed {
            "F1" => MatchId::Finals,
            "F2" => MatchId::TrueFinals,
            _ => {
                let mut chars = trimmed.chars();
                let prefix = chars.next();
                let num = chars
                    .as_str()
                    .parse::<u8>()
                    .map_err(|_| format!("Unknown match id {trimmed:?}."))?;
                match prefix {
                    Some('W') => MatchId::Winners(num),
                    Some('L') => MatchId::Losers(num),
                    _ => return Err(format!("Unknown match id {trimmed:?}.")),
                }
            }
        };
        if !id.is_valid() {
            return Err(format!("Match id {trimmed} is outside the bracket."));
        }
        Ok(id)
    }
}

impl TryFrom<String> for MatchId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchId> for String {
    fn from(id: MatchId) -> Self {
        id.to_string()
    }
}

/// Positional address used by the UI: section plus round and match index.
/// For `Finals`, round 0 is `F1` and round 1 is the true finals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRef {
    pub section: Section,
    pub round_index: usize,
    pub match_index: usize,
}

impl MatchRef {
    pub fn new(section: Section, round_index: usize, match_index: usize) -> Self {
        MatchRef { section, round_index, match_index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Team1,
    Team2,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::Team1 => Slot::Team2,
            Slot::Team2 => Slot::Team1,
        }
    }
}

// ── Bracket document ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchState {
    Empty,
    Partial,
    Ready,
    Decided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub winner: Option<Team>,
}

impl Match {
    pub fn empty(id: MatchId) -> Self {
        Match { id, team1: None, team2: None, winner: None }
    }

    pub fn slot(&self, slot: Slot) -> Option<&Team> {
        match slot {
            Slot::Team1 => self.team1.as_ref(),
            Slot::Team2 => self.team2.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<Team> {
        match slot {
            Slot::Team1 => &mut self.team1,
            Slot::Team2 => &mut self.team2,
        }
    }

    /// Slot currently holding `team_id`, team1 first.
    pub fn slot_of(&self, team_id: TeamId) -> Option<Slot> {
        if self.team1.as_ref().is_some_and(|t| t.id == team_id) {
            Some(Slot::Team1)
        } else if self.team2.as_ref().is_some_and(|t| t.id == team_id) {
            Some(Slot::Team2)
        } else {
            None
        }
    }

    pub fn state(&self) -> MatchState {
        match (&self.team1, &self.team2, &self.winner) {
            (_, _, Some(_)) => MatchState::Decided,
            (Some(_), Some(_), None) => MatchState::Ready,
            (None, None, None) => MatchState::Empty,
            _ => MatchState::Partial,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner_slot(&self) -> Option<Slot> {
        let winner = self.winner.as_ref()?;
        self.slot_of(winner.id)
    }

    pub fn loser(&self) -> Option<&Team> {
        let slot = self.winner_slot()?;
        self.slot(slot.other())
    }

    pub fn contains(&self, team_id: TeamId) -> bool {
        self.slot_of(team_id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finals {
    #[serde(rename = "match")]
    pub grand_final: Match,
    pub true_finals: Option<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub winners_rounds: Vec<Round>,
    pub losers_rounds: Vec<Round>,
    pub finals: Finals,
}

impl Bracket {
    /// Fixed 12-team topology with every slot empty.
    pub fn empty() -> Self {
        let winners_rounds = WINNERS_LAYOUT
            .iter()
            .map(|ids| Round {
                matches: ids.iter().map(|n| Match::empty(MatchId::Winners(*n))).collect(),
            })
            .collect();
        let losers_rounds = LOSERS_LAYOUT
            .iter()
            .map(|ids| Round {
                matches: ids.iter().map(|n| Match::empty(MatchId::Losers(*n))).collect(),
            })
            .collect();
        Bracket {
            winners_rounds,
            losers_rounds,
            finals: Finals {
                grand_final: Match::empty(MatchId::Finals),
                true_finals: None,
            },
        }
    }

    /// All matches in section order: winners, losers, F1, F2.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.winners_rounds
            .iter()
            .chain(self.losers_rounds.iter())
            .flat_map(|round| round.matches.iter())
            .chain(std::iter::once(&self.finals.grand_final))
            .chain(self.finals.true_finals.iter())
    }

    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        match id {
            MatchId::Winners(_) => find_in_rounds(&self.winners_rounds, id),
            MatchId::Losers(_) => find_in_rounds(&self.losers_rounds, id),
            MatchId::Finals => Some(&self.finals.grand_final),
            MatchId::TrueFinals => self.finals.true_finals.as_ref(),
        }
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        match id {
            MatchId::Winners(_) => find_in_rounds_mut(&mut self.winners_rounds, id),
            MatchId::Losers(_) => find_in_rounds_mut(&mut self.losers_rounds, id),
            MatchId::Finals => Some(&mut self.finals.grand_final),
            MatchId::TrueFinals => self.finals.true_finals.as_mut(),
        }
    }

    pub fn match_at(&self, at: MatchRef) -> Option<&Match> {
        match at.section {
            Section::Winners => self.winners_rounds.get(at.round_index)?.matches.get(at.match_index),
            Section::Losers => self.losers_rounds.get(at.round_index)?.matches.get(at.match_index),
            Section::Finals => match (at.round_index, at.match_index) {
                (0, 0) => Some(&self.finals.grand_final),
                (1, 0) => self.finals.true_finals.as_ref(),
                _ => None,
            },
        }
    }

    /// Positional address of a match id, if the match exists.
    pub fn match_ref(&self, id: MatchId) -> Option<MatchRef> {
        let rounds = match id.section() {
            Section::Winners => &self.winners_rounds,
            Section::Losers => &self.losers_rounds,
            Section::Finals => {
                return match id {
                    MatchId::TrueFinals if self.finals.true_finals.is_none() => None,
                    MatchId::TrueFinals => Some(MatchRef::new(Section::Finals, 1, 0)),
                    _ => Some(MatchRef::new(Section::Finals, 0, 0)),
                };
            }
        };
        rounds.iter().enumerate().find_map(|(round_index, round)| {
            round
                .matches
                .iter()
                .position(|m| m.id == id)
                .map(|match_index| MatchRef::new(id.section(), round_index, match_index))
        })
    }
}

fn find_in_rounds(rounds: &[Round], id: MatchId) -> Option<&Match> {
    rounds.iter().flat_map(|round| round.matches.iter()).find(|m| m.id == id)
}

fn find_in_rounds_mut(rounds: &mut [Round], id: MatchId) -> Option<&mut Match> {
    rounds
        .iter_mut()
        .flat_map(|round| round.matches.iter_mut())
        .find(|m| m.id == id)
}
