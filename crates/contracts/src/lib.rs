//! v1 cross-boundary contracts for the studio kernel, API, and CLI.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod serde_u64_string;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Sentinel prefix returned by the text-generation client on any failure.
/// Callers test for this prefix; generation never yields a hard error.
pub const FALLBACK_PREFIX: &str = "Fallback:";

/// Command prefixes understood by the kernel, in raw string form.
pub const DECLARE_PREFIX: &str = "/declare";
pub const ANSWER_PREFIX: &str = "/answer";

/// Format-stable week label used for `Quantum::created_at`.
pub fn week_label(week: u64) -> String {
    format!("Week {week}")
}

// ---------------------------------------------------------------------------
// Design facts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuantumType {
    Genre,
    MechanicPillar,
    Setting,
    Character,
    Ability,
    ArtStyle,
    GameplayLoop,
}

impl fmt::Display for QuantumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Genre => "Genre",
            Self::MechanicPillar => "MechanicPillar",
            Self::Setting => "Setting",
            Self::Character => "Character",
            Self::Ability => "Ability",
            Self::ArtStyle => "ArtStyle",
            Self::GameplayLoop => "GameplayLoop",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuantumStatus {
    Active,
}

/// Free-form payload of a design fact: a short name, a longer description,
/// or both. At least one field is always set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QuantumData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl QuantumData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn described(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: Some(description.into()),
        }
    }

    /// One-line summary: the name when present, otherwise the description.
    pub fn summary(&self) -> &str {
        self.name
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// An atomic design fact. Append-only within a run; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quantum {
    pub quantum_id: String,
    pub quantum_type: QuantumType,
    pub data: QuantumData,
    /// Starts at 1; reserved for future revision, never incremented today.
    pub version: u32,
    pub status: QuantumStatus,
    /// Week label at creation, e.g. "Week 3".
    pub created_at: String,
    /// Verbatim command string that produced this fact.
    pub declaration_source: String,
}

impl Quantum {
    /// One-line brief used as generation context, e.g. `[Genre] Action RPG`.
    pub fn brief_line(&self) -> String {
        format!("[{}] {}", self.quantum_type, self.data.summary())
    }
}

// ---------------------------------------------------------------------------
// Questions and bugs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Open,
    Answered,
}

/// An open design ambiguity raised against one quantum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub status: QuestionStatus,
    pub source_quantum_id: String,
}

/// A narrative defect record. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BugReport {
    pub id: String,
    pub text: String,
    pub week: u64,
    pub source_question_id: String,
}

// ---------------------------------------------------------------------------
// Aggregate game state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    /// Starts at 1, increments once per completed turn.
    pub current_week: u64,
    /// May go negative; resource exhaustion is a display concern only.
    pub budget: f64,
    pub weekly_spend: f64,
    /// Derived, recomputed every turn.
    pub design_completeness: f64,
    /// Monotone non-decreasing, clamped to 100; the cap triggers release.
    pub build_progress: f64,
    pub bugs: u64,
    /// Monotone non-decreasing, clamped to 100.
    pub market_hype: f64,
    pub marketing_active: bool,
    pub game_released: bool,
    pub final_score: Option<f64>,
    pub command_queue: VecDeque<String>,
    /// Per-agent short status string, overwritten every turn the agent runs.
    pub last_agent_activity: BTreeMap<String, String>,
}

impl GameState {
    pub fn from_config(config: &StudioConfig) -> Self {
        let mut command_queue = VecDeque::new();
        command_queue.push_back(config.opening_command.clone());
        Self {
            current_week: 1,
            budget: config.starting_budget,
            weekly_spend: config.base_weekly_spend,
            design_completeness: 0.0,
            build_progress: 0.0,
            bugs: 0,
            market_hype: 0.0,
            marketing_active: false,
            game_released: false,
            final_score: None,
            command_queue,
            last_agent_activity: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextGenConfig {
    /// Locally reachable generation endpoint, Ollama wire shape.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for TextGenConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3".to_string(),
            temperature: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudioConfig {
    pub schema_version: String,
    pub run_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub starting_budget: f64,
    pub base_weekly_spend: f64,
    /// Added to the weekly spend once marketing activates.
    pub marketing_spend_increment: f64,
    /// Marketing activates once `current_week` exceeds this value.
    pub marketing_week_threshold: u64,
    #[serde(default)]
    pub textgen: TextGenConfig,
    /// Pre-seeded first command in the queue.
    pub opening_command: String,
    pub notes: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "studio_local_001".to_string(),
            seed: 1337,
            starting_budget: 100_000.0,
            base_weekly_spend: 5_000.0,
            marketing_spend_increment: 1_500.0,
            marketing_week_threshold: 4,
            textgen: TextGenConfig::default(),
            opening_command: "/declare an action rpg with stealth set in a cyberpunk fantasy world"
                .to_string(),
            notes: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Command surface
// ---------------------------------------------------------------------------

/// Parsed player command. Parsing is total; unknown input is a valid no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StudioCommand {
    Declare {
        /// Full original command string, prefix included.
        text: String,
    },
    Answer {
        question_id: String,
        text: String,
    },
    Unknown {
        text: String,
    },
}

impl StudioCommand {
    /// Single parse step at the front of a turn. `/answer` extracts exactly
    /// one question id, the first whitespace token after the prefix.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with(DECLARE_PREFIX) {
            return Self::Declare {
                text: raw.to_string(),
            };
        }
        if let Some(rest) = trimmed.strip_prefix(ANSWER_PREFIX) {
            if let Some(question_id) = rest.split_whitespace().next() {
                return Self::Answer {
                    question_id: question_id.to_string(),
                    text: raw.to_string(),
                };
            }
        }
        Self::Unknown {
            text: raw.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Declare { .. } => "declare",
            Self::Answer { .. } => "answer",
            Self::Unknown { .. } => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Run status and snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StudioMode {
    Running,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudioStatus {
    pub schema_version: String,
    pub run_id: String,
    pub current_week: u64,
    pub mode: StudioMode,
    pub queue_depth: usize,
    pub waiting_for_agents: bool,
}

impl fmt::Display for StudioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} week={} mode={:?} queue_depth={}",
            self.run_id, self.current_week, self.mode, self.queue_depth
        )
    }
}

/// Read-only view handed to the presentation layer. Sufficient to render
/// without touching kernel state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub schema_version: String,
    pub run_id: String,
    pub current_week: u64,
    pub budget: f64,
    pub weekly_spend: f64,
    pub design_completeness: f64,
    pub build_progress: f64,
    pub bugs: u64,
    pub market_hype: f64,
    pub marketing_active: bool,
    pub game_released: bool,
    pub final_score: Option<f64>,
    pub waiting_for_agents: bool,
    pub status_line: String,
    pub pending_commands: Vec<String>,
    pub quanta: Vec<Quantum>,
    pub open_questions: Vec<Question>,
    pub recent_bugs: Vec<BugReport>,
    pub last_agent_activity: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// API error envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RunNotFound,
    InvalidCommand,
    InvalidQuery,
    TurnInProgress,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            code,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_declare_keeps_full_text() {
        let parsed = StudioCommand::parse("/declare a stealth game");
        assert_eq!(
            parsed,
            StudioCommand::Declare {
                text: "/declare a stealth game".to_string()
            }
        );
    }

    #[test]
    fn parse_answer_extracts_first_id_only() {
        let parsed = StudioCommand::parse("/answer question:3 question:4 make it turn-based");
        assert_eq!(
            parsed,
            StudioCommand::Answer {
                question_id: "question:3".to_string(),
                text: "/answer question:3 question:4 make it turn-based".to_string(),
            }
        );
    }

    #[test]
    fn parse_answer_without_id_is_unknown() {
        let parsed = StudioCommand::parse("/answer");
        assert_eq!(parsed.kind(), "unknown");
    }

    #[test]
    fn parse_plain_text_is_unknown() {
        let parsed = StudioCommand::parse("ship it already");
        assert_eq!(parsed.kind(), "unknown");
    }

    #[test]
    fn quantum_brief_line_uses_name_or_description() {
        let named = Quantum {
            quantum_id: "quantum:1".to_string(),
            quantum_type: QuantumType::Genre,
            data: QuantumData::named("Action RPG"),
            version: 1,
            status: QuantumStatus::Active,
            created_at: week_label(1),
            declaration_source: "/declare rpg".to_string(),
        };
        assert_eq!(named.brief_line(), "[Genre] Action RPG");

        let described = Quantum {
            data: QuantumData::described("A lone courier between two cities"),
            quantum_type: QuantumType::Character,
            ..named
        };
        assert_eq!(
            described.brief_line(),
            "[Character] A lone courier between two cities"
        );
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let config = StudioConfig::default();
        let state = GameState::from_config(&config);
        let snapshot = Snapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: config.run_id.clone(),
            current_week: state.current_week,
            budget: state.budget,
            weekly_spend: state.weekly_spend,
            design_completeness: 0.0,
            build_progress: 0.0,
            bugs: 0,
            market_hype: 0.0,
            marketing_active: false,
            game_released: false,
            final_score: None,
            waiting_for_agents: false,
            status_line: "week 1".to_string(),
            pending_commands: state.command_queue.iter().cloned().collect(),
            quanta: Vec::new(),
            open_questions: Vec::new(),
            recent_bugs: Vec::new(),
            last_agent_activity: BTreeMap::new(),
        };
        let raw = serde_json::to_string(&snapshot).expect("snapshot serializes");
        let back: Snapshot = serde_json::from_str(&raw).expect("snapshot deserializes");
        assert_eq!(back, snapshot);
    }
}
