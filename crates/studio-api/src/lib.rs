//! In-process API facade with command auditing and the HTTP server.

mod server;

use contracts::{Snapshot, StudioCommand, StudioConfig, StudioStatus};
use serde::{Deserialize, Serialize};
use studio_core::{RandomSource, StudioEngine, TextGenerator};

pub use server::{serve, ServerError};

/// One accepted command, as parsed, with the week it was queued in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandAuditEntry {
    pub raw: String,
    pub parsed: StudioCommand,
    pub queued_week: u64,
}

/// Facade the CLI and server share: wraps the engine and keeps an audit
/// trail of everything the player submitted.
pub struct EngineApi {
    engine: StudioEngine,
    command_audit: Vec<CommandAuditEntry>,
}

impl std::fmt::Debug for EngineApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineApi")
            .field("run_id", &self.engine.run_id())
            .field("command_audit", &self.command_audit)
            .finish_non_exhaustive()
    }
}

impl EngineApi {
    pub fn from_config(config: StudioConfig) -> Self {
        Self {
            engine: StudioEngine::new(config),
            command_audit: Vec::new(),
        }
    }

    /// Facade over an engine with injected collaborators (offline runs,
    /// tests).
    pub fn with_collaborators(
        config: StudioConfig,
        textgen: std::sync::Arc<dyn TextGenerator>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            engine: StudioEngine::with_collaborators(config, textgen, rng),
            command_audit: Vec::new(),
        }
    }

    pub fn run_id(&self) -> String {
        self.engine.run_id().to_string()
    }

    pub fn status(&self) -> StudioStatus {
        self.engine.status()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn command_audit(&self) -> &[CommandAuditEntry] {
        &self.command_audit
    }

    /// Accept a raw command. Returns the parsed form so callers can echo
    /// what the kernel will eventually do with it.
    pub fn enqueue_command(&mut self, raw: impl Into<String>) -> StudioCommand {
        let raw = raw.into();
        let parsed = StudioCommand::parse(&raw);
        self.command_audit.push(CommandAuditEntry {
            raw: raw.clone(),
            parsed: parsed.clone(),
            queued_week: self.engine.game.current_week,
        });
        self.engine.enqueue_command(raw);
        parsed
    }

    /// Advance up to `weeks` turns. Returns the resulting status and how
    /// many turns actually completed.
    pub async fn advance_weeks(&mut self, weeks: u64) -> (StudioStatus, u64) {
        let completed = self.engine.advance_weeks(weeks).await;
        (self.engine.status(), completed)
    }
}
