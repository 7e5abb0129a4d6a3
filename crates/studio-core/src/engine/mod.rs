//! The turn engine. Owns every piece of simulation state for one run and
//! sequences the weekly pipeline; agents only ever see immutable views
//! captured at fan-out and hand back outcomes for the engine to settle.

mod commands;
mod snapshot;
mod turn;

use std::sync::Arc;

use contracts::{
    week_label, BugReport, GameState, Quantum, Question, QuestionStatus, StudioConfig,
    StudioMode, StudioStatus, SCHEMA_VERSION_V1,
};
use tracing::{debug, info};

use crate::rng::{RandomSource, SeededRandom};
use crate::scoring;
use crate::textgen::{HttpTextClient, TextGenerator};

pub struct StudioEngine {
    pub config: StudioConfig,
    pub game: GameState,
    /// Append-only fact store. Quanta are never deleted or reordered.
    pub quanta: Vec<Quantum>,
    pub questions: Vec<Question>,
    pub bug_reports: Vec<BugReport>,
    /// Set for the duration of the agent fan-out; a turn may not start
    /// while it is up.
    pub waiting_for_agents: bool,
    pub status_line: String,
    next_quantum_seq: u64,
    next_question_seq: u64,
    next_bug_seq: u64,
    textgen: Arc<dyn TextGenerator>,
    rng: Box<dyn RandomSource>,
}

impl StudioEngine {
    /// Engine wired to the configured HTTP generation endpoint and a
    /// seed-derived random source.
    pub fn new(config: StudioConfig) -> Self {
        let textgen = Arc::new(HttpTextClient::new(config.textgen.clone()));
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_collaborators(config, textgen, rng)
    }

    /// Engine with injected collaborators; the seam tests and offline runs
    /// use.
    pub fn with_collaborators(
        config: StudioConfig,
        textgen: Arc<dyn TextGenerator>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let game = GameState::from_config(&config);
        info!(
            target: "studio.engine",
            run_id = %config.run_id,
            seed = config.seed,
            "run initialized"
        );
        Self {
            config,
            game,
            quanta: Vec::new(),
            questions: Vec::new(),
            bug_reports: Vec::new(),
            waiting_for_agents: false,
            status_line: "awaiting the first design directive".to_string(),
            next_quantum_seq: 0,
            next_question_seq: 0,
            next_bug_seq: 0,
            textgen,
            rng,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.config.run_id
    }

    pub fn status(&self) -> StudioStatus {
        StudioStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.config.run_id.clone(),
            current_week: self.game.current_week,
            mode: if self.game.game_released {
                StudioMode::Released
            } else {
                StudioMode::Running
            },
            queue_depth: self.game.command_queue.len(),
            waiting_for_agents: self.waiting_for_agents,
        }
    }

    /// Accept a raw command string from the presentation layer. Anything is
    /// accepted; unrecognized text simply produces no facts when processed.
    pub fn enqueue_command(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        debug!(target: "studio.engine", command = %raw, "command queued");
        self.game.command_queue.push_back(raw);
    }

    pub fn open_question_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| question.status == QuestionStatus::Open)
            .count()
    }

    fn week_label_now(&self) -> String {
        week_label(self.game.current_week)
    }

    fn next_quantum_id(&mut self) -> String {
        self.next_quantum_seq += 1;
        format!("quantum:{}", self.next_quantum_seq)
    }

    fn next_question_id(&mut self) -> String {
        self.next_question_seq += 1;
        format!("question:{}", self.next_question_seq)
    }

    fn next_bug_id(&mut self) -> String {
        self.next_bug_seq += 1;
        format!("bug:{}", self.next_bug_seq)
    }

    fn recompute_design_completeness(&mut self) {
        let quanta = self.quanta.len();
        let open = self.open_question_count();
        self.game.design_completeness = if quanta + open > 0 {
            quanta as f64 / (quanta + open) as f64 * 100.0
        } else {
            0.0
        };
    }

    /// Terminal transition. Fires at most once, from the producer settle
    /// path within the turn that capped the build.
    fn release(&mut self) {
        let score = scoring::final_score(
            self.game.design_completeness,
            self.game.market_hype,
            self.game.bugs,
        );
        self.game.game_released = true;
        self.game.final_score = Some(score);
        self.status_line = format!("released! final score {score:.1}");
        info!(target: "studio.engine", score, week = self.game.current_week, "game released");
    }
}
