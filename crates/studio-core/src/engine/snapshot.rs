use contracts::{QuestionStatus, Snapshot, SCHEMA_VERSION_V1};

use super::StudioEngine;

impl StudioEngine {
    /// Read-only view for the presentation layer: full scalars, the whole
    /// fact store, open questions, and the most recent bug reports.
    pub fn snapshot(&self) -> Snapshot {
        let recent_bug_start = self.bug_reports.len().saturating_sub(16);
        Snapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.config.run_id.clone(),
            current_week: self.game.current_week,
            budget: self.game.budget,
            weekly_spend: self.game.weekly_spend,
            design_completeness: self.game.design_completeness,
            build_progress: self.game.build_progress,
            bugs: self.game.bugs,
            market_hype: self.game.market_hype,
            marketing_active: self.game.marketing_active,
            game_released: self.game.game_released,
            final_score: self.game.final_score,
            waiting_for_agents: self.waiting_for_agents,
            status_line: self.status_line.clone(),
            pending_commands: self.game.command_queue.iter().cloned().collect(),
            quanta: self.quanta.clone(),
            open_questions: self
                .questions
                .iter()
                .filter(|question| question.status == QuestionStatus::Open)
                .cloned()
                .collect(),
            recent_bugs: self.bug_reports[recent_bug_start..].to_vec(),
            last_agent_activity: self.game.last_agent_activity.clone(),
        }
    }
}
