use std::sync::Arc;

use contracts::{BugReport, Question, QuestionStatus};
use tracing::{info, warn};

use super::StudioEngine;
use crate::inquisitor::{self, QuantumBrief};
use crate::marketing::{self, MarketingView};
use crate::producer::{self, ProducerView};

impl StudioEngine {
    /// Run one simulated week. Returns false without touching state when a
    /// previous turn is still joining agents or the game has released.
    pub async fn advance_week(&mut self) -> bool {
        if self.game.game_released {
            return false;
        }
        if self.waiting_for_agents {
            warn!(target: "studio.turn", "turn refused, agents still outstanding");
            return false;
        }

        let week = self.game.current_week;

        // 1-2. Pop and interpret at most one command. An empty queue still
        // runs a full agent turn.
        let created = match self.game.command_queue.pop_front() {
            Some(raw) => self.apply_command(&raw),
            None => Vec::new(),
        };

        // 3. Suspend further turn-advance requests until the join.
        self.waiting_for_agents = true;

        // 4. Marketing activation flips just before launch, one-way.
        if !self.game.marketing_active && week > self.config.marketing_week_threshold {
            self.game.marketing_active = true;
            info!(target: "studio.turn", week, "marketing campaign activated");
        }

        // Capture the agent views before anything runs so no agent can see
        // another's in-flight output.
        let briefs = created
            .iter()
            .filter(|quantum| !quantum.declaration_source.starts_with(contracts::ANSWER_PREFIX))
            .map(|quantum| QuantumBrief {
                quantum_id: quantum.quantum_id.clone(),
                line: quantum.brief_line(),
            })
            .collect::<Vec<_>>();

        let producer_view = ProducerView {
            released: self.game.game_released,
            quanta_count: self.quanta.len(),
            weekly_spend: self.game.weekly_spend,
            open_questions: self
                .questions
                .iter()
                .filter(|question| question.status == QuestionStatus::Open)
                .cloned()
                .collect(),
        };

        let week_tag = self.week_label_now();
        let marketing_view = MarketingView {
            active: self.game.marketing_active,
            released: self.game.game_released,
            total_quanta: self.quanta.len(),
            feature: self
                .quanta
                .iter()
                .filter(|quantum| quantum.created_at == week_tag)
                .find(|quantum| marketing::is_promotable(quantum.quantum_type))
                .cloned(),
            spend_increment: self.config.marketing_spend_increment,
        };

        // 5. Fan out and join. Every agent resolves with an outcome; none
        // can fail the turn.
        let gen = Arc::clone(&self.textgen);
        let rng = self.rng.as_mut();
        let (inquisitor_outcome, marketing_outcome, producer_outcome) = tokio::join!(
            inquisitor::run(Arc::clone(&gen), briefs),
            marketing::run(Arc::clone(&gen), marketing_view),
            producer::run(gen, producer_view, rng),
        );

        // Settle outcomes in a fixed order: inquisitor, marketing, then the
        // producer so release scoring sees this week's hype.
        for draft in inquisitor_outcome.drafts {
            let question = Question {
                id: self.next_question_id(),
                text: draft.text,
                status: QuestionStatus::Open,
                source_quantum_id: draft.source_quantum_id,
            };
            info!(target: "studio.turn", id = %question.id, "question raised");
            self.questions.push(question);
        }
        self.game
            .last_agent_activity
            .insert(inquisitor::AGENT_NAME.to_string(), inquisitor_outcome.activity);

        if marketing_outcome.ran {
            self.game.market_hype =
                (self.game.market_hype + marketing_outcome.hype_gain).min(100.0);
            self.game.weekly_spend += marketing_outcome.spend_increase;
            if let Some(promo) = &marketing_outcome.promo {
                info!(target: "studio.turn", %promo, "promo released");
            }
        }
        self.game
            .last_agent_activity
            .insert(marketing::AGENT_NAME.to_string(), marketing_outcome.activity);

        if producer_outcome.ran {
            self.game.budget -= producer_outcome.spend;
            self.game.build_progress =
                (self.game.build_progress + producer_outcome.progress_gain).min(100.0);
            if let Some(bug) = producer_outcome.bug {
                self.game.bugs += 1;
                let report = BugReport {
                    id: self.next_bug_id(),
                    text: bug.text,
                    week,
                    source_question_id: bug.source_question_id,
                };
                warn!(target: "studio.turn", id = %report.id, "bug recorded");
                self.bug_reports.push(report);
            }
        }
        self.game
            .last_agent_activity
            .insert(producer::AGENT_NAME.to_string(), producer_outcome.activity);

        // Scoring reads design_completeness as it stood entering the turn;
        // the recompute below happens after the terminal transition.
        if producer_outcome.ran && self.game.build_progress >= 100.0 && !self.game.game_released {
            self.release();
        }

        // 6-8. Join complete: clear the guard, advance the week, recompute
        // the derived metric.
        self.waiting_for_agents = false;
        self.game.current_week += 1;
        self.recompute_design_completeness();

        if !self.game.game_released {
            self.status_line = format!(
                "week {} | budget {:.0} | build {:.1}% | hype {:.0} | bugs {}",
                self.game.current_week,
                self.game.budget,
                self.game.build_progress,
                self.game.market_hype,
                self.game.bugs,
            );
        }

        true
    }

    /// Advance up to `weeks` turns, stopping early at release. Returns the
    /// number of turns actually completed.
    pub async fn advance_weeks(&mut self, weeks: u64) -> u64 {
        let mut completed = 0;
        for _ in 0..weeks {
            if !self.advance_week().await {
                break;
            }
            completed += 1;
        }
        completed
    }
}
