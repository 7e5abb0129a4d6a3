use contracts::{Quantum, QuantumStatus, QuestionStatus, StudioCommand};
use tracing::{debug, info};

use super::StudioEngine;
use crate::translator;

impl StudioEngine {
    /// Process one popped command. Returns the quanta it created, in
    /// creation order, for the inquisitor gate.
    pub(super) fn apply_command(&mut self, raw: &str) -> Vec<Quantum> {
        match StudioCommand::parse(raw) {
            StudioCommand::Declare { text } => self.materialize_declarations(&text),
            StudioCommand::Answer { question_id, text } => {
                let resolved = self.resolve_answer(&question_id);
                if !resolved {
                    debug!(
                        target: "studio.engine",
                        %question_id,
                        "answer did not resolve, degrading to declaration parsing"
                    );
                }
                // An answer can itself introduce new quanta.
                self.materialize_declarations(&text)
            }
            StudioCommand::Unknown { text } => {
                debug!(target: "studio.engine", command = %text, "unrecognized command ignored");
                Vec::new()
            }
        }
    }

    /// Flip the referenced question Open -> Answered. One-way; unknown or
    /// already-answered ids report non-resolution and nothing changes.
    fn resolve_answer(&mut self, question_id: &str) -> bool {
        let Some(question) = self
            .questions
            .iter_mut()
            .find(|question| question.id == question_id)
        else {
            return false;
        };
        if question.status != QuestionStatus::Open {
            return false;
        }
        question.status = QuestionStatus::Answered;
        info!(target: "studio.engine", %question_id, "question answered");
        true
    }

    /// Run the translator over the full command text and append the
    /// resulting quanta to the fact store.
    fn materialize_declarations(&mut self, command_text: &str) -> Vec<Quantum> {
        let week = self.week_label_now();
        let mut created = Vec::new();
        for rule in translator::translate(command_text) {
            let quantum = Quantum {
                quantum_id: self.next_quantum_id(),
                quantum_type: rule.quantum_type,
                data: rule.payload(),
                version: 1,
                status: QuantumStatus::Active,
                created_at: week.clone(),
                declaration_source: command_text.to_string(),
            };
            debug!(
                target: "studio.engine",
                quantum_id = %quantum.quantum_id,
                brief = %quantum.brief_line(),
                "quantum declared"
            );
            self.quanta.push(quantum.clone());
            created.push(quantum);
        }
        created
    }
}
