//! Inquisitor: raises clarifying questions against this week's new facts.

use std::sync::Arc;

use tracing::debug;

use crate::textgen::{is_fallback, TextGenerator, INQUISITOR_ROLE};

pub const AGENT_NAME: &str = "inquisitor";

/// Minimum length of an acceptable generated question.
const MIN_QUESTION_LEN: usize = 10;

/// What the inquisitor reads: one line per qualifying quantum, in creation
/// order. Facts sourced from `/answer` commands are excluded upstream so
/// answers never spawn further clarification loops.
#[derive(Debug, Clone)]
pub struct QuantumBrief {
    pub quantum_id: String,
    pub line: String,
}

#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub text: String,
    pub source_quantum_id: String,
}

#[derive(Debug, Clone)]
pub struct InquisitorOutcome {
    pub drafts: Vec<QuestionDraft>,
    pub activity: String,
}

/// One turn of the inquisitor. Generation requests go out one at a time, in
/// brief order, so question-to-quantum attribution stays deterministic.
pub async fn run(gen: Arc<dyn TextGenerator>, briefs: Vec<QuantumBrief>) -> InquisitorOutcome {
    if briefs.is_empty() {
        return InquisitorOutcome {
            drafts: Vec::new(),
            activity: "no new facts".to_string(),
        };
    }

    let mut drafts = Vec::new();
    for brief in &briefs {
        let text = gen.generate(INQUISITOR_ROLE, &brief.line).await;
        if is_fallback(&text) || text.len() <= MIN_QUESTION_LEN {
            debug!(
                target: "studio.inquisitor",
                quantum_id = %brief.quantum_id,
                "rejected generated question"
            );
            continue;
        }
        drafts.push(QuestionDraft {
            text,
            source_quantum_id: brief.quantum_id.clone(),
        });
    }

    let activity = if drafts.is_empty() {
        "no new questions".to_string()
    } else {
        format!("raised {} question(s)", drafts.len())
    };

    InquisitorOutcome { drafts, activity }
}
