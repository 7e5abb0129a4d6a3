//! Producer: burns budget, advances the build, and occasionally breaks it.

use std::sync::Arc;

use contracts::Question;
use tracing::debug;

use crate::rng::RandomSource;
use crate::textgen::{is_fallback, TextGenerator, PRODUCER_ROLE};

pub const AGENT_NAME: &str = "producer";

const BASE_PROGRESS: f64 = 5.0;
const PROGRESS_FLOOR: f64 = 0.5;
const PROGRESS_PENALTY_PER_QUESTION: f64 = 0.5;
/// Linear and deliberately uncapped: seven or more open questions make the
/// draw a certainty.
const BUG_CHANCE_PER_QUESTION: f64 = 0.15;

/// Immutable view captured at fan-out. Open questions are the pre-turn set;
/// questions the inquisitor raises this same week are not visible here.
#[derive(Debug, Clone)]
pub struct ProducerView {
    pub released: bool,
    pub quanta_count: usize,
    pub weekly_spend: f64,
    pub open_questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct BugDraft {
    pub text: String,
    pub source_question_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProducerOutcome {
    /// False when the bootstrap guard or release suppressed the turn.
    pub ran: bool,
    pub spend: f64,
    pub progress_gain: f64,
    pub bug: Option<BugDraft>,
    pub activity: String,
}

/// Progress slows linearly with unresolved ambiguity but never stalls.
pub fn progress_increment(open_questions: usize) -> f64 {
    (BASE_PROGRESS - open_questions as f64 * PROGRESS_PENALTY_PER_QUESTION).max(PROGRESS_FLOOR)
}

/// One turn of the producer. Always resolves; a failed bug narrative simply
/// records no bug.
pub async fn run(
    gen: Arc<dyn TextGenerator>,
    view: ProducerView,
    rng: &mut dyn RandomSource,
) -> ProducerOutcome {
    if view.released {
        return ProducerOutcome {
            activity: "post-release wrap-up".to_string(),
            ..ProducerOutcome::default()
        };
    }
    if view.quanta_count == 0 {
        // Bootstrap guard: no progress before any design exists.
        return ProducerOutcome {
            activity: "waiting on a design direction".to_string(),
            ..ProducerOutcome::default()
        };
    }

    let open = view.open_questions.len();
    let gain = progress_increment(open);

    let mut bug = None;
    if open > 0 {
        let chance = open as f64 * BUG_CHANCE_PER_QUESTION;
        if rng.next_unit() < chance {
            let blamed = &view.open_questions[rng.pick_index(open)];
            let text = gen.generate(PRODUCER_ROLE, &blamed.text).await;
            if is_fallback(&text) {
                debug!(target: "studio.producer", "bug narrative fell back, bug discarded");
            } else {
                bug = Some(BugDraft {
                    text,
                    source_question_id: blamed.id.clone(),
                });
            }
        }
    }

    let activity = match &bug {
        Some(_) => format!("build +{gain:.1}%, shipped a new bug ({open} questions open)"),
        None => format!("build +{gain:.1}% ({open} questions open)"),
    };

    ProducerOutcome {
        ran: true,
        spend: view.weekly_spend,
        progress_gain: gain,
        bug,
        activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::textgen::{CannedTextClient, FallbackTextClient};
    use contracts::QuestionStatus;

    fn open_questions(n: usize) -> Vec<Question> {
        (1..=n)
            .map(|i| Question {
                id: format!("question:{i}"),
                text: format!("Open point {i}"),
                status: QuestionStatus::Open,
                source_quantum_id: format!("quantum:{i}"),
            })
            .collect()
    }

    fn view(quanta: usize, open: usize) -> ProducerView {
        ProducerView {
            released: false,
            quanta_count: quanta,
            weekly_spend: 5_000.0,
            open_questions: open_questions(open),
        }
    }

    #[test]
    fn increment_slows_with_backlog_and_floors() {
        assert_eq!(progress_increment(0), 5.0);
        assert_eq!(progress_increment(3), 3.5);
        assert_eq!(progress_increment(9), 0.5);
        assert_eq!(progress_increment(40), 0.5);
    }

    #[tokio::test]
    async fn zero_open_questions_means_full_speed_and_no_draw() {
        // A draw of 0.0 would fire any possible chance; the draw must not
        // even be consulted when nothing is open.
        let mut rng = ScriptedRandom::new([0.0], []);
        let outcome = run(Arc::new(FallbackTextClient), view(3, 0), &mut rng).await;
        assert!(outcome.ran);
        assert_eq!(outcome.progress_gain, 5.0);
        assert!(outcome.bug.is_none());
        // The scripted draw is still queued, proving no draw happened.
        assert_eq!(rng.next_unit(), 0.0);
    }

    #[tokio::test]
    async fn bootstrap_guard_suppresses_everything() {
        let mut rng = ScriptedRandom::new([0.0], []);
        let outcome = run(Arc::new(FallbackTextClient), view(0, 0), &mut rng).await;
        assert!(!outcome.ran);
        assert_eq!(outcome.spend, 0.0);
        assert_eq!(outcome.progress_gain, 0.0);
    }

    #[tokio::test]
    async fn draw_below_chance_emits_a_bug_blaming_the_picked_question() {
        let client = Arc::new(CannedTextClient::new(
            "Guards clip through walls whenever the player saves.",
        ));
        let mut rng = ScriptedRandom::new([0.149], [1]);
        let outcome = run(client, view(3, 1), &mut rng).await;
        let bug = outcome.bug.expect("one open question at 0.15 chance, draw 0.149");
        assert_eq!(bug.source_question_id, "question:1");
    }

    #[tokio::test]
    async fn draw_at_chance_boundary_does_not_emit() {
        let mut rng = ScriptedRandom::new([0.15], [0]);
        let outcome = run(Arc::new(FallbackTextClient), view(3, 1), &mut rng).await;
        assert!(outcome.bug.is_none());
    }

    #[tokio::test]
    async fn seven_open_questions_guarantee_the_draw() {
        // 7 * 0.15 > 1.0, so even the maximal unit draw fires.
        let client = Arc::new(CannedTextClient::new("The vertical slice deleted itself."));
        let mut rng = ScriptedRandom::new([0.999_999], [6]);
        let outcome = run(client, view(10, 7), &mut rng).await;
        let bug = outcome.bug.expect("uncapped probability must fire");
        assert_eq!(bug.source_question_id, "question:7");
    }

    #[tokio::test]
    async fn fallback_narrative_discards_the_bug_but_keeps_progress() {
        let mut rng = ScriptedRandom::new([0.0], [0]);
        let outcome = run(Arc::new(FallbackTextClient), view(3, 2), &mut rng).await;
        assert!(outcome.bug.is_none());
        assert!(outcome.ran);
        assert_eq!(outcome.progress_gain, 4.0);
        assert!(outcome.activity.contains("build +4.0%"));
        assert!(!outcome.activity.contains("bug"));
    }

    #[tokio::test]
    async fn released_view_is_a_no_op() {
        let mut rng = ScriptedRandom::new([0.0], []);
        let outcome = run(
            Arc::new(FallbackTextClient),
            ProducerView {
                released: true,
                ..view(5, 0)
            },
            &mut rng,
        )
        .await;
        assert!(!outcome.ran);
    }
}
