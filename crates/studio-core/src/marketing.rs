//! Marketing: hype generation once the campaign spins up mid-project.

use std::sync::Arc;

use contracts::{Quantum, QuantumType};
use tracing::debug;

use crate::textgen::{is_fallback, TextGenerator, MARKETING_ROLE};

pub const AGENT_NAME: &str = "marketing";

const HYPE_DIVISOR: f64 = 2.0;

/// Types worth putting in front of players.
const PROMOTABLE: &[QuantumType] = &[
    QuantumType::Ability,
    QuantumType::Character,
    QuantumType::MechanicPillar,
    QuantumType::Setting,
];

/// Immutable view captured at fan-out. `feature` is the first quantum of a
/// promotable type created this week, in creation order; its absence is
/// normal, not an error.
#[derive(Debug, Clone)]
pub struct MarketingView {
    pub active: bool,
    pub released: bool,
    pub total_quanta: usize,
    pub feature: Option<Quantum>,
    pub spend_increment: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MarketingOutcome {
    pub ran: bool,
    pub promo: Option<String>,
    pub hype_gain: f64,
    pub spend_increase: f64,
    pub activity: String,
}

pub fn is_promotable(quantum_type: QuantumType) -> bool {
    PROMOTABLE.contains(&quantum_type)
}

/// One turn of marketing. Hype and the burn-rate increase land whether or
/// not this week produced promotional copy.
pub async fn run(gen: Arc<dyn TextGenerator>, view: MarketingView) -> MarketingOutcome {
    if !view.active || view.released {
        return MarketingOutcome {
            activity: "planning the campaign".to_string(),
            ..MarketingOutcome::default()
        };
    }

    let mut promo = None;
    let activity = match &view.feature {
        Some(feature) => {
            let text = gen.generate(MARKETING_ROLE, &feature.brief_line()).await;
            if is_fallback(&text) {
                debug!(target: "studio.marketing", "promo generation fell back");
                "creative block".to_string()
            } else {
                let pitch = format!("pitching {}: {}", feature.data.summary(), text);
                promo = Some(text);
                pitch
            }
        }
        None => "nothing new worth promoting this week".to_string(),
    };

    MarketingOutcome {
        ran: true,
        promo,
        hype_gain: view.total_quanta as f64 / HYPE_DIVISOR,
        spend_increase: view.spend_increment,
        activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textgen::{CannedTextClient, FallbackTextClient};
    use contracts::{week_label, QuantumData, QuantumStatus};

    fn feature(quantum_type: QuantumType) -> Quantum {
        Quantum {
            quantum_id: "quantum:5".to_string(),
            quantum_type,
            data: QuantumData::named("Ghostwire"),
            version: 1,
            status: QuantumStatus::Active,
            created_at: week_label(6),
            declaration_source: "/declare ghostwire".to_string(),
        }
    }

    fn active_view(feature_quantum: Option<Quantum>) -> MarketingView {
        MarketingView {
            active: true,
            released: false,
            total_quanta: 7,
            feature: feature_quantum,
            spend_increment: 1_500.0,
        }
    }

    #[tokio::test]
    async fn inactive_marketing_only_plans() {
        let view = MarketingView {
            active: false,
            ..active_view(None)
        };
        let outcome = run(Arc::new(FallbackTextClient), view).await;
        assert!(!outcome.ran);
        assert_eq!(outcome.hype_gain, 0.0);
        assert_eq!(outcome.spend_increase, 0.0);
        assert_eq!(outcome.activity, "planning the campaign");
    }

    #[tokio::test]
    async fn hype_and_burn_rate_rise_without_a_feature() {
        let outcome = run(Arc::new(FallbackTextClient), active_view(None)).await;
        assert!(outcome.ran);
        assert_eq!(outcome.hype_gain, 3.5);
        assert_eq!(outcome.spend_increase, 1_500.0);
        assert!(outcome.promo.is_none());
    }

    #[tokio::test]
    async fn feature_promo_lands_in_the_activity_line() {
        let client = Arc::new(CannedTextClient::new("Hack the city's ghosts with one wire."));
        let outcome = run(client, active_view(Some(feature(QuantumType::Ability)))).await;
        assert!(outcome.promo.is_some());
        assert!(outcome.activity.starts_with("pitching Ghostwire"));
    }

    #[tokio::test]
    async fn fallback_promo_reports_creative_block_and_still_raises_hype() {
        let outcome = run(
            Arc::new(FallbackTextClient),
            active_view(Some(feature(QuantumType::Setting))),
        )
        .await;
        assert!(outcome.promo.is_none());
        assert_eq!(outcome.activity, "creative block");
        assert_eq!(outcome.hype_gain, 3.5);
        assert_eq!(outcome.spend_increase, 1_500.0);
    }

    #[test]
    fn promotable_set_matches_the_campaign_brief() {
        assert!(is_promotable(QuantumType::Ability));
        assert!(is_promotable(QuantumType::Character));
        assert!(is_promotable(QuantumType::MechanicPillar));
        assert!(is_promotable(QuantumType::Setting));
        assert!(!is_promotable(QuantumType::Genre));
        assert!(!is_promotable(QuantumType::ArtStyle));
        assert!(!is_promotable(QuantumType::GameplayLoop));
    }
}
