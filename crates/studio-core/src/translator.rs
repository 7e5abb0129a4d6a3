//! Pure keyword translation from raw command text to design-fact templates.
//!
//! Matching is deterministic substring search over the lower-cased command.
//! Each rule fires at most once per command, in table order, regardless of
//! how often the keyword repeats inside the text.

use contracts::{QuantumData, QuantumType};

pub struct KeywordRule {
    pub keyword: &'static str,
    pub quantum_type: QuantumType,
    name: Option<&'static str>,
    description: Option<&'static str>,
}

impl KeywordRule {
    pub fn payload(&self) -> QuantumData {
        QuantumData {
            name: self.name.map(str::to_string),
            description: self.description.map(str::to_string),
        }
    }
}

/// The fixed vocabulary. Order here is creation order for multi-match
/// commands, which downstream agents rely on for tie-breaks.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keyword: "rpg",
        quantum_type: QuantumType::Genre,
        name: Some("Action RPG"),
        description: None,
    },
    KeywordRule {
        keyword: "stealth",
        quantum_type: QuantumType::MechanicPillar,
        name: Some("Stealth"),
        description: None,
    },
    KeywordRule {
        keyword: "cyberpunk",
        quantum_type: QuantumType::Setting,
        name: Some("Cyberpunk Fantasy"),
        description: None,
    },
    KeywordRule {
        keyword: "protagonist",
        quantum_type: QuantumType::Character,
        name: None,
        description: Some("A nameless courier caught between the megacorps and the old magic"),
    },
    KeywordRule {
        keyword: "ghostwire",
        quantum_type: QuantumType::Ability,
        name: Some("Ghostwire"),
        description: None,
    },
    KeywordRule {
        keyword: "art style",
        quantum_type: QuantumType::ArtStyle,
        name: None,
        description: Some("Neon-noir painted environments with hand-inked characters"),
    },
    KeywordRule {
        keyword: "gameplay loop",
        quantum_type: QuantumType::GameplayLoop,
        name: None,
        description: Some("Infiltrate, extract, upgrade, vanish"),
    },
];

/// Match a command against the vocabulary. Zero matches is not an error,
/// merely zero output.
pub fn translate(command_text: &str) -> Vec<&'static KeywordRule> {
    let lowered = command_text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .filter(|rule| lowered.contains(rule.keyword))
        .collect()
}
