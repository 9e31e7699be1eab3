//! Keyword-based text risk classifier.
//!
//! Matching is a plain substring scan over the lowercased text, so words
//! that merely contain a keyword ("dangerous", "helpful") also trigger the
//! high-risk branch.

use serde::{Deserialize, Serialize};

const HIGH_RISK_KEYWORDS: [&str; 20] = [
    "scared", "fear", "help", "unsafe", "follow", "stalker", "stalking", "panic", "threat", "kill",
    "attack", "hurt", "die", "knife", "gun", "rape", "kidnap", "danger", "weapon", "chasing",
];

const HIGH_RISK_RESPONSE: &str = "I’m here with you. If you feel in danger, press SOS now. \
     Move toward a well-lit area or a place with people.";

const LOW_RISK_RESPONSE: &str = "Hey, I’m with you. You’re doing okay. \
     Tell me where you are and I’ll guide you.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    High,
}

/// Classifier verdict as returned by `/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub emotion: String,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
    pub response_text: String,
}

/// Classify free text.
pub fn analyze_text(text: &str) -> Analysis {
    let lowered = text.to_lowercase();
    match matched_keyword(&lowered) {
        Some(keyword) => {
            tracing::debug!("High-risk keyword matched: {}", keyword);
            Analysis {
                emotion: "fear".to_string(),
                risk_level: RiskLevel::High,
                recommended_action: Some("offer_sos".to_string()),
                response_text: HIGH_RISK_RESPONSE.to_string(),
            }
        }
        None => Analysis {
            emotion: "calm".to_string(),
            risk_level: RiskLevel::Low,
            recommended_action: None,
            response_text: LOW_RISK_RESPONSE.to_string(),
        },
    }
}

/// First keyword contained in already-lowercased text.
fn matched_keyword(lowered: &str) -> Option<&'static str> {
    HIGH_RISK_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}
