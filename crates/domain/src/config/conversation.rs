use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Greetings for a launch request; one is picked per launch.
    #[serde(default = "d_greetings")]
    pub greetings: Vec<String>,
    /// When `true`, trackings that reconcile to delivered during a
    /// list-all pass are written back and left out of that pass's reply.
    /// When `false` they still appear once and drop out on the next pass.
    #[serde(default)]
    pub exclude_delivered_from_listing: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greetings: d_greetings(),
            exclude_delivered_from_listing: false,
        }
    }
}

fn d_greetings() -> Vec<String> {
    vec![
        "ようこそ、宅配こです".into(),
        "こんにちは、宅配こです".into(),
    ]
}
