use serde::{Deserialize, Serialize};

pub use barter_core::{
    BarterConfig, Card, MatrixRule, NeutralStrategy, ParticipantRule, ResponseEntry,
    SubmissionPolicy, TimingRule, WillingnessRule, DEFAULT_CARDS_TO_PLAY, DEFAULT_HISTORY_LEN,
};

/// Tunables shared by every negotiation in a pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesDef {
    pub cards_to_play: usize,
    pub willingness: WillingnessRule,
    pub timing: TimingRule,
    pub history_len: usize,
    pub submission: SubmissionPolicy,
    pub neutral: NeutralStrategy,
}

impl Default for RulesDef {
    fn default() -> Self {
        Self {
            cards_to_play: DEFAULT_CARDS_TO_PLAY,
            willingness: WillingnessRule::default(),
            timing: TimingRule::default(),
            history_len: DEFAULT_HISTORY_LEN,
            submission: SubmissionPolicy::default(),
            neutral: NeutralStrategy::default(),
        }
    }
}

/// One trader: their preferences and the tones they argue with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NpcDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub matrix: MatrixRule,
    pub deck: ParticipantRule,
    /// Overrides the pack-wide neutral strategy for this trader.
    #[serde(default)]
    pub neutral: Option<NeutralStrategy>,
    #[serde(default)]
    pub starting_willingness: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarterPack {
    #[serde(default)]
    pub rules: RulesDef,
    pub player: ParticipantRule,
    pub npcs: Vec<NpcDef>,
}

impl BarterPack {
    pub fn npc(&self, id: &str) -> Option<&NpcDef> {
        self.npcs.iter().find(|npc| npc.id == id)
    }

    pub fn npc_ids(&self) -> impl Iterator<Item = &str> {
        self.npcs.iter().map(|npc| npc.id.as_str())
    }

    /// Full negotiation config against the trader `id`.
    pub fn config_for(&self, id: &str) -> Option<BarterConfig> {
        self.npc(id).map(|npc| self.config_with(npc))
    }

    pub fn config_with(&self, npc: &NpcDef) -> BarterConfig {
        let mut matrix = npc.matrix.clone();
        if matrix.id.is_empty() {
            matrix.id = npc.id.clone();
        }
        let mut willingness = self.rules.willingness.clone();
        if let Some(starting) = npc.starting_willingness {
            willingness.starting = starting;
        }
        BarterConfig {
            cards_to_play: self.rules.cards_to_play,
            willingness,
            timing: self.rules.timing.clone(),
            history_len: self.rules.history_len,
            submission: self.rules.submission,
            neutral: npc
                .neutral
                .clone()
                .unwrap_or_else(|| self.rules.neutral.clone()),
            matrix,
            opponent: npc.deck.clone(),
            player: self.player.clone(),
        }
    }
}
