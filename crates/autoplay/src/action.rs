use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AutoAction {
    Start,
    PlayCard { hand_index: usize, slot: usize },
    AcknowledgeInfo,
}

impl AutoAction {
    pub fn stable_key(&self) -> String {
        match self {
            Self::Start => "start".to_string(),
            Self::PlayCard { hand_index, slot } => format!("play:{hand_index}:{slot}"),
            Self::AcknowledgeInfo => "acknowledge_info".to_string(),
        }
    }

    pub fn short_label(&self) -> String {
        match self {
            Self::Start => "start".to_string(),
            Self::PlayCard { hand_index, slot } => format!("play hand[{hand_index}] -> slot {slot}"),
            Self::AcknowledgeInfo => "acknowledge info".to_string(),
        }
    }
}
