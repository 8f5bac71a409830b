use crate::{AutoplayError, PlayerPolicy};

#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    pub seed: u64,
    pub policy: PlayerPolicy,
    /// Simulated seconds per tick.
    pub tick_seconds: f32,
    /// How long the scripted player waits into its turn before playing.
    pub think_seconds: f32,
    pub max_ticks: u32,
    pub acknowledge_info: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            policy: PlayerPolicy::Greedy,
            tick_seconds: 0.1,
            think_seconds: 0.5,
            max_ticks: 20_000,
            acknowledge_info: true,
        }
    }
}

impl AutoplayConfig {
    pub fn validate(&self) -> Result<(), AutoplayError> {
        if !self.tick_seconds.is_finite() || self.tick_seconds <= 0.0 {
            return Err(AutoplayError::Config(format!(
                "tick_seconds must be positive (got {})",
                self.tick_seconds
            )));
        }
        if !self.think_seconds.is_finite() || self.think_seconds < 0.0 {
            return Err(AutoplayError::Config(format!(
                "think_seconds must be non-negative (got {})",
                self.think_seconds
            )));
        }
        Ok(())
    }
}
