use crate::types::Config;
use anyhow::{bail, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.replay.person_class_ids.is_empty() {
            bail!("replay.person_class_ids must name at least one class");
        }
        if !(0.0..=1.0).contains(&self.replay.min_confidence) {
            bail!(
                "replay.min_confidence must be within [0, 1], got {}",
                self.replay.min_confidence
            );
        }
        if let Some(window) = self.registry.evict_departed_after_s {
            if !window.is_finite() || window <= 0.0 {
                bail!(
                    "registry.evict_departed_after_s must be a positive number, got {}",
                    window
                );
            }
        }
        if self.report.recent_count == 0 {
            bail!("report.recent_count must be at least 1");
        }
        if !(-23..=23).contains(&self.report.utc_offset_hours) {
            bail!(
                "report.utc_offset_hours must be within [-23, 23], got {}",
                self.report.utc_offset_hours
            );
        }
        if !self.announce.cooldown_s.is_finite() || self.announce.cooldown_s < 0.0 {
            bail!(
                "announce.cooldown_s must be a non-negative number, got {}",
                self.announce.cooldown_s
            );
        }
        Ok(())
    }
}
