//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DialogError, Result};

/// Tunables for a [`DialogManager`](crate::DialogManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chance to continue with the requested move during a lull (0.0-1.0).
    pub default_threshold: f64,

    /// Urgency of follow-up obligations pushed through [`EditContext::follow_up`](crate::EditContext::follow_up).
    pub follow_up_urgency: i32,

    /// Time to live, in the listener's turns, of follow-up obligations.
    pub follow_up_time_to_live: u32,

    /// Turn cap for [`DialogManager::finish_conversation`](crate::DialogManager::finish_conversation).
    pub max_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.5,
            follow_up_urgency: 0,
            follow_up_time_to_live: 3,
            max_turns: 64,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| DialogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DialogError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(DialogError::InvalidThreshold(self.default_threshold));
        }
        if self.max_turns == 0 {
            return Err(DialogError::Config("max_turns must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            default_threshold = 0.9
            max_turns = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.default_threshold, 0.9);
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.follow_up_urgency, 0);
        assert_eq!(config.follow_up_time_to_live, 3);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig {
            follow_up_urgency: 7,
            ..EngineConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            EngineConfig::from_toml_str("default_threshold = 1.5"),
            Err(DialogError::InvalidThreshold(1.5))
        );
        assert!(matches!(
            EngineConfig::from_toml_str("max_turns = 0"),
            Err(DialogError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_turns = \"many\""),
            Err(DialogError::Config(_))
        ));
    }
}
