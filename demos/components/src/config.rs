use std::sync::LazyLock;
use std::time::Duration;

use reflow_core::{Context, View};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Knobs for the demo components. Every field has a default, so `{}` is a
/// valid config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub greeting_name: String,
    /// Length of one timer tick (`tick_ms` in JSON).
    #[serde(rename = "tick_ms", deserialize_with = "millis")]
    pub tick: Duration,
    /// Simulated network latency of the user fetch (`fetch_delay_ms`).
    #[serde(rename = "fetch_delay_ms", deserialize_with = "millis")]
    pub fetch_delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            greeting_name: "User".to_string(),
            tick: Duration::from_millis(1000),
            fetch_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid demo config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tick_ms must be greater than zero")]
    ZeroTick,
}

impl DemoConfig {
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = serde_json::from_str(src)?;
        if config.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        Ok(config)
    }
}

fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

/// Components read their config from here; without a provider they get
/// [`DemoConfig::default`].
pub static DEMO_CONFIG: LazyLock<Context<DemoConfig>> =
    LazyLock::new(|| Context::new("DemoConfig", DemoConfig::default));

pub fn with_config(config: DemoConfig, content: View) -> View {
    DEMO_CONFIG.provide(config, vec![content])
}
