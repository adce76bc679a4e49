use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What happens to an in-flight request when a newer one is dispatched
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Cancel the older request and report it as superseded
    #[default]
    Supersede,
    /// Let both finish and publish both outcomes
    RunToCompletion,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "supersede" => Ok(OverlapPolicy::Supersede),
            "run_to_completion" => Ok(OverlapPolicy::RunToCompletion),
            other => Err(format!("unknown overlap policy: {other}")),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Supersede => f.write_str("supersede"),
            OverlapPolicy::RunToCompletion => f.write_str("run_to_completion"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct RouterConfig {
    pub overlap_policy: OverlapPolicy,
    /// Publish failures as completed results whose translation is the error message
    pub legacy_inline_errors: bool,
}

impl RouterConfig {
    pub fn new() -> Self {
        let overlap_policy = env::var("POPWORD_OVERLAP_POLICY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let legacy_inline_errors = env::var("POPWORD_LEGACY_INLINE_ERRORS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            overlap_policy,
            legacy_inline_errors,
        }
    }
}
