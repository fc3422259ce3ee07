//! Configuration profiles check

use crate::config::BridgeConfig;
use crate::health::check::{CheckResult, SystemCheck};

/// Loads and validates each profile, then the environment-selected one
pub struct ConfigCheck {
    profiles: Vec<&'static str>,
}

impl ConfigCheck {
    pub fn new() -> Self {
        Self::with_profiles(vec!["debug", "release"])
    }

    pub fn with_profiles(profiles: Vec<&'static str>) -> Self {
        Self { profiles }
    }
}

impl Default for ConfigCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for ConfigCheck {
    fn name(&self) -> &'static str {
        "Configuration"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Loads every profile from files and environment and validates it")
    }

    fn check(&self) -> CheckResult {
        let mut details = Vec::new();
        let mut failed = 0;

        for profile in &self.profiles {
            match BridgeConfig::load(profile) {
                Ok(config) => details.push(format!(
                    "✓ Profile '{}': gestures {}, long press {}ms, map {:?}",
                    profile, config.gestures.mode, config.timing.long_press_ms, config.dispatch.event_map
                )),
                Err(e) => {
                    details.push(format!("✗ Profile '{profile}': {e}"));
                    failed += 1;
                }
            }
        }

        let env_ok = match BridgeConfig::load_from_env() {
            Ok(config) => {
                details.push(format!("✓ Environment selects profile '{}'", config.profile));
                true
            }
            Err(e) => {
                details.push(format!("⚠ Environment profile: {e}"));
                false
            }
        };

        let result = if failed > 0 {
            CheckResult::fail(format!("{failed} of {} profiles failed to load", self.profiles.len()))
        } else if !env_ok {
            CheckResult::warn("Profiles load, environment profile does not")
        } else {
            CheckResult::pass(format!("{} profiles validated", self.profiles.len()))
        };
        result.with_details(details)
    }
}
