//! Build metadata check

use crate::build_info;
use crate::health::check::{CheckResult, SystemCheck};

/// Reports the metadata `vergen` captured; warns if any field came out empty
#[derive(Default)]
pub struct BuildInfoCheck;

impl BuildInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

impl SystemCheck for BuildInfoCheck {
    fn name(&self) -> &'static str {
        "Build Info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates build metadata (rustc, target, timestamp)")
    }

    fn check(&self) -> CheckResult {
        let fields = build_info::fields();
        let details = fields.iter().map(|(label, value)| format!("{label}: {value}"));
        let missing: Vec<_> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if missing.is_empty() {
            CheckResult::pass(build_info::version_string()).with_details(details)
        } else {
            CheckResult::warn(format!("Missing build metadata: {}", missing.join(", "))).with_details(details)
        }
    }
}
