//! Runs checks and tallies the results

use std::time::Instant;

use tracing::debug;

use super::check::{CheckResult, CheckStatus, SystemCheck};

/// Results of one run, in registration order
#[derive(Debug)]
pub struct HealthCheckReport {
    pub results: Vec<(String, CheckResult)>,
}

impl HealthCheckReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|(_, r)| r.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn warned(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    /// Worst status seen; an empty report passes
    pub fn overall(&self) -> CheckStatus {
        self.results
            .iter()
            .map(|(_, r)| r.status)
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    /// No failures
    pub fn is_healthy(&self) -> bool {
        self.overall().is_ok()
    }

    pub fn has_warnings(&self) -> bool {
        self.warned() > 0
    }

    /// 0 = all pass, 1 = any fail, 2 = warnings only
    pub fn exit_code(&self) -> i32 {
        match self.overall() {
            CheckStatus::Pass => 0,
            CheckStatus::Fail => 1,
            CheckStatus::Warn => 2,
        }
    }

    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

#[derive(Default)]
pub struct HealthCheckRunner {
    checks: Vec<Box<dyn SystemCheck>>,
}

impl HealthCheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Runs every check once, timing each
    pub fn run(self) -> HealthCheckReport {
        let results = self
            .checks
            .into_iter()
            .map(|check| {
                let start = Instant::now();
                let result = check.check().with_duration(start.elapsed());
                debug!(check = check.name(), status = %result.status, "Health check finished");
                (check.name().to_string(), result)
            })
            .collect();

        HealthCheckReport { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, CheckStatus);

    impl SystemCheck for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn check(&self) -> CheckResult {
            CheckResult::new(self.1, "fixed")
        }
    }

    #[test]
    fn test_exit_codes_follow_worst_status() {
        let report = HealthCheckRunner::new().run();
        assert_eq!(report.exit_code(), 0);

        let report = HealthCheckRunner::new()
            .add_check(Fixed("a", CheckStatus::Pass))
            .add_check(Fixed("b", CheckStatus::Warn))
            .run();
        assert_eq!(report.exit_code(), 2);
        assert!(report.is_healthy());
        assert!(report.has_warnings());

        let report = HealthCheckRunner::new()
            .add_check(Fixed("a", CheckStatus::Fail))
            .add_check(Fixed("b", CheckStatus::Warn))
            .run();
        assert_eq!(report.exit_code(), 1);
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_results_keep_registration_order() {
        let report = HealthCheckRunner::new()
            .add_check(Fixed("first", CheckStatus::Pass))
            .add_check(Fixed("second", CheckStatus::Fail))
            .run();

        let names: Vec<_> = report.results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.result("second").map(|r| r.status), Some(CheckStatus::Fail));
    }
}
