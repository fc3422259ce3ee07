//! Health checks for the bridge and its host
//!
//! Used by `touch-bridge check` and in CI to confirm that configuration
//! loads, build metadata is present and the gesture engine still behaves.
//!
//! # Example
//!
//! ```no_run
//! use touch_bridge::health::{HealthCheckRunner, checks::*};
//!
//! let report = HealthCheckRunner::new()
//!     .add_check(ConfigCheck::new())
//!     .add_check(GestureCheck::new())
//!     .run();
//!
//! std::process::exit(report.exit_code());
//! ```

pub mod check;
pub mod checks;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus, SystemCheck};
pub use reporter::{format_report, print_report};
pub use runner::{HealthCheckReport, HealthCheckRunner};

/// Runs every built-in check
pub fn run_all_checks() -> HealthCheckReport {
    HealthCheckRunner::new()
        .add_check(checks::ConfigCheck::new())
        .add_check(checks::BuildInfoCheck::new())
        .add_check(checks::SystemInfoCheck::new())
        .add_check(checks::GestureCheck::new())
        .run()
}
