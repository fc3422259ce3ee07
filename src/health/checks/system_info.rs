//! Host system check

use sysinfo::System;

use crate::health::check::{CheckResult, SystemCheck};

const GIB: f64 = 1_073_741_824.0;

/// Gathers OS, CPU and memory information
#[derive(Default)]
pub struct SystemInfoCheck;

impl SystemInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

impl SystemCheck for SystemInfoCheck {
    fn name(&self) -> &'static str {
        "System Info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates OS, CPU, and memory information gathering")
    }

    fn check(&self) -> CheckResult {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let unknown = || "Unknown".to_string();
        let mut details = vec![
            format!(
                "OS: {} {}",
                System::name().unwrap_or_else(unknown),
                System::os_version().unwrap_or_else(unknown)
            ),
            format!("Kernel: {}", System::kernel_version().unwrap_or_else(unknown)),
        ];

        let logical_cores = sys.cpus().len();
        if logical_cores == 0 {
            return CheckResult::warn("Unable to detect CPU cores").with_details(details);
        }
        details.push(format!(
            "CPU cores: {} physical, {} logical",
            System::physical_core_count().unwrap_or(0),
            logical_cores
        ));

        let total_memory = sys.total_memory() as f64 / GIB;
        details.push(format!("Memory: {total_memory:.1} GiB total"));
        if let Some(host) = System::host_name() {
            details.push(format!("Hostname: {host}"));
        }

        if total_memory < 1.0 {
            return CheckResult::warn("Low memory detected").with_details(details);
        }
        CheckResult::pass("System info gathered").with_details(details)
    }
}
