//! Terminal rendering of health reports

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::CheckStatus;
use super::runner::HealthCheckReport;

/// Report as a table followed by the summary
pub fn format_report(report: &HealthCheckReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Check", "Status", "Took", "Result"]);

    for (name, result) in &report.results {
        builder.push_record([
            name.clone(),
            result.status.as_colored_str(),
            format!("{:.2?}", result.duration),
            result.message.clone(),
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    format!("{table}\n{}", format_summary(report))
}

fn format_summary(report: &HealthCheckReport) -> String {
    let mut lines = vec![
        format!("\n{}", "Summary".bold().underline()),
        format!("  Checks run: {}", report.total()),
        format!("  {} Passed: {}", "✓".green(), report.passed()),
    ];
    if report.warned() > 0 {
        lines.push(format!("  {} Warned: {}", "⚠".yellow(), report.warned()));
    }
    if report.failed() > 0 {
        lines.push(format!("  {} Failed: {}", "✗".red(), report.failed()));
    }

    let overall = match report.overall() {
        CheckStatus::Pass => "Overall: HEALTHY".green().bold(),
        CheckStatus::Warn => "Overall: HEALTHY (with warnings)".yellow().bold(),
        CheckStatus::Fail => "Overall: UNHEALTHY".red().bold(),
    };
    lines.push(String::new());
    lines.push(format!("  {overall}"));
    lines.join("\n") + "\n"
}

/// Prints the report and every check's detail lines
pub fn print_report(report: &HealthCheckReport) {
    println!("{}", format_report(report));

    for (name, result) in report.results.iter().filter(|(_, r)| !r.details.is_empty()) {
        println!("\n{} Details:", name.bold());
        for line in &result.details {
            println!("  {line}");
        }
    }
}
