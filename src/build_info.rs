//! Build-time information captured by `vergen`

/// When the binary was compiled
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// stable, beta or nightly
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short version line, e.g. `touch-bridge 0.1.0 (x86_64-unknown-linux-gnu, opt3)`
pub fn version_string() -> String {
    format!(
        "{} {} ({}, opt{})",
        env!("CARGO_PKG_NAME"),
        PKG_VERSION,
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL
    )
}

/// Every captured field as `(label, value)` pairs
pub fn fields() -> [(&'static str, &'static str); 6] {
    [
        ("Version", PKG_VERSION),
        ("Built", BUILD_TIMESTAMP),
        ("Target", CARGO_TARGET_TRIPLE),
        ("Optimization", CARGO_OPT_LEVEL),
        ("Rustc", RUSTC_SEMVER),
        ("Channel", RUSTC_CHANNEL),
    ]
}

/// Multi-line summary of [`fields`]
pub fn detailed_info() -> String {
    fields()
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
