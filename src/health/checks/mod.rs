//! Built-in health checks

pub mod build_info;
pub mod config;
pub mod gesture;
pub mod system_info;

pub use build_info::BuildInfoCheck;
pub use config::ConfigCheck;
pub use gesture::GestureCheck;
pub use system_info::SystemInfoCheck;
