//! CLI command handlers, one per file.

mod normalize;
mod serve;
mod show_config;
mod stage;

pub use normalize::run_normalize;
pub use serve::run_serve;
pub use show_config::run_show_config;
pub use stage::run_stage;
