pub mod config;
pub mod replay;

pub use config::CliConfig;
pub use replay::{load_script, run_replay, ReplayScript, ReplayStep, StepOutput};
