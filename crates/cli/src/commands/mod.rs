//! Command handlers for the sift CLI.

pub mod ask;
pub mod clean;
pub mod learn;
pub mod search;
pub mod stats;

pub use ask::AskCommand;
pub use clean::CleanCommand;
pub use learn::LearnCommand;
pub use search::SearchCommand;
pub use stats::StatsCommand;
