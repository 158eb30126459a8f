pub mod constants;
pub mod filename;
pub mod progress;
pub mod statistics;

pub use constants::*;
pub use progress::ProgressReporter;
