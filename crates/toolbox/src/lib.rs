pub mod error;
pub mod general;
pub mod iteration;
pub mod nested;
pub mod queue;
pub mod time;

pub use error::{Result, ToolboxError};
pub use queue::IterableQueue;
pub use time::{TimeTracker, Timer};
