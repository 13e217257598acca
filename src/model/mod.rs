pub mod board;
pub mod config;
pub mod project;
pub mod task;

pub use board::*;
pub use config::*;
pub use project::*;
pub use task::*;
