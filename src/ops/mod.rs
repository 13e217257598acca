pub mod command;
pub mod history;
pub mod import;
pub mod project_ops;
pub mod query;
pub mod stats;
pub mod task_ops;
