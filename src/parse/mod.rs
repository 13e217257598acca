pub mod error;
pub mod fields;
pub mod project_parser;
pub mod project_serializer;
pub mod task_parser;
pub mod task_serializer;

pub use error::{CsvError, ImportRowError};
pub use project_parser::{ParsedProjects, parse_projects};
pub use project_serializer::{PROJECT_COLUMNS, serialize_projects};
pub use task_parser::{ParsedTasks, parse_tasks};
pub use task_serializer::{TASK_COLUMNS, serialize_tasks};
