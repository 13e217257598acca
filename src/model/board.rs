use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::project::Project;
use super::task::Task;

/// The complete state of a board: every task (active and archived) and
/// every project, keyed by id in display order.
///
/// Cloning a `BoardState` produces a fully independent copy, which is what
/// the history stores as a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
    #[serde(default)]
    pub projects: IndexMap<String, Project>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }
}
