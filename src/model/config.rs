use serde::{Deserialize, Serialize};

use crate::ops::query::{SortConfig, SortDirection, SortKey};

/// Configuration from taskboard.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept on the undo timeline
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_sort_key")]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
    /// List archived tasks instead of active ones by default
    #[serde(default)]
    pub show_archived: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            sort_key: default_sort_key(),
            sort_direction: SortDirection::default(),
            show_archived: false,
        }
    }
}

impl ViewConfig {
    pub fn sort_config(&self) -> SortConfig {
        SortConfig {
            key: self.sort_key,
            direction: self.sort_direction,
        }
    }
}

fn default_sort_key() -> SortKey {
    SortKey::CreatedAt
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file, relative to the data directory
    #[serde(default = "default_board_file")]
    pub board_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            board_file: default_board_file(),
        }
    }
}

fn default_board_file() -> String {
    "board.json".to_string()
}
