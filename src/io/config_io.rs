use std::fs;
use std::path::Path;

use crate::io::board_io::BoardIoError;
use crate::model::config::BoardConfig;

/// Config file that marks a board directory
pub const CONFIG_FILE: &str = "taskboard.toml";

/// Starter config written by `tb init`
pub const CONFIG_TEMPLATE: &str = r##"# taskboard configuration

[history]
# Number of board snapshots kept for undo
max_depth = 50

[view]
# title, status, priority, due_date, created_at, estimated_time, project
sort_key = "created_at"
# asc or desc
sort_direction = "asc"
show_archived = false

[storage]
board_file = "board.json"
"##;

/// Read `taskboard.toml` from the board directory. A missing file yields
/// the defaults; a malformed one is an error.
pub fn read_config(dir: &Path) -> Result<BoardConfig, BoardIoError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(BoardConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| BoardIoError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<BoardConfig, BoardIoError> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::query::{SortDirection, SortKey};
    use tempfile::TempDir;

    #[test]
    fn template_parses_to_defaults() {
        assert_eq!(parse_config(CONFIG_TEMPLATE).unwrap(), BoardConfig::default());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.history.max_depth, 50);
        assert_eq!(config.storage.board_file, "board.json");
    }

    #[test]
    fn partial_sections_fill_in() {
        let config = parse_config("[view]\nsort_key = \"priority\"\nsort_direction = \"desc\"\n").unwrap();
        assert_eq!(config.view.sort_key, SortKey::Priority);
        assert_eq!(config.view.sort_direction, SortDirection::Desc);
        assert!(!config.view.show_archived);
        assert_eq!(config.history.max_depth, 50);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            parse_config("[history]\nmax_depth = \"lots\"\n"),
            Err(BoardIoError::ConfigParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_config(tmp.path()).unwrap(), BoardConfig::default());

        fs::write(tmp.path().join(CONFIG_FILE), "[history]\nmax_depth = 7\n").unwrap();
        assert_eq!(read_config(tmp.path()).unwrap().history.max_depth, 7);
    }
}
