use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::config_io::{CONFIG_FILE, read_config};
use crate::model::board::BoardState;
use crate::model::config::BoardConfig;

/// Error type for board file I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardIoError {
    #[error("not a taskboard directory: no taskboard.toml found (run `tb init`)")]
    NotABoard,
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse taskboard.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("corrupt board snapshot {path}: {source}")]
    SnapshotError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// A board directory on disk with its config
#[derive(Debug, Clone)]
pub struct BoardDir {
    pub root: PathBuf,
    pub config: BoardConfig,
}

impl BoardDir {
    pub fn board_path(&self) -> PathBuf {
        self.root.join(&self.config.storage.board_file)
    }

    pub fn load(&self) -> Result<BoardState, BoardIoError> {
        load_board(&self.board_path())
    }

    pub fn save(&self, state: &BoardState) -> Result<(), BoardIoError> {
        save_board(&self.board_path(), state)
    }
}

/// Walk up from `start` looking for a directory holding `taskboard.toml`.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardIoError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardIoError::NotABoard);
        }
    }
}

/// Discover the board directory above `start` and read its config
pub fn open_board(start: &Path) -> Result<BoardDir, BoardIoError> {
    let root = discover_board(start)?;
    let config = read_config(&root)?;
    debug!(root = %root.display(), "opened board directory");
    Ok(BoardDir { root, config })
}

/// Read a board snapshot. A missing file is an empty board.
pub fn load_board(path: &Path) -> Result<BoardState, BoardIoError> {
    if !path.exists() {
        return Ok(BoardState::default());
    }
    let text = fs::read_to_string(path).map_err(|e| BoardIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if text.trim().is_empty() {
        return Ok(BoardState::default());
    }
    serde_json::from_str(&text).map_err(|e| BoardIoError::SnapshotError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a board snapshot as pretty JSON, atomically
pub fn save_board(path: &Path, state: &BoardState) -> Result<(), BoardIoError> {
    let mut json = serde_json::to_string_pretty(state).map_err(|e| BoardIoError::SnapshotError {
        path: path.to_path_buf(),
        source: e,
    })?;
    json.push('\n');
    atomic_write(path, json.as_bytes()).map_err(|e| BoardIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(
        path = %path.display(),
        tasks = state.tasks.len(),
        projects = state.projects.len(),
        "board saved"
    );
    Ok(())
}

/// Read a whole text file (CSV import source)
pub fn read_text(path: &Path) -> Result<String, BoardIoError> {
    fs::read_to_string(path).map_err(|e| BoardIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a whole text file (CSV export target), atomically
pub fn write_text(path: &Path, text: &str) -> Result<(), BoardIoError> {
    atomic_write(path, text.as_bytes()).map_err(|e| BoardIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write to a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use crate::ops::task_ops::add_task;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_board() -> BoardState {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let mut state = BoardState::new();
        add_task(
            &mut state,
            TaskDraft::new("Persist me").with_tags(["io", "json"]),
            now,
        )
        .unwrap();
        state
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        let state = sample_board();
        save_board(&path, &state).unwrap();
        assert_eq!(load_board(&path).unwrap(), state);
    }

    #[test]
    fn missing_or_empty_snapshot_is_empty_board() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        assert_eq!(load_board(&path).unwrap(), BoardState::default());
        fs::write(&path, "  \n").unwrap();
        assert_eq!(load_board(&path).unwrap(), BoardState::default());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_board(&path),
            Err(BoardIoError::SnapshotError { .. })
        ));
    }

    #[test]
    fn discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_board(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn discover_without_config_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_board(tmp.path()),
            Err(BoardIoError::NotABoard)
        ));
    }

    #[test]
    fn open_board_uses_configured_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[storage]\nboard_file = \"data.json\"\n",
        )
        .unwrap();
        let dir = open_board(tmp.path()).unwrap();
        assert_eq!(dir.board_path(), tmp.path().join("data.json"));
        dir.save(&sample_board()).unwrap();
        assert!(tmp.path().join("data.json").exists());
        assert_eq!(dir.load().unwrap().tasks.len(), 1);
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(read_text(&path).unwrap(), "second");
    }
}
