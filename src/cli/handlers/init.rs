use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BoardIoError};
use crate::io::config_io::{self, CONFIG_FILE, CONFIG_TEMPLATE};
use crate::model::board::BoardState;

/// Render the starter config, with the history depth overridden if given
fn render_config(history: Option<usize>) -> String {
    match history {
        Some(depth) => CONFIG_TEMPLATE.replace("max_depth = 50", &format!("max_depth = {}", depth)),
        None => CONFIG_TEMPLATE.to_string(),
    }
}

/// Write `taskboard.toml` and an empty board into `dir`
pub fn init_board(dir: &Path, args: &InitArgs) -> Result<(), BoardIoError> {
    fs::create_dir_all(dir)?;
    let config_path = dir.join(CONFIG_FILE);
    fs::write(&config_path, render_config(args.history)).map_err(|e| {
        BoardIoError::WriteError {
            path: config_path,
            source: e,
        }
    })?;

    let config = config_io::read_config(dir)?;
    let board_path = dir.join(&config.storage.board_file);
    if !board_path.exists() {
        board_io::save_board(&board_path, &BoardState::default())?;
    }
    Ok(())
}

pub fn cmd_init(dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if dir.join(CONFIG_FILE).exists() && !args.force {
        return Err(format!(
            "board already exists in {} (use --force to rewrite the config)",
            dir.display()
        )
        .into());
    }

    // Nested boards are allowed, but say so
    if let Some(parent) = dir.parent()
        && let Ok(outer) = board_io::discover_board(parent)
    {
        eprintln!("note: enclosing board found at {}", outer.display());
    }

    init_board(dir, &args)?;
    println!("Initialized taskboard in {}", dir.display());
    Ok(())
}
