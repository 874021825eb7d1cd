//! State file handling: the whole store lives in `~/.restock/state.json`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use restock_engine::StoreState;

pub fn restock_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".restock"))
}

pub fn default_state_path() -> Result<PathBuf> {
    Ok(restock_home()?.join("state.json"))
}

/// Missing file means a fresh, empty store.
pub fn read_state(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?)
}

pub fn write_state(path: &Path, state: &StoreState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
