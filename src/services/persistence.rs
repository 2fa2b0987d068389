use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{ChainRegistry, Token};
use crate::services::errors::PersistenceError;

/// Writes `value` as pretty-printed JSON, creating parent directories.
/// Key order follows struct field order, so output is deterministic.
pub fn save_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PersistenceError::Write(display.clone(), err.to_string()))?;
    }

    let mut content =
        serde_json::to_string_pretty(value).map_err(|err| PersistenceError::Write(display.clone(), err.to_string()))?;
    content.push('\n');

    fs::write(path, content).map_err(|err| PersistenceError::Write(display, err.to_string()))
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, PersistenceError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|err| PersistenceError::Read(display.clone(), err.to_string()))?;
    serde_json::from_str(&content).map_err(|err| PersistenceError::Parse(display, err.to_string()))
}

pub fn read_json_if_exists<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Option<T>, PersistenceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Writes `<tokens_dir>/<chain name>.json` for every registered chain that has
/// tokens. Returns the written paths.
pub fn save_per_chain(
    tokens_dir: impl AsRef<Path>,
    partition: &BTreeMap<u64, Vec<Token>>,
    chains: &ChainRegistry,
) -> Result<Vec<PathBuf>, PersistenceError> {
    let mut written = Vec::new();

    for (chain_id, tokens) in partition {
        if tokens.is_empty() {
            continue;
        }
        let Some(name) = chains.name(*chain_id) else {
            continue;
        };

        let path = tokens_dir.as_ref().join(format!("{name}.json"));
        save_json(&path, tokens)?;
        written.push(path);
    }

    tracing::info!(files = written.len(), "per-chain token files written");

    Ok(written)
}

/// Scratch directory for per-run intermediate files. Removed when the guard
/// drops, whether the run succeeded or not, unless `keep` is set.
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    pub fn acquire(path: impl Into<PathBuf>, keep: bool) -> Result<Self, PersistenceError> {
        let path = path.into();
        fs::create_dir_all(&path)
            .map_err(|err| PersistenceError::Write(path.display().to_string(), err.to_string()))?;
        Ok(Self { path, keep })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "unable to clean scratch dir");
        }
    }
}
