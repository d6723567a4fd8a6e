use crate::db;
use anyhow::Context;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The selected workspace and its open database.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (creating if needed) the workspace database and makes it current.
    /// On failure the previous workspace stays selected.
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let conn = db::open_db(&path)
            .with_context(|| format!("failed to open workspace {}", path.to_string_lossy()))?;
        tracing::info!(workspace = %path.display(), "workspace opened");
        self.db = Some(conn);
        self.workspace = Some(path);
        Ok(())
    }
}
