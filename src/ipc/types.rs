use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Config;
use crate::db;
use crate::session::Session;
use crate::store::{CachedStore, SqliteStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub session: Option<Session>,
    pub store: Option<CachedStore<SqliteStore>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
            session: None,
            store: None,
        }
    }

    /// The store follows the workspace and the session's table-set; both must be set.
    pub fn reopen_store(&mut self) -> anyhow::Result<()> {
        self.store = None;
        if let (Some(workspace), Some(session)) = (&self.workspace, &self.session) {
            let conn = db::open_db(workspace, session.environment)?;
            self.store = Some(CachedStore::new(
                SqliteStore::new(conn),
                self.config.cache_ttl,
            ));
        }
        Ok(())
    }
}

/// What every roster, attendance and report operation runs against.
pub struct Context<'a> {
    pub session: &'a Session,
    pub store: &'a mut CachedStore<SqliteStore>,
}
