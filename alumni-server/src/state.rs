//! Application state

use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::db::{Database, SqliteMemberStore};
use crate::image::{self, ImageIngest};
use crate::registration::Registrar;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Lazily connected database (also checked by `/health`)
    pub db: Database,
    /// Registration pipeline wired to the store and image strategy
    pub registrar: Registrar,
    /// Image strategy, also used directly by `/api/upload`
    pub images: Arc<dyn ImageIngest>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the collaborators from configuration; does not connect to the database.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let db = Database::new(Some(config.database_url.clone()))
            .with_max_connections(config.db_max_connections);
        let images = image::from_config(&config)?;
        let store = Arc::new(SqliteMemberStore::new(db.clone()));

        Ok(Self {
            registrar: Registrar::new(store, images.clone()),
            images,
            db,
            config: Arc::new(config),
        })
    }
}
