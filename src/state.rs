use crate::{
    config::{DatastoreLocation, RuntimeConfiguration},
    datastore::{Database, JsonFileBackend, MemoryBackend},
};
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct StudentsState {
    database: Arc<Database>,
}

impl StudentsState {
    pub fn new(config: &RuntimeConfiguration) -> Self {
        let database = match config.datastore() {
            DatastoreLocation::File(path) => {
                let backend = JsonFileBackend::new(path.clone());
                info!(path = ?backend.path(), "Using JSON file datastore");
                Database::new(backend)
            }
            DatastoreLocation::InMemory => {
                warn!("Using in-memory datastore, nothing will be persisted");
                Database::new(MemoryBackend::default())
            }
        };

        Self::with_database(database)
    }

    pub fn with_database(database: Database) -> Self {
        Self {
            database: Arc::new(database),
        }
    }
}

impl Deref for StudentsState {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
