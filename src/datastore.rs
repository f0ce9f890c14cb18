use crate::{data::student::Student, error::StudentsResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tokio::sync::Mutex;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

///everything that gets persisted, as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub students: Vec<Student>,
}

///somewhere a [`StoreDocument`] can be loaded from and flushed to
#[async_trait]
pub trait Datastore: Debug + Send + Sync {
    async fn load(&self) -> StudentsResult<StoreDocument>;
    async fn persist(&self, document: &StoreDocument) -> StudentsResult<()>;
}

/// In-memory view of a [`Datastore`].
///
/// The cached document is only trusted after [`Database::read`], and only reaches the backend
/// through [`Database::write`] or [`Database::update`]. All three take the same lock, so
/// read-modify-write cycles from this process never interleave.
#[derive(Debug)]
pub struct Database {
    backend: Box<dyn Datastore>,
    cache: Mutex<Option<StoreDocument>>,
}

impl Database {
    pub fn new(backend: impl Datastore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: Mutex::new(None),
        }
    }

    ///reloads from the backend and returns a copy of what was loaded
    pub async fn read(&self) -> StudentsResult<StoreDocument> {
        let mut cache = self.cache.lock().await;
        let document = self.backend.load().await?;
        *cache = Some(document.clone());
        Ok(document)
    }

    //handlers always reload through `read`/`update`; this and `write` skip the backend trip
    ///the cached document, loading it if nothing has been loaded yet
    #[allow(dead_code)]
    pub async fn snapshot(&self) -> StudentsResult<StoreDocument> {
        let mut cache = self.cache.lock().await;
        if let Some(document) = cache.as_ref() {
            return Ok(document.clone());
        }

        let document = self.backend.load().await?;
        *cache = Some(document.clone());
        Ok(document)
    }

    ///flushes the cached document as-is
    #[allow(dead_code)]
    pub async fn write(&self) -> StudentsResult<()> {
        let cache = self.cache.lock().await;
        match cache.as_ref() {
            Some(document) => self.backend.persist(document).await,
            None => Ok(()),
        }
    }

    /// Reloads, applies `mutator` to a working copy, then persists it.
    ///
    /// Returning `None` from `mutator` means nothing changed: the backend isn't written to and
    /// `Ok(None)` comes back. The cache only takes the working copy once the write succeeded.
    pub async fn update<R>(
        &self,
        mutator: impl FnOnce(&mut StoreDocument) -> Option<R>,
    ) -> StudentsResult<Option<R>> {
        let mut cache = self.cache.lock().await;
        let mut working = self.backend.load().await?;

        let Some(output) = mutator(&mut working) else {
            *cache = Some(working);
            return Ok(None);
        };

        self.backend.persist(&working).await?;
        *cache = Some(working);
        Ok(Some(output))
    }
}
