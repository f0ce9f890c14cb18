use crate::{
    datastore::{Datastore, StoreDocument},
    error::{StudentsResult, WriteDatastoreSnafu},
};
use async_trait::async_trait;
use snafu::IntoError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

///keeps the document in-process, nothing survives a restart
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend(Arc<MemoryBackendInner>);

#[derive(Debug, Default)]
struct MemoryBackendInner {
    document: Mutex<StoreDocument>,
    loads: AtomicUsize,
    persists: AtomicUsize,
    failing: AtomicBool,
}

#[cfg(test)]
impl MemoryBackend {
    pub async fn document(&self) -> StoreDocument {
        self.0.document.lock().await.clone()
    }

    pub async fn replace(&self, document: StoreDocument) {
        *self.0.document.lock().await = document;
    }

    pub fn load_count(&self) -> usize {
        self.0.loads.load(Ordering::SeqCst)
    }

    pub fn persist_count(&self) -> usize {
        self.0.persists.load(Ordering::SeqCst)
    }

    ///makes every subsequent persist fail, like a full disk would
    pub fn set_failing(&self, failing: bool) {
        self.0.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Datastore for MemoryBackend {
    async fn load(&self) -> StudentsResult<StoreDocument> {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.document.lock().await.clone())
    }

    async fn persist(&self, document: &StoreDocument) -> StudentsResult<()> {
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(WriteDatastoreSnafu { path: ":memory:" }
                .into_error(std::io::Error::other("memory backend is failing writes")));
        }

        self.0.persists.fetch_add(1, Ordering::SeqCst);
        *self.0.document.lock().await = document.clone();
        Ok(())
    }
}
