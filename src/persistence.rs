pub mod json_task_driven_ports;
pub mod json_task_list_driven_ports;
pub mod json_user_driven_ports;

use crate::external_connections;
use crate::external_connections::StoreHandle;
use anyhow::Context;
use json_task_driven_ports::TaskRow;
use json_task_list_driven_ports::TaskListRow;
use json_user_driven_ports::UserRow;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// The full contents of the task store. Every read loads the whole document and every
/// write replaces it.
#[derive(Serialize, Deserialize, Default, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreDocument {
    pub users: Vec<UserRow>,
    pub task_lists: Vec<TaskListRow>,
    pub tasks: Vec<TaskRow>,
}

/// A JSON document on disk guarded by a single-writer lock
struct JsonFileStore {
    path: PathBuf,
    writer_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    async fn lock(&self) -> OwnedMutexGuard<()> {
        self.writer_lock.clone().lock_owned().await
    }

    async fn load(&self) -> Result<StoreDocument, anyhow::Error> {
        let raw_document = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No store file at {}, starting empty", self.path.display());
                return Ok(StoreDocument::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading store file {}", self.path.display()));
            }
        };

        if raw_document.iter().all(u8::is_ascii_whitespace) {
            return Ok(StoreDocument::default());
        }

        serde_json::from_slice(&raw_document)
            .with_context(|| format!("parsing store file {}", self.path.display()))
    }

    /// Writes to a sibling file first and renames it into place so readers never observe a
    /// partially written document
    async fn write(&self, document: &StoreDocument) -> Result<(), anyhow::Error> {
        let serialized = serde_json::to_vec_pretty(document).context("serializing store")?;
        let temp_path = sibling_temp_path(&self.path);

        tokio::fs::write(&temp_path, serialized)
            .await
            .with_context(|| format!("writing temporary store file {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("replacing store file {}", self.path.display()))?;

        Ok(())
    }
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "store.json".into());
    file_name.push(".tmp");

    path.with_file_name(file_name)
}

/// Owns the connection to the task store.
/// Allows business logic to be agnostic of where data lives so driven adapters can easily
/// be swapped out for other implementations
#[derive(Clone)]
pub struct ExternalConnectivity {
    store: Arc<JsonFileStore>,
}

impl ExternalConnectivity {
    /// Connects to the JSON store at the given path. The file doesn't need to exist yet.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        ExternalConnectivity {
            store: Arc::new(JsonFileStore {
                path: store_path.into(),
                writer_lock: Arc::new(Mutex::new(())),
            }),
        }
    }
}

/// A handle from ExternalConnectivity holding the writer lock for as long as it lives.
/// Each save writes the document straight back to disk.
pub struct FileStoreHandle {
    _writer_guard: OwnedMutexGuard<()>,
    store: Arc<JsonFileStore>,
    document: StoreDocument,
}

impl StoreHandle for FileStoreHandle {
    fn document(&mut self) -> &mut StoreDocument {
        &mut self.document
    }

    async fn save(&mut self) -> Result<(), anyhow::Error> {
        self.store.write(&self.document).await
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type Handle<'cxn> = FileStoreHandle;

    async fn store_cxn(&mut self) -> Result<Self::Handle<'_>, anyhow::Error> {
        let writer_guard = self.store.lock().await;
        let document = self.store.load().await?;

        Ok(FileStoreHandle {
            _writer_guard: writer_guard,
            store: self.store.clone(),
            document,
        })
    }
}

impl external_connections::Transactable for ExternalConnectivity {
    type Handle = ExternalConnectionsInTransaction;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error> {
        let writer_guard = self.store.lock().await;
        let document = self
            .store
            .load()
            .await
            .context("Loading store for transaction")?;

        Ok(ExternalConnectionsInTransaction {
            _writer_guard: writer_guard,
            store: self.store.clone(),
            document,
            dirty: false,
        })
    }
}

/// A variant of ExternalConnectivity which holds the writer lock and a private copy of the
/// document. Saves only touch the copy; [external_connections::TransactionHandle::commit]
/// writes it out. Dropping the transaction discards the copy.
pub struct ExternalConnectionsInTransaction {
    _writer_guard: OwnedMutexGuard<()>,
    store: Arc<JsonFileStore>,
    document: StoreDocument,
    dirty: bool,
}

/// A handle from ExternalConnectionsInTransaction borrowing the transaction's document
pub struct TransactionStoreHandle<'tx> {
    document: &'tx mut StoreDocument,
    dirty: &'tx mut bool,
}

impl StoreHandle for TransactionStoreHandle<'_> {
    fn document(&mut self) -> &mut StoreDocument {
        &mut *self.document
    }

    async fn save(&mut self) -> Result<(), anyhow::Error> {
        *self.dirty = true;
        Ok(())
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectionsInTransaction {
    type Handle<'tx_borrow>
        = TransactionStoreHandle<'tx_borrow>
    where
        Self: 'tx_borrow;

    async fn store_cxn(&mut self) -> Result<TransactionStoreHandle<'_>, anyhow::Error> {
        Ok(TransactionStoreHandle {
            document: &mut self.document,
            dirty: &mut self.dirty,
        })
    }
}

impl external_connections::TransactionHandle for ExternalConnectionsInTransaction {
    async fn commit(self) -> Result<(), anyhow::Error> {
        if !self.dirty {
            return Ok(());
        }

        self.store
            .write(&self.document)
            .await
            .context("Committing store transaction")
    }
}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use tempfile::TempDir;

    /// Connectivity backed by a store file inside a fresh temporary directory. Keep the
    /// directory alive for as long as the store is in use.
    pub fn temp_store() -> (TempDir, ExternalConnectivity) {
        let dir = tempfile::tempdir().expect("could not create temp dir");
        let ext_cxn = ExternalConnectivity::new(dir.path().join("db.json"));

        (dir, ext_cxn)
    }
}
