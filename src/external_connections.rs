use crate::persistence::StoreDocument;

/// A borrowed handle onto the task store's document. Driven adapters read and mutate the
/// document through [StoreHandle::document] and call [StoreHandle::save] once they're
/// done mutating it.
pub trait StoreHandle: Send {
    /// Access the loaded document
    fn document(&mut self) -> &mut StoreDocument;

    /// Persist any changes made to the document. Outside of a transaction this writes the
    /// whole document back to storage immediately; inside a transaction the write is
    /// deferred to [TransactionHandle::commit].
    async fn save(&mut self) -> Result<(), anyhow::Error>;
}

/// Owns the clients for connecting to external systems. Lets business logic stay agnostic
/// of where data lives so driven adapters can be swapped for other implementations.
pub trait ExternalConnectivity: Send {
    type Handle<'cxn>: StoreHandle
    where
        Self: 'cxn;

    async fn store_cxn(&mut self) -> Result<Self::Handle<'_>, anyhow::Error>;
}

/// An [ExternalConnectivity] which can start a transaction. Every store handle taken from
/// the transaction sees the same document, and nothing is written until commit.
pub trait Transactable {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// An [ExternalConnectivity] in the middle of a transaction. Dropping it without calling
/// [TransactionHandle::commit] discards every change made through it.
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}

impl<T> TransactableExternalConnectivity for T where T: ExternalConnectivity + Transactable {}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stand-in connectivity for tests where driven ports are faked and never touch the
    /// document. Counts how many transactions were committed through it.
    #[derive(Clone, Default)]
    pub struct FakeExternalConnectivity {
        document: StoreDocument,
        commits: Arc<AtomicUsize>,
    }

    impl FakeExternalConnectivity {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn committed_transactions(&self) -> usize {
            self.commits.load(Ordering::SeqCst)
        }
    }

    pub struct FakeStoreHandle<'doc> {
        document: &'doc mut StoreDocument,
    }

    impl StoreHandle for FakeStoreHandle<'_> {
        fn document(&mut self) -> &mut StoreDocument {
            &mut *self.document
        }

        async fn save(&mut self) -> Result<(), anyhow::Error> {
            Ok(())
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type Handle<'cxn> = FakeStoreHandle<'cxn>;

        async fn store_cxn(&mut self) -> Result<Self::Handle<'_>, anyhow::Error> {
            Ok(FakeStoreHandle {
                document: &mut self.document,
            })
        }
    }

    impl Transactable for FakeExternalConnectivity {
        type Handle = FakeExternalConnectivity;

        async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error> {
            Ok(self.clone())
        }
    }

    impl TransactionHandle for FakeExternalConnectivity {
        async fn commit(self) -> Result<(), anyhow::Error> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
