//! Application state shared across the client.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::db::StoreCache;
use crate::remote::{BlobStore, DocumentStore, MemoryBlobStore, MemoryStore};
use crate::search::{RemoteCatalog, SearchManager};
use crate::services::{
    AccountService, AdminService, AuthProvider, MemoryAuthProvider, NotificationService,
    ProfileService, StoreService,
};

/// Injected backends plus the long-lived search manager.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    auth: Arc<dyn AuthProvider>,
    store_cache: StoreCache,
    search: SearchManager,
}

impl AppState {
    /// Create application state over the given backends.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let store_cache = StoreCache::new(config.cache_ttl);
        let search = SearchManager::new(
            Arc::new(RemoteCatalog::new(Arc::clone(&store))),
            &config.search,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                blobs,
                auth,
                store_cache,
                search,
            }),
        }
    }

    /// State backed entirely by in-memory implementations.
    #[must_use]
    pub fn in_memory(config: ClientConfig) -> Self {
        let blobs = MemoryBlobStore::new(config.storage_base_url.clone());
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(blobs),
            Arc::new(MemoryAuthProvider::new()),
        )
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn search(&self) -> &SearchManager {
        &self.inner.search
    }

    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.inner.auth.as_ref(), self.store())
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(self.store(), self.inner.blobs.as_ref())
    }

    #[must_use]
    pub fn stores(&self) -> StoreService<'_> {
        StoreService::new(
            self.store(),
            &self.inner.store_cache,
            self.inner.config.store_detail_timeout,
        )
    }

    #[must_use]
    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self.store())
    }

    #[must_use]
    pub fn notifications(&self) -> NotificationService<'_> {
        NotificationService::new(self.store())
    }
}
