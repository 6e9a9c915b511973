use std::sync::Arc;

use storage::Storage;
use storage::config::StoreConfig;
use tracing::info;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::ServicesError;
use crate::ranking_service::RankingService;
use crate::sessions::TestSessionService;

/// Assembles the app-facing services over one store.
#[derive(Clone)]
pub struct AppServices {
    sessions: Arc<TestSessionService>,
    rankings: Arc<RankingService>,
    catalog: Arc<CatalogService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, seeding defaults into
    /// collections that do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `ServicesError` if the database file cannot be prepared, the
    /// pool cannot be opened, or seeding fails.
    pub async fn new_sqlite(config: &StoreConfig, clock: Clock) -> Result<Self, ServicesError> {
        config.prepare_file()?;
        let storage = Storage::sqlite(&config.db_url).await?;
        info!(db = %config.db_url, "opened quiz store");
        Self::from_storage(storage, clock).await
    }

    /// Build services over an already opened store, seeding defaults into
    /// collections that do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `ServicesError::Storage` if seeding fails.
    pub async fn from_storage(storage: Storage, clock: Clock) -> Result<Self, ServicesError> {
        storage.seed_defaults().await?;

        let sessions = Arc::new(TestSessionService::new(
            clock,
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.test_sets),
            Arc::clone(&storage.test_results),
        ));
        let rankings = Arc::new(RankingService::new(
            Arc::clone(&storage.test_sets),
            Arc::clone(&storage.test_results),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.tags),
            Arc::clone(&storage.words),
            Arc::clone(&storage.test_sets),
        ));

        Ok(Self {
            sessions,
            rankings,
            catalog,
        })
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<TestSessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn rankings(&self) -> Arc<RankingService> {
        Arc::clone(&self.rankings)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }
}
