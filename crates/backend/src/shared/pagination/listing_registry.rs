use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use contracts::shared::pagination::CollectionSpec;
use uuid::Uuid;

use super::{PageController, PageFetcher};
use crate::shared::error::AppError;

/// Параметры листингов из секции `[listing]` конфигурации
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    pub fetch_timeout: Duration,
    pub idle_ttl: Duration,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            idle_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Открытые на сервере листинги, по одному контроллеру на экземпляр
pub struct ListingRegistry {
    fetcher: PageFetcher,
    config: ListingConfig,
    listings: RwLock<HashMap<Uuid, Arc<PageController>>>,
}

impl ListingRegistry {
    pub fn new(fetcher: PageFetcher, config: ListingConfig) -> Self {
        Self {
            fetcher,
            config,
            listings: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Arc<PageController>>> {
        self.listings.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Arc<PageController>>> {
        self.listings.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Создать листинг и выполнить начальную загрузку. Листинг
    /// регистрируется только если загрузка прошла.
    pub async fn open(
        &self,
        spec: CollectionSpec,
    ) -> Result<(Uuid, Arc<PageController>), AppError> {
        self.evict_idle();

        let controller = Arc::new(PageController::new(
            spec,
            self.fetcher.clone(),
            self.config.fetch_timeout,
        ));
        controller.load_initial().await?;

        let id = Uuid::new_v4();
        self.write().insert(id, controller.clone());
        tracing::info!("Opened listing {} on {}", id, spec.collection);
        Ok((id, controller))
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<PageController>> {
        self.read().get(id).cloned()
    }

    pub fn close(&self, id: &Uuid) -> bool {
        match self.write().remove(id) {
            Some(controller) => {
                controller.dispose();
                tracing::info!("Closed listing {}", id);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Перезагрузить все листинги коллекции после создания или удаления записи
    pub async fn refresh_collection(&self, collection: &str) {
        let affected: Vec<(Uuid, Arc<PageController>)> = self
            .read()
            .iter()
            .filter(|(_, c)| c.spec().collection == collection)
            .map(|(id, c)| (*id, c.clone()))
            .collect();

        for (id, controller) in affected {
            if let Err(e) = controller.on_external_mutation().await {
                tracing::warn!("Failed to refresh listing {} on {}: {}", id, collection, e);
            }
        }
    }

    fn evict_idle(&self) {
        let ttl = self.config.idle_ttl;
        let mut listings = self.write();
        listings.retain(|id, controller| {
            let keep = controller.idle_for() < ttl;
            if !keep {
                controller.dispose();
                tracing::info!("Evicted idle listing {}", id);
            }
            keep
        });
    }
}
