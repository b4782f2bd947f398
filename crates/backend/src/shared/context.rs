use std::sync::Arc;

use contracts::domain::common::AggregateRoot;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::data::{DocumentStore, ObjectStorage};
use crate::shared::pagination::{ListingConfig, ListingRegistry, PageFetcher};
use crate::shared::repository::Repository;

/// Общее состояние обработчиков: хранилища и открытые листинги
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub listings: Arc<ListingRegistry>,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        listing_config: ListingConfig,
    ) -> Self {
        let listings = ListingRegistry::new(PageFetcher::new(store.clone()), listing_config);
        Self {
            store,
            storage,
            listings: Arc::new(listings),
        }
    }

    pub fn repository<T>(&self) -> Repository<T>
    where
        T: AggregateRoot + Serialize + DeserializeOwned,
    {
        Repository::new(self.store.clone())
    }
}
