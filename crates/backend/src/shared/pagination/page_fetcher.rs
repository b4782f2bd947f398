use std::sync::Arc;

use contracts::shared::pagination::{CollectionSpec, PageDirection};

use super::{CursorMarker, CursorPair};
use crate::shared::data::{DocumentStore, RangeQuery, StoredDocument};
use crate::shared::error::AppError;

/// Запись окна вместе с её маркером
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub marker: CursorMarker,
    pub document: StoredDocument,
}

/// Окно страницы в порядке отображения
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWindow {
    entries: Vec<PageEntry>,
}

impl PageWindow {
    pub fn new(entries: Vec<PageEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_marker(&self) -> Option<&CursorMarker> {
        self.entries.first().map(|e| &e.marker)
    }

    pub fn last_marker(&self) -> Option<&CursorMarker> {
        self.entries.last().map(|e| &e.marker)
    }

    pub fn documents(&self) -> impl Iterator<Item = &StoredDocument> {
        self.entries.iter().map(|e| &e.document)
    }

    pub fn into_documents(self) -> Vec<StoredDocument> {
        self.entries.into_iter().map(|e| e.document).collect()
    }
}

/// Одна ограниченная упорядоченная выборка на вызов. Cursor store не трогает.
#[derive(Clone)]
pub struct PageFetcher {
    store: Arc<dyn DocumentStore>,
}

impl PageFetcher {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn fetch(
        &self,
        spec: &CollectionSpec,
        direction: PageDirection,
        markers: &CursorPair,
    ) -> Result<PageWindow, AppError> {
        if spec.collection.is_empty() || spec.sort_field.is_empty() || spec.page_size == 0 {
            return Err(AppError::DataAccess(format!(
                "malformed query: collection '{}', sort field '{}', page size {}",
                spec.collection, spec.sort_field, spec.page_size
            )));
        }

        // Без маркера next/previous выполняются как initial
        let (order, start_after, reversed) = match (direction, &markers.last, &markers.first) {
            (PageDirection::Next, Some(last), _) => (spec.sort_order, Some(last.clone()), false),
            (PageDirection::Previous, _, Some(first)) => {
                (spec.sort_order.reversed(), Some(first.clone()), true)
            }
            _ => (spec.sort_order, None, false),
        };

        let query = RangeQuery {
            collection: spec.collection.to_string(),
            sort_field: spec.sort_field.to_string(),
            order,
            limit: spec.page_size,
            start_after,
        };
        tracing::debug!(
            "Fetching {} page of {} (start_after: {:?})",
            format!("{:?}", direction).to_lowercase(),
            spec.collection,
            query.start_after
        );

        let documents = self.store.query_range(&query).await?;
        let mut entries: Vec<PageEntry> = documents
            .into_iter()
            .filter_map(|document| {
                CursorMarker::of(&document, spec.sort_field)
                    .map(|marker| PageEntry { marker, document })
            })
            .collect();
        if reversed {
            entries.reverse();
        }

        Ok(PageWindow::new(entries))
    }
}
