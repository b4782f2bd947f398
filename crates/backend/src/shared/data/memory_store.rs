use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use contracts::shared::pagination::SortOrder;
use serde_json::{Map, Value};

use super::document_store::{compare_keys, merge_fields, DocumentStore, RangeQuery, StoredDocument};
use crate::shared::error::AppError;

type Collection = BTreeMap<String, Map<String, Value>>;

/// Хранилище документов в памяти процесса (тесты и запуск без базы)
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Collection>>, AppError> {
        self.collections
            .read()
            .map_err(|_| AppError::DataAccess("memory store lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>>, AppError> {
        self.collections
            .write()
            .map_err(|_| AppError::DataAccess("memory store lock poisoned".into()))
    }
}

/// Сравнение позиций `(ключ, id)` по возрастанию
fn position_cmp(key_a: &Value, id_a: &str, key_b: &Value, id_b: &str) -> Ordering {
    compare_keys(key_a, key_b).then_with(|| id_a.cmp(id_b))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn query_range(&self, query: &RangeQuery) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.read()?;
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(&Value, &String, &Map<String, Value>)> = collection
            .iter()
            .filter_map(|(id, fields)| {
                fields
                    .get(&query.sort_field)
                    .filter(|v| !v.is_null())
                    .map(|key| (key, id, fields))
            })
            .collect();

        rows.sort_by(|a, b| {
            let ord = position_cmp(a.0, a.1, b.0, b.1);
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let documents = rows
            .into_iter()
            .filter(|(key, id, _)| match &query.start_after {
                None => true,
                Some(marker) => {
                    let ord = position_cmp(key, id, &marker.key, &marker.id);
                    match query.order {
                        SortOrder::Asc => ord == Ordering::Greater,
                        SortOrder::Desc => ord == Ordering::Less,
                    }
                }
            })
            .take(query.limit)
            .map(|(_, id, fields)| StoredDocument::new(id.clone(), fields.clone()))
            .collect();

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, AppError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| StoredDocument::new(id, fields.clone())))
    }

    async fn insert(&self, collection: &str, document: StoredDocument) -> Result<(), AppError> {
        let mut collections = self.write()?;
        let entries = collections.entry(collection.to_string()).or_default();
        if entries.contains_key(&document.id) {
            return Err(AppError::DataAccess(format!(
                "document {}/{} already exists",
                collection, document.id
            )));
        }
        entries.insert(document.id, document.fields);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, AppError> {
        let mut collections = self.write()?;
        match collections.get_mut(collection).and_then(|c| c.get_mut(id)) {
            Some(fields) => {
                merge_fields(fields, patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let mut collections = self.write()?;
        Ok(collections
            .get_mut(collection)
            .map(|c| c.remove(id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::pagination::CursorMarker;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> StoredDocument {
        StoredDocument::new(id, value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_skips_documents_without_sort_field() {
        let store = MemoryDocumentStore::new();
        store.insert("teams", doc("a", json!({ "name": "Bees" }))).await.unwrap();
        store.insert("teams", doc("b", json!({ "image_url": "" }))).await.unwrap();
        store.insert("teams", doc("c", json!({ "name": "Ants" }))).await.unwrap();

        let docs = store
            .query_range(&RangeQuery {
                collection: "teams".into(),
                sort_field: "name".into(),
                order: SortOrder::Asc,
                limit: 10,
                start_after: None,
            })
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_desc_start_after() {
        let store = MemoryDocumentStore::new();
        for (id, day) in [("n1", "01"), ("n2", "02"), ("n3", "03")] {
            let posted = format!("2024-01-{}T00:00:00.000Z", day);
            store
                .insert("featured_news", doc(id, json!({ "date_posted": posted })))
                .await
                .unwrap();
        }
        let docs = store
            .query_range(&RangeQuery {
                collection: "featured_news".into(),
                sort_field: "date_posted".into(),
                order: SortOrder::Desc,
                limit: 10,
                start_after: Some(CursorMarker::new(json!("2024-01-03T00:00:00.000Z"), "n3")),
            })
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["n2", "n1"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = MemoryDocumentStore::new();
        store.insert("teams", doc("a", json!({ "name": "Bees" }))).await.unwrap();
        let err = store
            .insert("teams", doc("a", json!({ "name": "Wasps" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataAccess(_)));
    }
}
