//! Общий репозиторий агрегатов поверх хранилища документов.
//!
//! Один тип на все коллекции: имя коллекции, поле сортировки и размер
//! страницы берутся из `AggregateRoot`, декодирование записи через serde.

use std::marker::PhantomData;
use std::sync::Arc;

use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::{CursorPage, PageDirection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::shared::data::{DocumentStore, RangeQuery, StoredDocument};
use crate::shared::error::AppError;
use crate::shared::pagination::{CursorPair, PageFetcher};

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    fetcher: PageFetcher,
    _aggregate: PhantomData<fn() -> T>,
}

impl<T> Repository<T>
where
    T: AggregateRoot + Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            fetcher: PageFetcher::new(store.clone()),
            store,
            _aggregate: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<T, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::not_found(T::collection_name(), id))
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, AppError> {
        match self.store.get(T::collection_name(), id).await? {
            Some(document) => Self::decode(document).map(Some),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.store.get(T::collection_name(), id).await?.is_some())
    }

    /// Сохранить новый агрегат, вернуть ключ документа
    pub async fn insert(&self, aggregate: &T) -> Result<String, AppError> {
        let document = Self::encode(aggregate)?;
        let id = document.id.clone();
        self.store.insert(T::collection_name(), document).await?;
        tracing::info!("Created {}/{}", T::collection_name(), id);
        Ok(id)
    }

    /// Слить изменённые поля с документом. Пустой patch только проверяет,
    /// что запись существует.
    pub async fn update_fields<P: Serialize>(&self, id: &str, patch: &P) -> Result<(), AppError> {
        let fields = match serde_json::to_value(patch)? {
            Value::Object(fields) => fields,
            other => {
                return Err(AppError::Validation(format!(
                    "update of {} must be an object, got {}",
                    T::collection_name(),
                    other
                )))
            }
        };

        let found = if fields.is_empty() {
            self.exists(id).await?
        } else {
            self.store
                .update_fields(T::collection_name(), id, fields)
                .await?
        };
        if !found {
            return Err(AppError::not_found(T::collection_name(), id));
        }
        tracing::info!("Updated {}/{}", T::collection_name(), id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete(T::collection_name(), id).await? {
            return Err(AppError::not_found(T::collection_name(), id));
        }
        tracing::info!("Deleted {}/{}", T::collection_name(), id);
        Ok(())
    }

    /// Stateless-страница: маркеры передаёт и хранит клиент
    pub async fn page(
        &self,
        direction: PageDirection,
        markers: &CursorPair,
    ) -> Result<CursorPage<T>, AppError> {
        let spec = T::collection_spec();
        let window = self.fetcher.fetch(&spec, direction, markers).await?;

        let first = window.first_marker().map(|m| m.to_token());
        let last = window.last_marker().map(|m| m.to_token());
        let has_more = match direction {
            PageDirection::Previous if markers.first.is_some() => true,
            _ => window.len() == spec.page_size,
        };
        let items = window
            .into_documents()
            .into_iter()
            .map(Self::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CursorPage {
            items,
            first,
            last,
            has_more,
        })
    }

    /// Вся коллекция в порядке листинга, без разбивки на страницы
    pub async fn all(&self) -> Result<Vec<T>, AppError> {
        let spec = T::collection_spec();
        let query = RangeQuery {
            collection: spec.collection.to_string(),
            sort_field: spec.sort_field.to_string(),
            order: spec.sort_order,
            limit: usize::MAX,
            start_after: None,
        };
        self.store
            .query_range(&query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Поля агрегата без `id`: id хранится ключом документа
    pub fn encode(aggregate: &T) -> Result<StoredDocument, AppError> {
        let mut fields = match serde_json::to_value(aggregate)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.remove("id");
        Ok(StoredDocument::new(aggregate.id().as_string(), fields))
    }

    pub fn decode(document: StoredDocument) -> Result<T, AppError> {
        let id = document.id.clone();
        serde_json::from_value(document.into_json()).map_err(|e| {
            AppError::DataAccess(format!(
                "cannot decode {}/{}: {}",
                T::collection_name(),
                id,
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::MemoryDocumentStore;
    use contracts::domain::a005_team::aggregate::{Team, TeamId, TeamPatch};

    fn repository() -> Repository<Team> {
        Repository::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[test]
    fn test_encode_moves_id_to_key() {
        let team = Team::new_for_insert(TeamId::new_v4(), "Stars".into(), String::new());
        let document = Repository::<Team>::encode(&team).unwrap();
        assert_eq!(document.id, team.id.to_string());
        assert!(!document.fields.contains_key("id"));
        assert_eq!(document.field("name"), Some(&Value::String("Stars".into())));

        let decoded = Repository::<Team>::decode(document).unwrap();
        assert_eq!(decoded.id, team.id);
    }

    #[tokio::test]
    async fn test_crud_errors() {
        let repo = repository();
        let team = Team::new_for_insert(TeamId::new_v4(), "Stars".into(), String::new());
        let id = repo.insert(&team).await.unwrap();

        repo.update_fields(
            &id,
            &TeamPatch {
                name: Some("African Stars".into()),
                image_url: None,
            },
        )
        .await
        .unwrap();
        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.name, "African Stars");

        repo.update_fields(&id, &TeamPatch::default()).await.unwrap();

        let missing = TeamId::new_v4().to_string();
        assert!(matches!(
            repo.update_fields(&missing, &TeamPatch::default()).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(repo.get(&missing).await, Err(AppError::NotFound { .. })));

        repo.delete(&id).await.unwrap();
        assert!(matches!(repo.delete(&id).await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stateless_pages() {
        let repo = repository();
        for n in 0..12 {
            let team =
                Team::new_for_insert(TeamId::new_v4(), format!("Team {:02}", n), String::new());
            repo.insert(&team).await.unwrap();
        }

        let first = repo.page(PageDirection::Initial, &CursorPair::default()).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].name, "Team 00");
        assert!(first.has_more);

        let markers = CursorPair::from_tokens(first.first.as_ref(), first.last.as_ref()).unwrap();
        let second = repo.page(PageDirection::Next, &markers).await.unwrap();
        let names: Vec<_> = second.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Team 10", "Team 11"]);
        assert!(!second.has_more);

        let markers = CursorPair::from_tokens(second.first.as_ref(), second.last.as_ref()).unwrap();
        let back = repo.page(PageDirection::Previous, &markers).await.unwrap();
        assert_eq!(back.items.len(), 10);
        assert_eq!(back.items[0].name, "Team 00");
        assert!(back.has_more);
    }

    #[tokio::test]
    async fn test_all_returns_whole_collection_in_listing_order() {
        let repo = repository();
        for n in (0..13).rev() {
            let team =
                Team::new_for_insert(TeamId::new_v4(), format!("Team {:02}", n), String::new());
            repo.insert(&team).await.unwrap();
        }

        let teams = repo.all().await.unwrap();
        assert_eq!(teams.len(), 13);
        assert_eq!(teams[0].name, "Team 00");
        assert_eq!(teams[12].name, "Team 12");
    }

    #[test]
    fn test_cursor_with_object_key_is_rejected_before_query() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine as _;
        use contracts::shared::pagination::CursorToken;

        let token = CursorToken(URL_SAFE_NO_PAD.encode("[{\"a\":1},\"x\"]"));
        let err = CursorPair::from_tokens(None, Some(&token)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_undecodable_document_is_data_access_error() {
        let store = Arc::new(MemoryDocumentStore::new());
        let broken = serde_json::json!({ "name": 42 });
        store
            .insert("teams", StoredDocument::new("bad", broken.as_object().cloned().unwrap()))
            .await
            .unwrap();
        let repo: Repository<Team> = Repository::new(store);
        assert!(matches!(repo.get("bad").await, Err(AppError::DataAccess(_))));
    }
}
