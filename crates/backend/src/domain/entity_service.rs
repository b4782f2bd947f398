use async_trait::async_trait;
use contracts::domain::common::AggregateRoot;
use contracts::shared::pagination::{CursorPage, CursorQuery};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;
use crate::shared::pagination::CursorPair;

/// Операции над одной коллекцией. Обработчики HTTP обобщены по этому трейту.
#[async_trait]
pub trait EntityService: Default + Send + Sync + 'static {
    type Aggregate: AggregateRoot + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Разобрать форму, загрузить файлы и сохранить запись. Возвращает id.
    async fn create_document(
        &self,
        ctx: &AppContext,
        form: FormPayload,
    ) -> Result<String, AppError>;

    /// Применить непустые поля формы к записи
    async fn update(&self, ctx: &AppContext, id: &str, form: FormPayload) -> Result<(), AppError>;

    async fn create(&self, ctx: &AppContext, form: FormPayload) -> Result<String, AppError> {
        let id = self.create_document(ctx, form).await?;
        ctx.listings
            .refresh_collection(Self::Aggregate::collection_name())
            .await;
        Ok(id)
    }

    async fn get(&self, ctx: &AppContext, id: &str) -> Result<Self::Aggregate, AppError> {
        ctx.repository::<Self::Aggregate>().get(id).await
    }

    async fn delete(&self, ctx: &AppContext, id: &str) -> Result<(), AppError> {
        ctx.repository::<Self::Aggregate>().delete(id).await?;
        ctx.listings
            .refresh_collection(Self::Aggregate::collection_name())
            .await;
        Ok(())
    }

    /// Вся коллекция одним списком (например, команды для формы матча)
    async fn all(&self, ctx: &AppContext) -> Result<Vec<Self::Aggregate>, AppError> {
        ctx.repository::<Self::Aggregate>().all().await
    }

    async fn page(
        &self,
        ctx: &AppContext,
        query: CursorQuery,
    ) -> Result<CursorPage<Self::Aggregate>, AppError> {
        let markers = CursorPair::from_tokens(query.first.as_ref(), query.last.as_ref())?;
        ctx.repository::<Self::Aggregate>()
            .page(query.direction, &markers)
            .await
    }
}

/// Ошибку `validate()` агрегата превращает в `Validation`
pub(crate) fn validated(result: Result<(), String>) -> Result<(), AppError> {
    result.map_err(AppError::Validation)
}
