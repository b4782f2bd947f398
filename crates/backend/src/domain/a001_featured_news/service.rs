use async_trait::async_trait;
use contracts::domain::a001_featured_news::aggregate::{
    FeaturedNews, FeaturedNewsId, FeaturedNewsPatch,
};
use contracts::domain::common::AggregateRoot;
use contracts::enums::PublishStatus;

use crate::domain::entity_service::{validated, EntityService};
use crate::shared::context::AppContext;
use crate::shared::data::object_storage::unique_object_path;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

#[derive(Debug, Default, Clone, Copy)]
pub struct FeaturedNewsService;

/// Загрузить картинку из поля `picture`, вернуть её URL
async fn upload_picture(
    ctx: &AppContext,
    form: &mut FormPayload,
) -> Result<Option<String>, AppError> {
    let Some(file) = form.take_file("picture") else {
        return Ok(None);
    };
    let path = unique_object_path("news", &file.file_name);
    let url = ctx
        .storage
        .upload(&path, file.bytes, file.content_type.as_deref())
        .await?;
    Ok(Some(url))
}

#[async_trait]
impl EntityService for FeaturedNewsService {
    type Aggregate = FeaturedNews;

    async fn create_document(
        &self,
        ctx: &AppContext,
        mut form: FormPayload,
    ) -> Result<String, AppError> {
        let title = form.required("title")?;
        let description = form.required("description")?;
        let status = form
            .parse_with("status", PublishStatus::from_code)?
            .unwrap_or_default();
        let picture = upload_picture(ctx, &mut form).await?.unwrap_or_default();

        let news = FeaturedNews::new_for_insert(
            FeaturedNewsId::new_v4(),
            title,
            description,
            picture,
            status,
        );
        validated(news.validate())?;
        ctx.repository::<FeaturedNews>().insert(&news).await
    }

    async fn update(
        &self,
        ctx: &AppContext,
        id: &str,
        mut form: FormPayload,
    ) -> Result<(), AppError> {
        let repository = ctx.repository::<FeaturedNews>();
        if !repository.exists(id).await? {
            return Err(AppError::not_found(FeaturedNews::collection_name(), id));
        }

        let patch = FeaturedNewsPatch {
            title: form.text("title"),
            description: form.text("description"),
            status: form.parse_with("status", PublishStatus::from_code)?,
            picture: upload_picture(ctx, &mut form).await?,
        };
        repository.update_fields(id, &patch).await
    }
}
