use async_trait::async_trait;
use contracts::domain::a002_fan_highlight::aggregate::{
    embed_url, FanHighlight, FanHighlightId, FanHighlightPatch,
};
use contracts::enums::PublishStatus;

use crate::domain::entity_service::{validated, EntityService};
use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

#[derive(Debug, Default, Clone, Copy)]
pub struct FanHighlightService;

#[async_trait]
impl EntityService for FanHighlightService {
    type Aggregate = FanHighlight;

    async fn create_document(
        &self,
        ctx: &AppContext,
        form: FormPayload,
    ) -> Result<String, AppError> {
        let src = form.required("src")?;
        let status = form
            .parse_with("status", PublishStatus::from_code)?
            .unwrap_or_default();

        let highlight = FanHighlight::new_for_insert(FanHighlightId::new_v4(), &src, status);
        validated(highlight.validate())?;
        ctx.repository::<FanHighlight>().insert(&highlight).await
    }

    async fn update(&self, ctx: &AppContext, id: &str, form: FormPayload) -> Result<(), AppError> {
        let patch = FanHighlightPatch {
            src: form.text("src").map(|src| embed_url(&src)),
            status: form.parse_with("status", PublishStatus::from_code)?,
        };
        ctx.repository::<FanHighlight>().update_fields(id, &patch).await
    }
}
