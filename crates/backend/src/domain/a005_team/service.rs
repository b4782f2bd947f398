use async_trait::async_trait;
use contracts::domain::a005_team::aggregate::{Team, TeamId, TeamPatch};

use crate::domain::entity_service::{validated, EntityService};
use crate::shared::context::AppContext;
use crate::shared::data::object_storage::unique_object_path;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

#[derive(Debug, Default, Clone, Copy)]
pub struct TeamService;

async fn upload_emblem(
    ctx: &AppContext,
    form: &mut FormPayload,
) -> Result<Option<String>, AppError> {
    let Some(file) = form.take_file("image") else {
        return Ok(None);
    };
    let path = unique_object_path("teams", &file.file_name);
    let url = ctx
        .storage
        .upload(&path, file.bytes, file.content_type.as_deref())
        .await?;
    Ok(Some(url))
}

#[async_trait]
impl EntityService for TeamService {
    type Aggregate = Team;

    async fn create_document(
        &self,
        ctx: &AppContext,
        mut form: FormPayload,
    ) -> Result<String, AppError> {
        let name = form.required("name")?;
        let image_url = upload_emblem(ctx, &mut form).await?.unwrap_or_default();

        let team = Team::new_for_insert(TeamId::new_v4(), name, image_url);
        validated(team.validate())?;
        ctx.repository::<Team>().insert(&team).await
    }

    async fn update(
        &self,
        ctx: &AppContext,
        id: &str,
        mut form: FormPayload,
    ) -> Result<(), AppError> {
        let repository = ctx.repository::<Team>();
        if !repository.exists(id).await? {
            return Err(AppError::not_found("teams", id));
        }
        let patch = TeamPatch {
            name: form.text("name"),
            image_url: upload_emblem(ctx, &mut form).await?,
        };
        repository.update_fields(id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::context::test_support::memory_context;
    use crate::shared::pagination::Navigation;
    use contracts::domain::common::AggregateRoot;

    #[tokio::test]
    async fn test_create_and_delete_refresh_open_listings() {
        let (ctx, _) = memory_context();
        let (_, listing) = ctx.listings.open(Team::collection_spec()).await.unwrap();
        assert!(listing.snapshot().documents.is_empty());

        let id = TeamService
            .create(
                &ctx,
                FormPayload::new()
                    .with_field("name", "Orlando Pirates")
                    .with_file("image", "pirates.svg", b"<svg/>".to_vec()),
            )
            .await
            .unwrap();
        let snapshot = listing.snapshot();
        assert_eq!(snapshot.documents.len(), 1);
        assert_eq!(snapshot.documents[0].id, id);

        TeamService.delete(&ctx, &id).await.unwrap();
        assert!(listing.snapshot().documents.is_empty());
        assert_eq!(listing.load_next().await.unwrap(), Navigation::Skipped(
            contracts::shared::pagination::SkipReason::NoMore
        ));
    }

    #[tokio::test]
    async fn test_all_lists_every_team_by_name() {
        let (ctx, _) = memory_context();
        for name in ["Zebras", "Arrows", "Mighty Eagles"] {
            TeamService
                .create(&ctx, FormPayload::new().with_field("name", name))
                .await
                .unwrap();
        }

        let teams = TeamService.all(&ctx).await.unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Arrows", "Mighty Eagles", "Zebras"]);
    }

    #[tokio::test]
    async fn test_update_keeps_emblem_without_new_upload() {
        let (ctx, root) = memory_context();
        let id = TeamService
            .create(
                &ctx,
                FormPayload::new()
                    .with_field("name", "Tigers")
                    .with_file("image", "tigers.png", vec![7]),
            )
            .await
            .unwrap();
        let before = TeamService.get(&ctx, &id).await.unwrap();
        assert!(before.image_url.starts_with("/media/teams/"));

        TeamService
            .update(&ctx, &id, FormPayload::new().with_field("name", "Young Tigers"))
            .await
            .unwrap();
        let after = TeamService.get(&ctx, &id).await.unwrap();
        assert_eq!(after.name, "Young Tigers");
        assert_eq!(after.image_url, before.image_url);
        let _ = std::fs::remove_dir_all(root);
    }
}
