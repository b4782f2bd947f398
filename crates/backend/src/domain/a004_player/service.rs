use async_trait::async_trait;
use contracts::domain::a004_player::aggregate::{Player, PlayerId, PlayerPatch};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::enums::{PlayerPosition, PreferredFoot, PublishStatus};

use crate::domain::entity_service::{validated, EntityService};
use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerService;

/// Фото игрока лежат по фиксированным путям: новая загрузка заменяет старую
async fn upload_image(
    ctx: &AppContext,
    form: &mut FormPayload,
    field: &str,
    player_id: &str,
    kind: &str,
) -> Result<Option<String>, AppError> {
    let Some(file) = form.take_file(field) else {
        return Ok(None);
    };
    let path = format!("players/{}/images/{}", player_id, kind);
    let url = ctx
        .storage
        .upload(&path, file.bytes, file.content_type.as_deref())
        .await?;
    Ok(Some(url))
}

#[async_trait]
impl EntityService for PlayerService {
    type Aggregate = Player;

    async fn create_document(
        &self,
        ctx: &AppContext,
        mut form: FormPayload,
    ) -> Result<String, AppError> {
        let id = PlayerId::new_v4();
        let key = id.as_string();

        let mut player = Player {
            id,
            first_name: form.required("firstName")?,
            last_name: form.required("lastName")?,
            number: form.parse::<u32>("number")?.unwrap_or(0),
            position: form
                .parse_with("position", PlayerPosition::from_code)?
                .ok_or_else(|| AppError::Validation("field 'position' is required".into()))?,
            foot: form.parse_with("foot", PreferredFoot::from_code)?,
            picture: String::new(),
            detail_picture: String::new(),
            current_age: form.parse::<u32>("current_age")?.unwrap_or(0),
            height: form.parse::<u32>("height")?.unwrap_or(0),
            nationality: form.text("nationality").unwrap_or_default(),
            biography: form.text("biography").unwrap_or_default(),
            date_of_birth: form.date("date_of_birth")?,
            joined_club: form.date("joined_club")?,
            status: form
                .parse_with("status", PublishStatus::from_code)?
                .unwrap_or_default(),
        };
        validated(player.validate())?;

        player.picture = upload_image(ctx, &mut form, "picture", &key, "cover")
            .await?
            .unwrap_or_default();
        player.detail_picture = upload_image(ctx, &mut form, "detail_picture", &key, "detail")
            .await?
            .unwrap_or_default();

        ctx.repository::<Player>().insert(&player).await
    }

    async fn update(
        &self,
        ctx: &AppContext,
        id: &str,
        mut form: FormPayload,
    ) -> Result<(), AppError> {
        let repository = ctx.repository::<Player>();
        if !repository.exists(id).await? {
            return Err(AppError::not_found(Player::collection_name(), id));
        }

        let patch = PlayerPatch {
            first_name: form.text("firstName"),
            last_name: form.text("lastName"),
            number: form.parse::<u32>("number")?,
            position: form.parse_with("position", PlayerPosition::from_code)?,
            foot: form.parse_with("foot", PreferredFoot::from_code)?,
            picture: upload_image(ctx, &mut form, "picture", id, "cover").await?,
            detail_picture: upload_image(ctx, &mut form, "detail_picture", id, "detail").await?,
            current_age: form.parse::<u32>("current_age")?,
            height: form.parse::<u32>("height")?,
            nationality: form.text("nationality"),
            biography: form.text("biography"),
            date_of_birth: form.date("date_of_birth")?,
            joined_club: form.date("joined_club")?,
            status: form.parse_with("status", PublishStatus::from_code)?,
        };
        repository.update_fields(id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::context::test_support::memory_context;
    use chrono::NaiveDate;
    use contracts::shared::pagination::CursorQuery;

    fn player_form(first: &str, number: u32) -> FormPayload {
        FormPayload::new()
            .with_field("firstName", first)
            .with_field("lastName", "Nauyoma")
            .with_field("number", number.to_string())
            .with_field("position", "Forward")
            .with_field("foot", "left")
            .with_field("date_of_birth", "2001-02-03")
    }

    #[tokio::test]
    async fn test_create_uploads_images_under_player_id() {
        let (ctx, root) = memory_context();
        let id = PlayerService
            .create(
                &ctx,
                player_form("Petrus", 9)
                    .with_file("picture", "cover.png", vec![1, 2])
                    .with_file("detail_picture", "detail.png", vec![3]),
            )
            .await
            .unwrap();

        let player = PlayerService.get(&ctx, &id).await.unwrap();
        assert_eq!(player.picture, format!("/media/players/{}/images/cover", id));
        assert_eq!(player.detail_picture, format!("/media/players/{}/images/detail", id));
        assert_eq!(player.foot, Some(PreferredFoot::Left));
        assert_eq!(player.date_of_birth, NaiveDate::from_ymd_opt(2001, 2, 3));
        assert!(root.join("players").join(&id).join("images/cover").exists());
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_listing_is_ordered_by_number() {
        let (ctx, _) = memory_context();
        for (name, number) in [("Nine", 9), ("One", 1), ("Four", 4)] {
            PlayerService.create(&ctx, player_form(name, number)).await.unwrap();
        }

        let page = PlayerService.page(&ctx, CursorQuery::default()).await.unwrap();
        let numbers: Vec<u32> = page.items.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 4, 9]);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_invalid_position_and_dates() {
        let (ctx, _) = memory_context();
        let err = PlayerService
            .create(&ctx, player_form("X", 1).with_field("position", "Striker"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = PlayerService
            .create(&ctx, player_form("X", 1).with_field("joined_club", "1999-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_changes_number() {
        let (ctx, _) = memory_context();
        let id = PlayerService.create(&ctx, player_form("Petrus", 9)).await.unwrap();
        PlayerService
            .update(&ctx, &id, FormPayload::new().with_field("number", "10"))
            .await
            .unwrap();
        let player = PlayerService.get(&ctx, &id).await.unwrap();
        assert_eq!(player.number, 10);
        assert_eq!(player.first_name, "Petrus");
    }
}
