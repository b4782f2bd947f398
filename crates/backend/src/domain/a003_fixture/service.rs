use async_trait::async_trait;
use contracts::domain::a003_fixture::aggregate::{
    Fixture, FixtureId, FixturePatch, MatchInfo, MatchInfoPatch, Scores, ScoresPatch,
};
use contracts::domain::a005_team::aggregate::{Team, TeamId};
use contracts::domain::common::{AggregateId, AggregateRoot};

use crate::domain::entity_service::{validated, EntityService};
use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureService;

fn team_id(form: &FormPayload, name: &str) -> Result<Option<TeamId>, AppError> {
    form.parse_with(name, |v| TeamId::from_string(v).ok())
}

/// Команда матча должна существовать в коллекции команд
async fn ensure_team(ctx: &AppContext, id: TeamId) -> Result<(), AppError> {
    let key = id.as_string();
    if ctx.repository::<Team>().exists(&key).await? {
        Ok(())
    } else {
        Err(AppError::Validation(format!("team {} does not exist", key)))
    }
}

fn match_info_patch(form: &FormPayload) -> Option<MatchInfoPatch> {
    let patch = MatchInfoPatch {
        competition_stage: form.text("match_info[competitionStage]"),
        league: form.text("match_info[league]"),
        leg: form.text("match_info[leg]"),
    };
    let empty =
        patch.competition_stage.is_none() && patch.league.is_none() && patch.leg.is_none();
    (!empty).then_some(patch)
}

fn scores_patch(form: &FormPayload) -> Result<Option<ScoresPatch>, AppError> {
    let patch = ScoresPatch {
        home: form.parse::<u32>("scores[home]")?,
        away: form.parse::<u32>("scores[away]")?,
    };
    Ok((patch.home.is_some() || patch.away.is_some()).then_some(patch))
}

#[async_trait]
impl EntityService for FixtureService {
    type Aggregate = Fixture;

    async fn create_document(
        &self,
        ctx: &AppContext,
        form: FormPayload,
    ) -> Result<String, AppError> {
        let home_team_id = team_id(&form, "home_team_id")?
            .ok_or_else(|| AppError::Validation("field 'home_team_id' is required".into()))?;
        let away_team_id = team_id(&form, "away_team_id")?
            .ok_or_else(|| AppError::Validation("field 'away_team_id' is required".into()))?;
        let match_date = form
            .datetime("match_date")?
            .ok_or_else(|| AppError::Validation("field 'match_date' is required".into()))?;

        let scores = scores_patch(&form)?.unwrap_or_default();
        let info = match_info_patch(&form).unwrap_or_default();

        let fixture = Fixture {
            id: FixtureId::new_v4(),
            home_team_id,
            away_team_id,
            scores: Scores {
                home: scores.home.unwrap_or(0),
                away: scores.away.unwrap_or(0),
            },
            match_date,
            match_info: MatchInfo {
                competition_stage: info.competition_stage.unwrap_or_default(),
                league: info.league.unwrap_or_default(),
                leg: info.leg.unwrap_or_default(),
            },
            status: form.text("status").unwrap_or_default(),
        };
        validated(fixture.validate())?;
        ensure_team(ctx, fixture.home_team_id).await?;
        ensure_team(ctx, fixture.away_team_id).await?;

        ctx.repository::<Fixture>().insert(&fixture).await
    }

    async fn update(&self, ctx: &AppContext, id: &str, form: FormPayload) -> Result<(), AppError> {
        let patch = FixturePatch {
            home_team_id: team_id(&form, "home_team_id")?,
            away_team_id: team_id(&form, "away_team_id")?,
            scores: scores_patch(&form)?,
            match_date: form.datetime("match_date")?,
            match_info: match_info_patch(&form),
            status: form.text("status"),
        };

        if patch.home_team_id.is_some() || patch.away_team_id.is_some() {
            let current = ctx.repository::<Fixture>().get(id).await?;
            let home = patch.home_team_id.unwrap_or(current.home_team_id);
            let away = patch.away_team_id.unwrap_or(current.away_team_id);
            if home == away {
                return Err(AppError::Validation("Home and away team must differ".into()));
            }
            for team in patch.home_team_id.iter().chain(patch.away_team_id.iter()) {
                ensure_team(ctx, *team).await?;
            }
        }

        tracing::debug!("Updating {}/{}", Fixture::collection_name(), id);
        ctx.repository::<Fixture>().update_fields(id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::context::test_support::memory_context;

    async fn team(ctx: &AppContext, name: &str) -> String {
        let team = Team::new_for_insert(TeamId::new_v4(), name.into(), String::new());
        ctx.repository::<Team>().insert(&team).await.unwrap()
    }

    fn fixture_form(home: &str, away: &str) -> FormPayload {
        FormPayload::new()
            .with_field("home_team_id", home)
            .with_field("away_team_id", away)
            .with_field("match_date", "2024-05-18T15:30")
            .with_field("scores[home]", "2")
            .with_field("match_info[league]", "Premier League")
            .with_field("status", "full-time")
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let (ctx, _) = memory_context();
        let home = team(&ctx, "African Stars").await;
        let away = team(&ctx, "Black Africa").await;

        let id = FixtureService.create(&ctx, fixture_form(&home, &away)).await.unwrap();
        let fixture = FixtureService.get(&ctx, &id).await.unwrap();
        assert_eq!(fixture.scores, Scores { home: 2, away: 0 });
        assert_eq!(fixture.match_info.league, "Premier League");
        assert_eq!(fixture.match_info.leg, "");
        assert_eq!(fixture.home_team_id.to_string(), home);
    }

    #[tokio::test]
    async fn test_create_rejects_same_or_unknown_team() {
        let (ctx, _) = memory_context();
        let home = team(&ctx, "African Stars").await;

        let err = FixtureService
            .create(&ctx, fixture_form(&home, &home))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let unknown = TeamId::new_v4().to_string();
        let err = FixtureService
            .create(&ctx, fixture_form(&home, &unknown))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("does not exist")));
    }

    #[tokio::test]
    async fn test_update_merges_nested_scores() {
        let (ctx, _) = memory_context();
        let home = team(&ctx, "African Stars").await;
        let away = team(&ctx, "Black Africa").await;
        let id = FixtureService.create(&ctx, fixture_form(&home, &away)).await.unwrap();

        FixtureService
            .update(
                &ctx,
                &id,
                FormPayload::new()
                    .with_field("scores[away]", "1")
                    .with_field("match_info[leg]", "Second"),
            )
            .await
            .unwrap();

        let fixture = FixtureService.get(&ctx, &id).await.unwrap();
        assert_eq!(fixture.scores, Scores { home: 2, away: 1 });
        assert_eq!(fixture.match_info.league, "Premier League");
        assert_eq!(fixture.match_info.leg, "Second");
        assert_eq!(fixture.status, "full-time");

        let err = FixtureService
            .update(&ctx, &id, FormPayload::new().with_field("away_team_id", &home))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
