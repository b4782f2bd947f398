use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a005_team::aggregate::TeamId;
use crate::domain::common::AggregateRoot;
use crate::shared::pagination::SortOrder;

crate::aggregate_id!(
    /// Уникальный идентификатор матча
    FixtureId
);

/// Счёт матча
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub home: u32,
    pub away: u32,
}

/// Турнирная информация о матче
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchInfo {
    #[serde(default)]
    pub competition_stage: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub leg: String,
}

/// Матч: анонс (fixture) или результат
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub scores: Scores,
    #[serde(with = "crate::shared::timestamp")]
    pub match_date: DateTime<Utc>,
    #[serde(default)]
    pub match_info: MatchInfo,
    /// Свободный текст ("upcoming", "live", "full-time", ...)
    #[serde(default)]
    pub status: String,
}

impl Fixture {
    pub fn validate(&self) -> Result<(), String> {
        if self.home_team_id == self.away_team_id {
            return Err("Home and away team must differ".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Fixture {
    type Id = FixtureId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn collection_name() -> &'static str {
        "live_matches"
    }

    fn sort_field() -> &'static str {
        "match_date"
    }

    fn sort_order() -> SortOrder {
        SortOrder::Desc
    }

    fn page_size() -> usize {
        5
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoresPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchInfoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg: Option<String>,
}

/// Изменения матча. Вложенные объекты сливаются с сохранёнными полями,
/// поэтому можно обновить только счёт хозяев, не трогая гостей.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoresPatch>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp",
        default
    )]
    pub match_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchInfoPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn serialize_optional_timestamp<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(dt) => crate::shared::timestamp::serialize(dt, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_patch_keeps_nested_fields_partial() {
        let patch = FixturePatch {
            scores: Some(ScoresPatch {
                home: Some(2),
                away: None,
            }),
            match_date: Some(Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "scores": { "home": 2 },
                "match_date": "2024-03-09T15:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_validate_rejects_same_team() {
        let team = TeamId::new_v4();
        let fixture = Fixture {
            id: FixtureId::new_v4(),
            home_team_id: team,
            away_team_id: team,
            scores: Scores::default(),
            match_date: Utc::now(),
            match_info: MatchInfo::default(),
            status: "upcoming".into(),
        };
        assert!(fixture.validate().is_err());
    }
}
