use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::AggregateRoot;
use crate::enums::{PlayerPosition, PreferredFoot, PublishStatus};
use crate::shared::pagination::SortOrder;

crate::aggregate_id!(
    /// Уникальный идентификатор игрока
    PlayerId
);

/// Профиль игрока основного состава
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    /// Игровой номер; по нему упорядочен листинг
    pub number: u32,
    pub position: PlayerPosition,
    #[serde(default)]
    pub foot: Option<PreferredFoot>,
    /// Обложка для карточки игрока
    #[serde(default)]
    pub picture: String,
    /// Фото для детальной страницы
    #[serde(default)]
    pub detail_picture: String,
    #[serde(default)]
    pub current_age: u32,
    /// Рост, см
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub joined_club: Option<NaiveDate>,
    #[serde(default)]
    pub status: PublishStatus,
}

impl Player {
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".into());
        }
        if let (Some(born), Some(joined)) = (self.date_of_birth, self.joined_club) {
            if joined < born {
                return Err("Joined club date precedes date of birth".into());
            }
        }
        Ok(())
    }
}

impl AggregateRoot for Player {
    type Id = PlayerId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn collection_name() -> &'static str {
        "players"
    }

    fn sort_field() -> &'static str {
        "number"
    }

    fn sort_order() -> SortOrder {
        SortOrder::Asc
    }

    fn page_size() -> usize {
        10
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PlayerPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot: Option<PreferredFoot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_club: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
}
