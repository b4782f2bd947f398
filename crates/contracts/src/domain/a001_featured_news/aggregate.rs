use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::AggregateRoot;
use crate::enums::PublishStatus;
use crate::shared::pagination::SortOrder;

// ============================================================================
// ID Type
// ============================================================================

crate::aggregate_id!(
    /// Уникальный идентификатор новости
    FeaturedNewsId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Новость в ленте на главной странице клуба
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedNews {
    pub id: FeaturedNewsId,
    pub title: String,
    pub description: String,
    /// Публичный URL картинки в хранилище файлов
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(with = "crate::shared::timestamp")]
    pub date_posted: DateTime<Utc>,
}

impl FeaturedNews {
    /// Создать новость для вставки; дата публикации = текущий момент
    pub fn new_for_insert(
        id: FeaturedNewsId,
        title: String,
        description: String,
        picture: String,
        status: PublishStatus,
    ) -> Self {
        Self {
            id,
            title,
            description,
            picture,
            status,
            date_posted: Utc::now(),
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title must not be empty".into());
        }
        if self.description.trim().is_empty() {
            return Err("Description must not be empty".into());
        }
        Ok(())
    }
}

impl AggregateRoot for FeaturedNews {
    type Id = FeaturedNewsId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn collection_name() -> &'static str {
        "featured_news"
    }

    fn sort_field() -> &'static str {
        "date_posted"
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

/// Изменения из формы редактирования: пишутся только заполненные поля
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedNewsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
}
