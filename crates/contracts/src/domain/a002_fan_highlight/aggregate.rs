use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::AggregateRoot;
use crate::enums::PublishStatus;
use crate::shared::pagination::SortOrder;

crate::aggregate_id!(
    /// Уникальный идентификатор видео болельщиков
    FanHighlightId
);

/// Видео от болельщиков (встраиваемый плеер)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanHighlight {
    pub id: FanHighlightId,
    /// URL для встраивания (`https://www.youtube.com/embed/...`)
    pub src: String,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(with = "crate::shared::timestamp")]
    pub date_posted: DateTime<Utc>,
}

impl FanHighlight {
    pub fn new_for_insert(id: FanHighlightId, src: &str, status: PublishStatus) -> Self {
        Self {
            id,
            src: embed_url(src),
            status,
            date_posted: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.src.trim().is_empty() {
            return Err("Video link must not be empty".into());
        }
        Ok(())
    }
}

/// Переводит ссылку вида `watch?v=<id>` во встраиваемую форму.
///
/// Уже встраиваемые и прочие ссылки возвращаются без изменений;
/// отметка времени `&t=` отбрасывается.
pub fn embed_url(src: &str) -> String {
    let src = src.trim();
    match src.split_once("watch?v=") {
        Some((_, rest)) => {
            let video_id = rest.split("&t=").next().unwrap_or(rest);
            format!("https://www.youtube.com/embed/{}", video_id)
        }
        None => src.to_string(),
    }
}

impl AggregateRoot for FanHighlight {
    type Id = FanHighlightId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn collection_name() -> &'static str {
        "fan_highlights"
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanHighlightPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_url_rewrites_watch_links() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123"),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123&t=42s"),
            "https://www.youtube.com/embed/abc123"
        );
    }

    #[test]
    fn test_embed_url_keeps_embedded_links() {
        let link = "https://www.youtube.com/embed/abc123";
        assert_eq!(embed_url(link), link);
    }
}
