use serde::{Deserialize, Serialize};

use crate::domain::common::AggregateRoot;
use crate::shared::pagination::SortOrder;

crate::aggregate_id!(
    /// Уникальный идентификатор команды
    TeamId
);

/// Команда-соперник (используется в матчах)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Публичный URL эмблемы
    #[serde(default)]
    pub image_url: String,
}

impl Team {
    pub fn new_for_insert(id: TeamId, name: String, image_url: String) -> Self {
        Self { id, name, image_url }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Team name must not be empty".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Team {
    type Id = TeamId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn collection_name() -> &'static str {
        "teams"
    }

    fn sort_field() -> &'static str {
        "name"
    }

    fn sort_order() -> SortOrder {
        SortOrder::Asc
    }

    fn page_size() -> usize {
        10
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
