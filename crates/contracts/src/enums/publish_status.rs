use serde::{Deserialize, Serialize};

/// Статус публикации записи на сайте клуба
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Active,
    Draft,
}

impl PublishStatus {
    /// Код статуса, как он хранится в документе
    pub fn code(&self) -> &'static str {
        match self {
            PublishStatus::Active => "active",
            PublishStatus::Draft => "draft",
        }
    }

    pub fn all() -> Vec<PublishStatus> {
        vec![PublishStatus::Active, PublishStatus::Draft]
    }

    /// Парсинг из строки формы
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::all()
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code))
    }
}

impl Default for PublishStatus {
    fn default() -> Self {
        PublishStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_ignores_case_and_spaces() {
        assert_eq!(PublishStatus::from_code(" Active "), Some(PublishStatus::Active));
        assert_eq!(PublishStatus::from_code("draft"), Some(PublishStatus::Draft));
        assert_eq!(PublishStatus::from_code("archived"), None);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&PublishStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
