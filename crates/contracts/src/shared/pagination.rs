//! Типы курсорной пагинации, общие для backend и клиентов.

use serde::{Deserialize, Serialize};

/// Направление сортировки коллекции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Навигационное намерение для одной выборки страницы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    #[default]
    Initial,
    Next,
    Previous,
}

/// Неизменяемые параметры листинга коллекции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionSpec {
    pub collection: &'static str,
    pub sort_field: &'static str,
    pub sort_order: SortOrder,
    pub page_size: usize,
}

/// Непрозрачный маркер позиции записи, выдаваемый клиенту
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorToken(pub String);

impl CursorToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Query-параметры stateless-листинга: `?direction=next&last=<token>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursorQuery {
    #[serde(default)]
    pub direction: PageDirection,
    pub first: Option<CursorToken>,
    pub last: Option<CursorToken>,
}

/// Страница stateless-листинга
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub first: Option<CursorToken>,
    pub last: Option<CursorToken>,
    pub has_more: bool,
}

/// Текущее состояние listing instance на сервере
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    pub first: Option<CursorToken>,
    pub last: Option<CursorToken>,
    pub has_more: bool,
    pub has_previous: bool,
}

impl<T> Default for ListingPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            first: None,
            last: None,
            has_more: false,
            has_previous: false,
        }
    }
}

/// Почему навигационный запрос не выполнил выборку
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Листинг уже выполняет запрос
    Busy,
    NoMore,
    NoPrevious,
    /// Результат пришёл после закрытия или перезагрузки листинга
    Discarded,
}

/// Ответ на навигацию по listing instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResponse<T> {
    pub page: ListingPage<T>,
    pub skipped: Option<SkipReason>,
}

/// Ответ на открытие listing instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenListingResponse<T> {
    pub listing_id: String,
    pub page: ListingPage<T>,
}
