use contracts::shared::pagination::CursorToken;

use super::{CursorMarker, PageWindow};
use crate::shared::error::AppError;

/// Маркеры первой и последней записи текущего окна
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorPair {
    pub first: Option<CursorMarker>,
    pub last: Option<CursorMarker>,
}

impl CursorPair {
    /// Пара из клиентских токенов; битый токен даёт `Validation`
    pub fn from_tokens(
        first: Option<&CursorToken>,
        last: Option<&CursorToken>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            first: first.map(CursorMarker::from_token).transpose()?,
            last: last.map(CursorMarker::from_token).transpose()?,
        })
    }

    pub fn first_token(&self) -> Option<CursorToken> {
        self.first.as_ref().map(CursorMarker::to_token)
    }

    pub fn last_token(&self) -> Option<CursorToken> {
        self.last.as_ref().map(CursorMarker::to_token)
    }
}

/// Cursor store одного листинга. Не разделяется между экземплярами.
#[derive(Debug, Clone, Default)]
pub struct CursorStore {
    markers: CursorPair,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.markers = CursorPair::default();
    }

    /// Пустое окно очищает оба маркера
    pub fn update(&mut self, window: &PageWindow) {
        self.markers = CursorPair {
            first: window.first_marker().cloned(),
            last: window.last_marker().cloned(),
        };
    }

    pub fn get(&self) -> &CursorPair {
        &self.markers
    }

    pub fn first(&self) -> Option<&CursorMarker> {
        self.markers.first.as_ref()
    }
}
