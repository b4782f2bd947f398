//! Состояние одного листинга коллекции.
//!
//! Контроллер хранит cursor store, текущее окно и флаги навигации.
//! Одновременно выполняется не больше одной выборки (`Idle`/`Loading`).
//! Каждая выборка получает номер поколения: результат, пришедший после
//! внешней мутации или `dispose`, отбрасывается без изменения состояния.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use contracts::shared::pagination::{CollectionSpec, ListingPage, PageDirection, SkipReason};
use serde_json::Value;

use super::{CursorMarker, CursorPair, CursorStore, PageFetcher, PageWindow};
use crate::shared::data::StoredDocument;
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// Итог навигационного запроса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Loaded,
    Skipped(SkipReason),
}

impl Navigation {
    pub fn skipped(self) -> Option<SkipReason> {
        match self {
            Navigation::Loaded => None,
            Navigation::Skipped(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Initial,
    Next,
    Previous,
    ExternalMutation,
}

struct ListingState {
    phase: Phase,
    generation: u64,
    disposed: bool,
    cursor: CursorStore,
    /// Первый маркер последней успешной начальной загрузки
    head: Option<CursorMarker>,
    window: PageWindow,
    has_more: bool,
    last_used: Instant,
}

impl ListingState {
    fn has_previous(&self) -> bool {
        match self.cursor.first() {
            Some(first) => self.head.as_ref() != Some(first),
            None => false,
        }
    }
}

/// Снимок листинга для ответа клиенту
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub documents: Vec<StoredDocument>,
    pub cursor: CursorPair,
    pub has_more: bool,
    pub has_previous: bool,
    pub phase: Phase,
}

impl ListingSnapshot {
    pub fn into_page(self) -> ListingPage<Value> {
        ListingPage {
            first: self.cursor.first_token(),
            last: self.cursor.last_token(),
            items: self
                .documents
                .into_iter()
                .map(StoredDocument::into_json)
                .collect(),
            has_more: self.has_more,
            has_previous: self.has_previous,
        }
    }
}

pub struct PageController {
    spec: CollectionSpec,
    fetcher: PageFetcher,
    fetch_timeout: Duration,
    state: Mutex<ListingState>,
}

impl PageController {
    pub fn new(spec: CollectionSpec, fetcher: PageFetcher, fetch_timeout: Duration) -> Self {
        Self {
            spec,
            fetcher,
            fetch_timeout,
            state: Mutex::new(ListingState {
                phase: Phase::Idle,
                generation: 0,
                disposed: false,
                cursor: CursorStore::new(),
                head: None,
                window: PageWindow::default(),
                has_more: false,
                last_used: Instant::now(),
            }),
        }
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    pub async fn load_initial(&self) -> Result<Navigation, AppError> {
        self.navigate(Intent::Initial).await
    }

    pub async fn load_next(&self) -> Result<Navigation, AppError> {
        self.navigate(Intent::Next).await
    }

    pub async fn load_previous(&self) -> Result<Navigation, AppError> {
        self.navigate(Intent::Previous).await
    }

    /// Сброс маркеров и начальная загрузка. Выборка, уже идущая в этот
    /// момент, будет отброшена при завершении.
    pub async fn on_external_mutation(&self) -> Result<Navigation, AppError> {
        self.navigate(Intent::ExternalMutation).await
    }

    pub fn dispose(&self) {
        let mut state = self.lock();
        state.disposed = true;
        state.phase = Phase::Idle;
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn idle_for(&self) -> Duration {
        self.lock().last_used.elapsed()
    }

    pub fn snapshot(&self) -> ListingSnapshot {
        let state = self.lock();
        ListingSnapshot {
            documents: state.window.documents().cloned().collect(),
            cursor: state.cursor.get().clone(),
            has_more: state.has_more,
            has_previous: state.has_previous(),
            phase: state.phase,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn navigate(&self, intent: Intent) -> Result<Navigation, AppError> {
        let (generation, direction, markers) = {
            let mut state = self.lock();
            state.last_used = Instant::now();

            if state.disposed {
                return Ok(Navigation::Skipped(SkipReason::Discarded));
            }
            match intent {
                Intent::ExternalMutation => state.cursor.reset(),
                _ if state.phase == Phase::Loading => {
                    return Ok(Navigation::Skipped(SkipReason::Busy));
                }
                Intent::Next if !state.has_more => {
                    return Ok(Navigation::Skipped(SkipReason::NoMore));
                }
                Intent::Previous if !state.has_previous() => {
                    return Ok(Navigation::Skipped(SkipReason::NoPrevious));
                }
                _ => {}
            }

            let markers = state.cursor.get().clone();
            let direction = match intent {
                Intent::Next if markers.last.is_some() => PageDirection::Next,
                Intent::Previous if markers.first.is_some() => PageDirection::Previous,
                _ => PageDirection::Initial,
            };

            state.generation += 1;
            state.phase = Phase::Loading;
            let markers = match direction {
                PageDirection::Initial => CursorPair::default(),
                _ => markers,
            };
            (state.generation, direction, markers)
        };

        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&self.spec, direction, &markers),
        )
        .await
        .unwrap_or_else(|_| {
            Err(AppError::DataAccess(format!(
                "fetch from {} timed out after {}s",
                self.spec.collection,
                self.fetch_timeout.as_secs_f64()
            )))
        });

        let mut state = self.lock();
        if state.disposed || state.generation != generation {
            tracing::debug!(
                "Discarding superseded {:?} page of {}",
                direction,
                self.spec.collection
            );
            return Ok(Navigation::Skipped(SkipReason::Discarded));
        }
        state.phase = Phase::Idle;

        let window = match fetched {
            Ok(window) => window,
            Err(e) => {
                tracing::warn!("Listing of {} failed: {}", self.spec.collection, e);
                return Err(e);
            }
        };

        let full = window.len() == self.spec.page_size;
        match direction {
            PageDirection::Initial => {
                state.cursor.reset();
                state.cursor.update(&window);
                state.head = window.first_marker().cloned();
                state.has_more = full;
            }
            PageDirection::Next => {
                state.cursor.update(&window);
                state.has_more = full;
            }
            PageDirection::Previous => {
                state.cursor.update(&window);
                state.has_more = true;
            }
        }
        state.window = window;
        state.last_used = Instant::now();
        Ok(Navigation::Loaded)
    }
}
