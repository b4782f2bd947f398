//! Курсорная пагинация коллекций: маркеры, выборка окна, состояние листинга.

pub mod cursor_marker;
pub mod cursor_store;
pub mod listing_registry;
pub mod page_controller;
pub mod page_fetcher;

pub use cursor_marker::CursorMarker;
pub use cursor_store::{CursorPair, CursorStore};
pub use listing_registry::{ListingConfig, ListingRegistry};
pub use page_controller::{ListingSnapshot, Navigation, PageController, Phase};
pub use page_fetcher::{PageEntry, PageFetcher, PageWindow};
