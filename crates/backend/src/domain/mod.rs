pub mod a001_featured_news;
pub mod a002_fan_highlight;
pub mod a003_fixture;
pub mod a004_player;
pub mod a005_team;
pub mod entity_service;

pub use entity_service::EntityService;
