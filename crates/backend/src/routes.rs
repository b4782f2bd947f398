use std::path::PathBuf;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::domain::a001_featured_news::service::FeaturedNewsService;
use crate::domain::a002_fan_highlight::service::FanHighlightService;
use crate::domain::a003_fixture::service::FixtureService;
use crate::domain::a004_player::service::PlayerService;
use crate::domain::a005_team::service::TeamService;
use crate::domain::EntityService;
use crate::handlers::{crud, listings};
use crate::shared::context::AppContext;

/// Роуты одной коллекции: CRUD, stateless-листинг и открытие листинга
fn entity_routes<S: EntityService>() -> Router<AppContext> {
    Router::new()
        .route("/", get(crud::list::<S>).post(crud::create::<S>))
        .route("/listings", post(listings::open::<S>))
        .route(
            "/:id",
            get(crud::get_by_id::<S>)
                .put(crud::update::<S>)
                .delete(crud::delete::<S>),
        )
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(ctx: AppContext, media_url: &str, media_root: PathBuf) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // COLLECTIONS
        // ========================================
        .nest("/api/news", entity_routes::<FeaturedNewsService>())
        .nest("/api/highlights", entity_routes::<FanHighlightService>())
        .nest("/api/fixtures", entity_routes::<FixtureService>())
        .nest("/api/players", entity_routes::<PlayerService>())
        .nest(
            "/api/teams",
            // полный список для выбора команд в форме матча
            entity_routes::<TeamService>().route("/all", get(crud::list_all::<TeamService>)),
        )
        // ========================================
        // SERVER-SIDE LISTINGS
        // ========================================
        .route(
            "/api/listings/:id",
            get(listings::get).delete(listings::close),
        )
        .route("/api/listings/:id/next", post(listings::next))
        .route("/api/listings/:id/previous", post(listings::previous))
        .route("/api/listings/:id/refresh", post(listings::refresh))
        // Загруженные изображения
        .nest_service(media_url.trim_end_matches('/'), ServeDir::new(media_root))
        .with_state(ctx)
}
