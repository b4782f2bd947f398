//! Листинги, живущие на сервере: клиент открывает листинг коллекции,
//! листает его по id и закрывает при уходе со страницы.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::common::AggregateRoot;
use contracts::shared::pagination::{ListingPage, NavigationResponse, OpenListingResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::EntityService;
use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::pagination::{Navigation, PageController};

fn find_listing(ctx: &AppContext, id: &str) -> Result<Arc<PageController>, AppError> {
    Uuid::parse_str(id)
        .ok()
        .and_then(|uuid| ctx.listings.get(&uuid))
        .ok_or_else(|| AppError::not_found("listings", id))
}

fn navigation_response(
    controller: &PageController,
    navigation: Navigation,
) -> Json<NavigationResponse<Value>> {
    Json(NavigationResponse {
        page: controller.snapshot().into_page(),
        skipped: navigation.skipped(),
    })
}

/// POST /api/{entity}/listings
pub async fn open<S: EntityService>(
    State(ctx): State<AppContext>,
) -> Result<(StatusCode, Json<OpenListingResponse<Value>>), AppError> {
    let spec = S::Aggregate::collection_spec();
    let (id, controller) = ctx.listings.open(spec).await?;
    Ok((
        StatusCode::CREATED,
        Json(OpenListingResponse {
            listing_id: id.to_string(),
            page: controller.snapshot().into_page(),
        }),
    ))
}

/// GET /api/listings/:id
pub async fn get(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ListingPage<Value>>, AppError> {
    let controller = find_listing(&ctx, &id)?;
    Ok(Json(controller.snapshot().into_page()))
}

/// POST /api/listings/:id/next
pub async fn next(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<NavigationResponse<Value>>, AppError> {
    let controller = find_listing(&ctx, &id)?;
    let navigation = controller.load_next().await?;
    Ok(navigation_response(&controller, navigation))
}

/// POST /api/listings/:id/previous
pub async fn previous(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<NavigationResponse<Value>>, AppError> {
    let controller = find_listing(&ctx, &id)?;
    let navigation = controller.load_previous().await?;
    Ok(navigation_response(&controller, navigation))
}

/// POST /api/listings/:id/refresh
pub async fn refresh(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<NavigationResponse<Value>>, AppError> {
    let controller = find_listing(&ctx, &id)?;
    let navigation = controller.on_external_mutation().await?;
    Ok(navigation_response(&controller, navigation))
}

/// DELETE /api/listings/:id
pub async fn close(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let closed = Uuid::parse_str(&id)
        .map(|uuid| ctx.listings.close(&uuid))
        .unwrap_or(false);
    if closed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("listings", id))
    }
}
