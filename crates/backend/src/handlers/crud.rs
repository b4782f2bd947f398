//! CRUD и stateless-листинг, общие для всех коллекций.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::shared::pagination::{CursorPage, CursorQuery};
use serde_json::{json, Value};

use crate::domain::EntityService;
use crate::shared::context::AppContext;
use crate::shared::error::AppError;
use crate::shared::form::FormPayload;

/// GET /api/{entity}?direction=&first=&last=
pub async fn list<S: EntityService>(
    State(ctx): State<AppContext>,
    Query(query): Query<CursorQuery>,
) -> Result<Json<CursorPage<S::Aggregate>>, AppError> {
    let page = S::default().page(&ctx, query).await?;
    Ok(Json(page))
}

/// GET /api/{entity}/all
pub async fn list_all<S: EntityService>(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<S::Aggregate>>, AppError> {
    let items = S::default().all(&ctx).await?;
    Ok(Json(items))
}

/// GET /api/{entity}/:id
pub async fn get_by_id<S: EntityService>(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<S::Aggregate>, AppError> {
    let aggregate = S::default().get(&ctx, &id).await?;
    Ok(Json(aggregate))
}

/// POST /api/{entity} (multipart)
pub async fn create<S: EntityService>(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let form = FormPayload::from_multipart(multipart).await?;
    let id = S::default().create(&ctx, form).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /api/{entity}/:id (multipart)
pub async fn update<S: EntityService>(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<StatusCode, AppError> {
    let form = FormPayload::from_multipart(multipart).await?;
    S::default().update(&ctx, &id, form).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/{entity}/:id
pub async fn delete<S: EntityService>(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    S::default().delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
