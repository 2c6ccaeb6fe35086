//! Shop and category endpoints: follows, deletion cascades and blacklisting.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CategoryId, ShopId};
use document_store::DocumentStore;
use domain::{Follow, ProductCategory, Shop};
use serde::Deserialize;

use super::{ActingUser, parse_id};
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct BlacklistRequest {
    pub is_blacklisted: bool,
}

/// POST /shops/{id}/follow
#[tracing::instrument(skip(state), fields(user_id = %user.0))]
pub async fn follow<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: ActingUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Follow>), ApiError> {
    let shop: ShopId = parse_id(&id)?;
    let follow = state.workflows.follow_shop(user.0, shop).await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

/// DELETE /shops/{id}/follow
#[tracing::instrument(skip(state), fields(user_id = %user.0))]
pub async fn unfollow<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: ActingUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let shop: ShopId = parse_id(&id)?;
    state.workflows.unfollow_shop(user.0, shop).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /shops/{id}: deactivate a shop with its products and follows.
#[tracing::instrument(skip(state, _user))]
pub async fn delete_shop<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: ActingUser,
    Path(id): Path<String>,
) -> Result<Json<Shop>, ApiError> {
    let shop = state.workflows.delete_shop(parse_id(&id)?).await?;
    Ok(Json(shop))
}

/// PATCH /shops/{id}/blacklist
#[tracing::instrument(skip(state, _user, req))]
pub async fn toggle_blacklist<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: ActingUser,
    Path(id): Path<String>,
    Json(req): Json<BlacklistRequest>,
) -> Result<Json<Shop>, ApiError> {
    let shop = state
        .workflows
        .toggle_shop_blacklist(parse_id(&id)?, req.is_blacklisted)
        .await?;
    Ok(Json(shop))
}

/// DELETE /categories/{id}
#[tracing::instrument(skip(state, _user))]
pub async fn delete_category<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: ActingUser,
    Path(id): Path<String>,
) -> Result<Json<ProductCategory>, ApiError> {
    let category: CategoryId = parse_id(&id)?;
    let category = state.workflows.delete_product_category(category).await?;
    Ok(Json(category))
}
