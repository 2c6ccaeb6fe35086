//! User endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use document_store::DocumentStore;
use domain::User;

use super::{ActingUser, parse_id};
use crate::AppState;
use crate::error::ApiError;

/// DELETE /users/{id}: deactivate a user and remove the follows they made.
#[tracing::instrument(skip(state, _user))]
pub async fn delete<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: ActingUser,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.workflows.delete_user(parse_id(&id)?).await?;
    Ok(Json(user))
}
