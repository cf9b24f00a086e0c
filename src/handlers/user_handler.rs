use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use super::ServerState;
use crate::models::{ApiResponse, FeedQuery, ReceivedRequest, UserProfile};
use crate::services::{connection_counterparts, feed_exclusion_set, SocialStore};
use crate::utils::Pagination;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// Pending requests sent to the logged-in user
pub async fn received_requests<S: SocialStore + 'static>(
    State(state): State<Arc<ServerState<S>>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<Vec<ReceivedRequest>> {
    let requests = state.store.received_requests(&user.id).await.map_err(|e| {
        tracing::error!(user_id = %user.id, error = %e, "failed to load received requests");
        ApiError::bad_request(e)
    })?;

    tracing::debug!(user_id = %user.id, count = requests.len(), "received requests");
    Ok(Json(ApiResponse::ok("User connection received", requests)))
}

// Accepted connections, resolved to the other party
pub async fn connections<S: SocialStore + 'static>(
    State(state): State<Arc<ServerState<S>>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<Vec<UserProfile>> {
    let rows = state.store.accepted_connections(&user.id).await.map_err(|e| {
        tracing::error!(user_id = %user.id, error = %e, "failed to load connections");
        ApiError::bad_request(e)
    })?;

    let data = connection_counterparts(&user.id, rows);

    tracing::debug!(user_id = %user.id, count = data.len(), "connections");
    Ok(Json(ApiResponse::ok(
        format!("{}, connections", user.first_name),
        data,
    )))
}

/// Discovery feed: everyone except the user and anyone they share a
/// connection record with, whatever its status.
///
/// Failures answer 401 rather than the 400 used by the other two endpoints.
pub async fn feed<S: SocialStore + 'static>(
    State(state): State<Arc<ServerState<S>>>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Vec<UserProfile>> {
    let Query(pairs) = query.map_err(ApiError::unauthorized)?;
    let pagination = Pagination::from_query(&FeedQuery::from_pairs(pairs));

    let edges = state.store.connection_edges(&user.id).await.map_err(|e| {
        tracing::error!(user_id = %user.id, error = %e, "failed to load connection edges");
        ApiError::unauthorized(e)
    })?;
    let hidden = feed_exclusion_set(&user.id, &edges);

    let users = state
        .store
        .feed_users(&hidden, pagination)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "failed to load feed");
            ApiError::unauthorized(e)
        })?;

    tracing::debug!(
        user_id = %user.id,
        page = pagination.page,
        limit = pagination.limit,
        hidden = hidden.len(),
        count = users.len(),
        "feed"
    );
    Ok(Json(ApiResponse::ok("user feed", users)))
}

async fn health_check() -> &'static str {
    "OK"
}

// Create the user-facing router
pub fn user_router<S: SocialStore + 'static>(state: Arc<ServerState<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/user/request/received", get(received_requests::<S>))
        .route("/user/connections", get(connections::<S>))
        .route("/feed", get(feed::<S>))
        .with_state(state)
}
