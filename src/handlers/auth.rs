use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use super::error::{ApiError, AuthError};
use super::ServerState;
use crate::models::User;
use crate::services::SocialStore;

const SESSION_COOKIE: &str = "token";

/// The logged-in user, resolved from the session token on the request.
///
/// The `token` cookie wins; `Authorization: Bearer` is read only when no
/// cookie carries a token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<Arc<ServerState<S>>> for AuthenticatedUser
where
    S: SocialStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthError::MissingToken)?;

        let user = state
            .store
            .find_session_user(&token)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidSession)?;

        tracing::debug!(user_id = %user.id, "authenticated request");
        Ok(AuthenticatedUser(user))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
