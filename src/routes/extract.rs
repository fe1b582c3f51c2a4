use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::constants::SESSION_COOKIE_NAME;
use crate::error::AppError;
use crate::security::decode_session;
use crate::AppState;

/// The signed-in user, taken from a valid session cookie
///
/// Rejects with 401 when the cookie is missing, forged or expired, or when
/// the account it names no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE_NAME).ok_or(AppError::Unauthorized)?;

        let session = decode_session(cookie.value(), &state.config.session_secret)
            .ok_or(AppError::Unauthorized)?;

        if state.users.get_by_id(session.user_id).await?.is_none() {
            tracing::warn!(user_id = session.user_id, "Session for a deleted user");
            return Err(AppError::Unauthorized);
        }

        Ok(CurrentUser {
            user_id: session.user_id,
            username: session.username,
        })
    }
}
