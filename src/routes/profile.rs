use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::constants::{DEFAULT_THEME, ERR_INVALID_AVATAR_URL};
use crate::error::{AppError, Result};
use crate::models::{Link, ProfileUpdate, PublicProfile, User};
use crate::routes::{header_str, CurrentUser};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub profile: PublicProfile,
    pub links: Vec<Link>,
}

/// Public profile page data: profile fields plus active links in order
///
/// Records a page view for the owner without waiting on the write.
pub async fn public_profile(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
    headers: HeaderMap,
) -> Result<Json<PublicProfileResponse>> {
    let user = state
        .users
        .get_by_username(&username)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    let links = state.links.get_active_by_user_id(user.id).await?;

    state.recorder.record_page_view(
        user.id,
        header_str(&headers, header::REFERER),
        header_str(&headers, header::USER_AGENT),
    );

    tracing::debug!(user_id = user.id, links = links.len(), "Profile served");

    Ok(Json(PublicProfileResponse {
        profile: PublicProfile::from(&user),
        links,
    }))
}

/// Update the signed-in user's display name, bio, avatar and theme
///
/// A blank display name falls back to the username and a blank theme to the
/// default theme.
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Json(payload), _): WithRejection<Json<ProfileUpdate>, AppError>,
) -> Result<Json<User>> {
    let avatar_url = payload.avatar_url.trim().to_string();
    if !avatar_url.is_empty() && !Link::validate_url(&avatar_url) {
        return Err(AppError::InvalidInput(ERR_INVALID_AVATAR_URL.to_string()));
    }

    let display_name = match payload.display_name.trim() {
        "" => current.username.clone(),
        name => name.to_string(),
    };
    let theme = match payload.theme.trim() {
        "" => DEFAULT_THEME.to_string(),
        theme => theme.to_string(),
    };

    let profile = ProfileUpdate {
        display_name,
        bio: payload.bio.trim().to_string(),
        avatar_url,
        theme,
    };

    state.users.update_profile(current.user_id, &profile).await?;

    let user = state
        .users
        .get_by_id(current.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(user))
}
