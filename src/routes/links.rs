use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Redirect,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::constants::{
    ERR_INVALID_POSITION, ERR_INVALID_URL, ERR_MISSING_LINK_FIELDS, ERR_TITLE_TOO_LONG,
    MAX_LINK_POSITION, MAX_TITLE_LEN,
};
use crate::error::{AppError, Result};
use crate::models::{link::normalize_icon, CreateLinkRequest, Link, NewLink, UpdateLinkRequest};
use crate::routes::{header_str, CurrentUser};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub link: Link,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteLinkResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
}

/// Trim and check a title/URL pair, returning the cleaned values
fn validate_link_fields(title: &str, url: &str) -> Result<(String, String)> {
    let title = title.trim();
    let url = url.trim();

    if title.is_empty() || url.is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_LINK_FIELDS.to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(ERR_TITLE_TOO_LONG.to_string()));
    }
    if !Link::validate_url(url) {
        return Err(AppError::InvalidInput(ERR_INVALID_URL.to_string()));
    }

    Ok((title.to_string(), url.to_string()))
}

/// Reject positions outside `0..=MAX_LINK_POSITION`
fn validate_positions(positions: &BTreeMap<i64, i64>) -> Result<()> {
    if positions
        .values()
        .all(|position| (0..=MAX_LINK_POSITION).contains(position))
    {
        Ok(())
    } else {
        Err(AppError::InvalidInput(ERR_INVALID_POSITION.to_string()))
    }
}

/// Load a link and confirm the caller owns it
///
/// Links owned by someone else are reported as missing.
async fn owned_link(state: &AppState, user_id: i64, link_id: i64) -> Result<Link> {
    match state.links.get_by_id(link_id).await? {
        Some(link) if link.user_id == user_id => Ok(link),
        Some(_) => {
            tracing::warn!(user_id, link_id, "Attempt to access another user's link");
            Err(AppError::LinkNotFound)
        }
        None => Err(AppError::LinkNotFound),
    }
}

/// Append a new active link to the caller's list
pub async fn create_link(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateLinkRequest>, AppError>,
) -> Result<Json<CreateLinkResponse>> {
    let (title, url) = validate_link_fields(&payload.title, &payload.url)?;

    let link = state
        .links
        .create(&NewLink {
            user_id: current.user_id,
            title,
            url,
            icon: normalize_icon(payload.icon),
            is_active: true,
        })
        .await?;

    let count = state.links.count_by_user_id(current.user_id).await?;

    tracing::info!(link_id = link.id, user_id = current.user_id, "Link created");

    Ok(Json(CreateLinkResponse { link, count }))
}

/// Replace a link's title, URL, icon and active flag
pub async fn update_link(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Path(link_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateLinkRequest>, AppError>,
) -> Result<Json<Link>> {
    let mut link = owned_link(&state, current.user_id, link_id).await?;
    let (title, url) = validate_link_fields(&payload.title, &payload.url)?;

    link.title = title;
    link.url = url;
    link.icon = normalize_icon(payload.icon);
    link.is_active = payload.is_active;

    state.links.update(&link).await?;

    tracing::info!(link_id, user_id = current.user_id, "Link updated");

    Ok(Json(link))
}

pub async fn delete_link(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Path(link_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<DeleteLinkResponse>> {
    owned_link(&state, current.user_id, link_id).await?;

    state.links.delete(link_id).await?;
    let count = state.links.count_by_user_id(current.user_id).await?;

    tracing::info!(link_id, user_id = current.user_id, "Link deleted");

    Ok(Json(DeleteLinkResponse { count }))
}

/// Apply a `{"<link id>": position}` map to the caller's links
pub async fn reorder_links(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Json(positions), _): WithRejection<Json<BTreeMap<i64, i64>>, AppError>,
) -> Result<Json<ReorderResponse>> {
    validate_positions(&positions)?;

    state
        .links
        .update_positions(current.user_id, &positions)
        .await?;

    tracing::info!(user_id = current.user_id, links = positions.len(), "Links reordered");

    Ok(Json(ReorderResponse { success: true }))
}

/// Record a click and redirect the visitor to the link's URL
pub async fn click_link(
    State(state): State<AppState>,
    WithRejection(Path(link_id), _): WithRejection<Path<i64>, AppError>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let link = state
        .links
        .get_by_id(link_id)
        .await?
        .ok_or(AppError::LinkNotFound)?;

    state.recorder.record_link_click(
        link.user_id,
        link.id,
        header_str(&headers, header::REFERER),
        header_str(&headers, header::USER_AGENT),
    );

    Ok(Redirect::temporary(&link.url))
}
