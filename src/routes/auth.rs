use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use serde::Deserialize;

use crate::config::Config;
use crate::constants::{
    DEFAULT_THEME, ERR_INVALID_EMAIL, ERR_INVALID_USERNAME, ERR_MISSING_LOGIN_FIELDS,
    ERR_MISSING_REGISTER_FIELDS, ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN, SESSION_COOKIE_NAME,
};
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::security::{encode_session, hash_password, verify_password, Session};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the signed session cookie for a user
fn session_cookie(user: &User, config: &Config) -> Cookie<'static> {
    let session = Session::new(user.id, &user.username, config.session_max_age_secs);
    let token = encode_session(&session, &config.session_secret);

    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .max_age(cookie::time::Duration::seconds(config.session_max_age_secs))
        .build()
}

/// Register a new account and sign it in
///
/// Returns 409 Conflict if the username or email is already in use.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(CookieJar, Json<User>)> {
    let username = payload.username.trim();
    let email = payload.email.trim();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_REGISTER_FIELDS.to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()));
    }
    if !User::validate_username(username) {
        return Err(AppError::InvalidInput(ERR_INVALID_USERNAME.to_string()));
    }
    if !User::validate_email(email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }

    if state.users.get_by_username(username).await?.is_some() {
        return Err(AppError::UsernameTaken);
    }
    if state.users.get_by_email(email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::PasswordHash(e.to_string()))??;

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        display_name: username.to_string(),
        theme: DEFAULT_THEME.to_string(),
    };

    // A concurrent registration can still win the race past the checks above
    let user = match state.users.create(&new_user).await {
        Ok(user) => user,
        Err(e) if e.is_unique_violation() => {
            return match state.users.get_by_username(username).await? {
                Some(_) => Err(AppError::UsernameTaken),
                None => Err(AppError::EmailTaken),
            };
        }
        Err(e) => return Err(e),
    };

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let jar = jar.add(session_cookie(&user, &state.config));
    Ok((jar, Json(user)))
}

/// Sign in with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<User>)> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_LOGIN_FIELDS.to_string()));
    }

    let user = state
        .users
        .get_by_email(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password = payload.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;

    if !valid {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let jar = jar.add(session_cookie(&user, &state.config));
    Ok((jar, Json(user)))
}

/// Clear the session cookie and send the browser home
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));
    (jar, Redirect::to("/"))
}
