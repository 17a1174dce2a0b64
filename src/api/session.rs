//! OAuth sign-in and session endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use entity::user;
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tracing::{error, warn};
use uuid::Uuid;

use super::extract::{CurrentUser, SessionToken, OAUTH_STATE_COOKIE, SESSION_COOKIE};
use crate::{service::SessionMutation, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub user: user::Model,
}

#[derive(Debug, Serialize)]
pub struct CurrentSession {
    pub user: user::Model,
}

fn http_only(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value)).path("/").http_only(true).build()
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

pub(super) async fn sign_in(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Redirect, ApiError> {
    let csrf = Uuid::new_v4().simple().to_string();
    let url = state.identity.authorization_url(&csrf).map_err(|err| {
        error!(error = %err, "cannot build authorization url");
        ApiError::Internal("identity provider not available".to_owned())
    })?;

    cookies.add(http_only(OAUTH_STATE_COOKIE, csrf));
    Ok(Redirect::to(&url))
}

pub(super) async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> Result<Json<SignedIn>, ApiError> {
    let expected = cookies
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    cookies.remove(expired(OAUTH_STATE_COOKIE));
    if expected.as_deref() != Some(params.state.as_str()) {
        warn!("oauth state mismatch");
        return Err(ApiError::BadRequest("oauth state mismatch".to_owned()));
    }

    let profile = state
        .identity
        .exchange_code(&params.code)
        .await
        .map_err(|err| {
            error!(error = %err, "code exchange failed");
            ApiError::Internal("identity provider not available".to_owned())
        })?;

    let (session, user) =
        SessionMutation::sign_in(&state.conn, state.identity.name(), &profile).await?;
    cookies.add(http_only(SESSION_COOKIE, session.token.clone()));

    Ok(Json(SignedIn {
        token: session.token,
        user,
    }))
}

pub(super) async fn sign_out(
    State(state): State<AppState>,
    cookies: Cookies,
    SessionToken(token): SessionToken,
) -> Result<StatusCode, ApiError> {
    SessionMutation::sign_out(&state.conn, &token).await?;
    cookies.remove(expired(SESSION_COOKIE));
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn current(CurrentUser(user): CurrentUser) -> Json<CurrentSession> {
    Json(CurrentSession { user })
}
