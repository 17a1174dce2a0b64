//! The `auth` procedure group: profiles, avatars and the follow graph.

use axum::{extract::State, http::StatusCode, Json};
use entity::user;

use super::extract::{CurrentUser, MaybeUser, ValidJson, ValidQuery};
use crate::{
    service::{
        user::{FollowInput, UploadAvatarInput, UsernameInput},
        PostQuery, PostSummary, UserMutation, UserProfile, UserQuery, UserSummary,
    },
    ApiError, AppState,
};

pub(super) async fn get_user_profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ValidQuery(input): ValidQuery<UsernameInput>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = UserQuery::profile(&state.conn, viewer.id(), &input.username).await?;
    Ok(Json(profile))
}

pub(super) async fn get_user_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ValidQuery(input): ValidQuery<UsernameInput>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = PostQuery::find_by_author(&state.conn, viewer.id(), &input.username).await?;
    Ok(Json(posts))
}

pub(super) async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<UploadAvatarInput>,
) -> Result<Json<user::Model>, ApiError> {
    let user = UserMutation::upload_avatar(&state.conn, state.storage.as_ref(), &user, input).await?;
    Ok(Json(user))
}

pub(super) async fn get_suggestions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = UserQuery::suggestions(&state.conn, user.id).await?;
    Ok(Json(users))
}

pub(super) async fn follow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<FollowInput>,
) -> Result<StatusCode, ApiError> {
    UserMutation::follow(&state.conn, user.id, input.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn unfollow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<FollowInput>,
) -> Result<StatusCode, ApiError> {
    UserMutation::unfollow(&state.conn, user.id, input.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_all_followers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(UserQuery::followers(&state.conn, user.id).await?))
}

pub(super) async fn get_all_following(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(UserQuery::following(&state.conn, user.id).await?))
}
