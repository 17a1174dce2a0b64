use axum::{extract::State, http::StatusCode, Json};
use entity::post;

use super::extract::{CurrentUser, MaybeUser, ValidJson, ValidQuery};
use crate::{
    service::{
        post::{
            CreatePostInput, FeedInput, PostIdInput, SlugInput, SubmitCommentInput,
            UpdateFeaturedImageInput,
        },
        CommentView, FeedPage, PostDetail, PostMutation, PostQuery, PostSummary,
    },
    ApiError, AppState,
};

pub(super) async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<CreatePostInput>,
) -> Result<Json<post::Model>, ApiError> {
    let post = PostMutation::create_post(&state.conn, user.id, input).await?;
    Ok(Json(post))
}

pub(super) async fn get_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ValidQuery(input): ValidQuery<FeedInput>,
) -> Result<Json<FeedPage>, ApiError> {
    let page = PostQuery::feed(&state.conn, viewer.id(), input.cursor).await?;
    Ok(Json(page))
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ValidQuery(input): ValidQuery<SlugInput>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = PostQuery::find_by_slug(&state.conn, viewer.id(), &input.slug).await?;
    Ok(Json(post))
}

pub(super) async fn like_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<PostIdInput>,
) -> Result<StatusCode, ApiError> {
    PostMutation::like(&state.conn, user.id, input.post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn dislike_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<PostIdInput>,
) -> Result<StatusCode, ApiError> {
    PostMutation::unlike(&state.conn, user.id, input.post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn bookmark_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<PostIdInput>,
) -> Result<StatusCode, ApiError> {
    PostMutation::bookmark(&state.conn, user.id, input.post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn remove_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<PostIdInput>,
) -> Result<StatusCode, ApiError> {
    PostMutation::remove_bookmark(&state.conn, user.id, input.post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn submit_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<SubmitCommentInput>,
) -> Result<Json<CommentView>, ApiError> {
    let comment = PostMutation::submit_comment(&state.conn, &user, input).await?;
    Ok(Json(comment))
}

pub(super) async fn get_comments(
    State(state): State<AppState>,
    ValidQuery(input): ValidQuery<PostIdInput>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let comments = PostQuery::comments(&state.conn, input.post_id).await?;
    Ok(Json(comments))
}

pub(super) async fn get_reading_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = PostQuery::reading_list(&state.conn, user.id).await?;
    Ok(Json(posts))
}

pub(super) async fn update_featured_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<UpdateFeaturedImageInput>,
) -> Result<Json<post::Model>, ApiError> {
    let post = PostMutation::update_featured_image(&state.conn, user.id, input).await?;
    Ok(Json(post))
}
