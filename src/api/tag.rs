use axum::{extract::State, Json};
use entity::tag;

use super::extract::{CurrentUser, ValidJson};
use crate::{
    service::{tag::CreateTagInput, TagMutation, TagQuery},
    ApiError, AppState,
};

pub(super) async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ValidJson(input): ValidJson<CreateTagInput>,
) -> Result<Json<tag::Model>, ApiError> {
    Ok(Json(TagMutation::create_tag(&state.conn, input).await?))
}

pub(super) async fn get_tags(State(state): State<AppState>) -> Result<Json<Vec<tag::Model>>, ApiError> {
    Ok(Json(TagQuery::all(&state.conn).await?))
}
