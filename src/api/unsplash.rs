use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use super::extract::{CurrentUser, ValidQuery};
use crate::{unsplash::PhotoPage, ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    #[validate(length(min = 3))]
    pub search_query: String,
}

pub(super) async fn get_images(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ValidQuery(input): ValidQuery<SearchInput>,
) -> Result<Json<PhotoPage>, ApiError> {
    let page = state
        .photos
        .search(&input.search_query)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "photo search failed");
            ApiError::Internal("unsplash api not working".to_owned())
        })?;
    Ok(Json(page))
}
