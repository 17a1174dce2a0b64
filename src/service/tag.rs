use entity::tag;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    error::{is_unique_violation, ApiError},
    slug::slugify,
};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(length(min = 10))]
    pub description: String,
}

pub struct TagQuery;

impl TagQuery {
    pub async fn all(db: &DbConn) -> Result<Vec<tag::Model>, ApiError> {
        Ok(tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?)
    }
}

pub struct TagMutation;

impl TagMutation {
    /// Tag names are unique; the slug is derived from the name.
    pub async fn create_tag(db: &DbConn, input: CreateTagInput) -> Result<tag::Model, ApiError> {
        let existing = tag::Entity::find()
            .filter(tag::Column::Name.eq(input.name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(tag_exists());
        }

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(ApiError::BadRequest(
                "tag name must contain at least one letter or digit".to_owned(),
            ));
        }

        let tag = tag::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                tag_exists()
            } else {
                err.into()
            }
        })?;

        info!(tag_id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }
}

fn tag_exists() -> ApiError {
    ApiError::Conflict("Tag already exist".to_owned())
}
