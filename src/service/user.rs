use std::collections::BTreeSet;

use chrono::Utc;
use entity::{bookmark, follow, like, post, post_tag, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{UserProfile, UserSummary};
use crate::{
    error::{is_unique_violation, ApiError},
    storage::{avatar_path, decode_data_url, ObjectStorage, MAX_AVATAR_BYTES},
};

/// Likes and bookmarks sampled (each) when building the caller's interest tags.
pub const SUGGESTION_SAMPLE: u64 = 10;
/// Users returned by a suggestion query.
pub const SUGGESTION_LIMIT: u64 = 4;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct UsernameInput {
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowInput {
    pub user_id: i32,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadAvatarInput {
    #[validate(length(min = 1))]
    pub image_as_data_url: String,
    #[validate(length(min = 1))]
    pub username: String,
}

pub struct UserQuery;

impl UserQuery {
    pub async fn find_by_username(
        db: &DbConn,
        username: &str,
    ) -> Result<Option<user::Model>, ApiError> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?)
    }

    pub async fn profile(
        db: &DbConn,
        viewer: Option<i32>,
        username: &str,
    ) -> Result<UserProfile, ApiError> {
        let user = Self::find_by_username(db, username)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("no user named `{username}`")))?;

        let posts_count = user.find_related(post::Entity).count(db).await?;
        let followers_count = follow::Entity::find()
            .filter(follow::Column::FollowingId.eq(user.id))
            .count(db)
            .await?;
        let following_count = follow::Entity::find()
            .filter(follow::Column::FollowerId.eq(user.id))
            .count(db)
            .await?;
        let followed_by_me = match viewer {
            Some(viewer) => follow::Entity::find_by_id((viewer, user.id))
                .one(db)
                .await?
                .is_some(),
            None => false,
        };

        Ok(UserProfile {
            id: user.id,
            name: user.name,
            username: user.username,
            image: user.image,
            posts_count,
            followers_count,
            following_count,
            followed_by_me,
        })
    }

    pub async fn followers(db: &DbConn, user_id: i32) -> Result<Vec<UserSummary>, ApiError> {
        let user = find_user(db, user_id).await?;
        Ok(user
            .find_linked(user::FollowedByLink)
            .all(db)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    pub async fn following(db: &DbConn, user_id: i32) -> Result<Vec<UserSummary>, ApiError> {
        let user = find_user(db, user_id).await?;
        Ok(user
            .find_linked(user::FollowingLink)
            .all(db)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    /// Up to [`SUGGESTION_LIMIT`] other users who liked or bookmarked posts sharing a tag
    /// with posts the caller liked or bookmarked.
    ///
    /// Two steps: gather interest tags from a bounded sample of the caller's likes and
    /// bookmarks, then pick users with any like/bookmark on a post carrying one of them.
    /// There is no scoring; matching several tags does not rank a user higher.
    #[instrument(skip(db))]
    pub async fn suggestions(db: &DbConn, user_id: i32) -> Result<Vec<UserSummary>, ApiError> {
        let liked: Vec<i32> = like::Entity::find()
            .select_only()
            .column(like::Column::PostId)
            .filter(like::Column::UserId.eq(user_id))
            .order_by_desc(like::Column::CreatedAt)
            .limit(SUGGESTION_SAMPLE)
            .into_tuple()
            .all(db)
            .await?;
        let bookmarked: Vec<i32> = bookmark::Entity::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .limit(SUGGESTION_SAMPLE)
            .into_tuple()
            .all(db)
            .await?;

        let interest_posts: BTreeSet<i32> = liked.into_iter().chain(bookmarked).collect();
        if interest_posts.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<i32> = post_tag::Entity::find()
            .select_only()
            .column(post_tag::Column::TagId)
            .filter(post_tag::Column::PostId.is_in(interest_posts))
            .distinct()
            .into_tuple()
            .all(db)
            .await?;
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tagged_posts = || {
            post_tag::Entity::find()
                .select_only()
                .column(post_tag::Column::PostId)
                .filter(post_tag::Column::TagId.is_in(tag_ids.iter().copied()))
                .into_query()
        };
        let likers = like::Entity::find()
            .select_only()
            .column(like::Column::UserId)
            .filter(like::Column::PostId.in_subquery(tagged_posts()))
            .into_query();
        let bookmarkers = bookmark::Entity::find()
            .select_only()
            .column(bookmark::Column::UserId)
            .filter(bookmark::Column::PostId.in_subquery(tagged_posts()))
            .into_query();

        Ok(user::Entity::find()
            .filter(user::Column::Id.ne(user_id))
            .filter(
                Condition::any()
                    .add(user::Column::Id.in_subquery(likers))
                    .add(user::Column::Id.in_subquery(bookmarkers)),
            )
            .order_by_asc(user::Column::Id)
            .limit(SUGGESTION_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }
}

pub struct UserMutation;

impl UserMutation {
    /// Adds the edge `user_id -> target_id`. Following someone twice is a no-op.
    pub async fn follow(db: &DbConn, user_id: i32, target_id: i32) -> Result<(), ApiError> {
        if user_id == target_id {
            return Err(ApiError::BadRequest("you cannot follow yourself".to_owned()));
        }
        find_user(db, target_id).await?;

        if follow::Entity::find_by_id((user_id, target_id))
            .one(db)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let res = follow::ActiveModel {
            follower_id: Set(user_id),
            following_id: Set(target_id),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await;
        match res {
            Ok(_) => {
                info!(follower = user_id, following = target_id, "followed");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn unfollow(db: &DbConn, user_id: i32, target_id: i32) -> Result<(), ApiError> {
        if user_id == target_id {
            return Err(ApiError::BadRequest("you cannot unfollow yourself".to_owned()));
        }

        let res = follow::Entity::delete_by_id((user_id, target_id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ApiError::NotFound("you are not following this user".to_owned()));
        }
        Ok(())
    }

    /// Decode the data URL, upload it as `avatars/<username>.png` and store the public URL
    /// on the user. A failed upload leaves the user untouched.
    #[instrument(skip(db, storage, caller, input), fields(username = %input.username))]
    pub async fn upload_avatar(
        db: &DbConn,
        storage: &dyn ObjectStorage,
        caller: &user::Model,
        input: UploadAvatarInput,
    ) -> Result<user::Model, ApiError> {
        if caller.username != input.username {
            return Err(ApiError::Forbidden(
                "you can only change your own avatar".to_owned(),
            ));
        }

        let bytes = decode_data_url(&input.image_as_data_url)
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(ApiError::BadRequest(format!(
                "image is larger than {} bytes",
                MAX_AVATAR_BYTES
            )));
        }

        let stored = storage
            .upload(&avatar_path(&input.username), bytes, "image/png")
            .await
            .map_err(|err| {
                error!(error = %err, "avatar upload failed");
                ApiError::Internal("upload file fail to storage".to_owned())
            })?;

        let mut user: user::ActiveModel = caller.clone().into();
        user.image = Set(Some(storage.public_url(&stored)));
        Ok(user.update(db).await?)
    }
}

async fn find_user(db: &DbConn, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))
}
