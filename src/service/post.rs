use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use entity::{bookmark, comment, like, post, post_tag, tag, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

use super::{AuthorSummary, CommentView, FeedPage, PostDetail, PostSummary, TagSummary};
use crate::{
    error::{is_unique_violation, ApiError},
    slug::slugify,
};

/// Posts per feed page.
pub const FEED_PAGE_SIZE: u64 = 10;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 20))]
    pub title: String,
    #[validate(length(min = 60))]
    pub description: String,
    #[validate(length(min = 100))]
    pub html: String,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct FeedInput {
    /// Id of the first post of the requested page, as returned in `nextCursor`
    pub cursor: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SlugInput {
    #[validate(length(min = 1))]
    pub slug: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostIdInput {
    pub post_id: i32,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommentInput {
    pub post_id: i32,
    #[validate(length(min = 3))]
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeaturedImageInput {
    pub post_id: i32,
    #[validate(url)]
    pub image_url: String,
}

pub struct PostQuery;

impl PostQuery {
    /// Newest-first feed page starting at `cursor` (inclusive).
    ///
    /// Fetches one row past the page size; when that extra row exists it is dropped from
    /// the page and its id becomes the next cursor. A cursor naming a missing post yields
    /// an empty, terminal page.
    #[instrument(skip(db))]
    pub async fn feed(
        db: &DbConn,
        viewer: Option<i32>,
        cursor: Option<i32>,
    ) -> Result<FeedPage, ApiError> {
        let mut select = post::Entity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(FEED_PAGE_SIZE + 1);

        if let Some(cursor) = cursor {
            let Some(anchor) = post::Entity::find_by_id(cursor).one(db).await? else {
                debug!(cursor, "feed cursor does not name a post");
                return Ok(FeedPage {
                    posts: Vec::new(),
                    next_cursor: None,
                });
            };
            select = select.filter(
                Condition::any()
                    .add(post::Column::CreatedAt.lt(anchor.created_at))
                    .add(
                        Condition::all()
                            .add(post::Column::CreatedAt.eq(anchor.created_at))
                            .add(post::Column::Id.lte(anchor.id)),
                    ),
            );
        }

        let mut posts = select.all(db).await?;
        let next_cursor = if posts.len() as u64 > FEED_PAGE_SIZE {
            posts.pop().map(|extra| extra.id)
        } else {
            None
        };

        Ok(FeedPage {
            posts: summarize(db, viewer, posts).await?,
            next_cursor,
        })
    }

    pub async fn find_by_slug(
        db: &DbConn,
        viewer: Option<i32>,
        slug: &str,
    ) -> Result<PostDetail, ApiError> {
        let post = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("no post with slug `{slug}`")))?;

        let author = post
            .find_related(user::Entity)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("post {} has no author", post.id)))?;
        let tags = post
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        let likes_count = post.find_related(like::Entity).count(db).await?;
        let liked = match viewer {
            Some(user_id) => like::Entity::find_by_id((user_id, post.id))
                .one(db)
                .await?
                .is_some(),
            None => false,
        };

        Ok(PostDetail {
            id: post.id,
            slug: post.slug,
            title: post.title,
            description: post.description,
            html: post.html,
            featured_image: post.featured_image,
            created_at: post.created_at,
            author_id: post.author_id,
            author: author.into(),
            tags: tags.into_iter().map(TagSummary::from).collect(),
            likes_count,
            liked,
        })
    }

    /// Every post written by `username`, newest first.
    pub async fn find_by_author(
        db: &DbConn,
        viewer: Option<i32>,
        username: &str,
    ) -> Result<Vec<PostSummary>, ApiError> {
        let author = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("no user named `{username}`")))?;

        let posts = author
            .find_related(post::Entity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(db)
            .await?;

        summarize(db, viewer, posts).await
    }

    /// The caller's bookmarks, most recently bookmarked first.
    pub async fn reading_list(db: &DbConn, user_id: i32) -> Result<Vec<PostSummary>, ApiError> {
        let posts = bookmark::Entity::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .order_by_desc(bookmark::Column::PostId)
            .find_also_related(post::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(_, post)| post)
            .collect();

        summarize(db, Some(user_id), posts).await
    }

    /// Comments on a post, newest first.
    pub async fn comments(db: &DbConn, post_id: i32) -> Result<Vec<CommentView>, ApiError> {
        find_post(db, post_id).await?;

        comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .find_also_related(user::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    ApiError::Internal(format!("comment {} has no author", comment.id))
                })?;
                Ok(CommentView {
                    id: comment.id,
                    text: comment.text,
                    created_at: comment.created_at,
                    author: author.into(),
                })
            })
            .collect()
    }
}

pub struct PostMutation;

impl PostMutation {
    #[instrument(skip(db, input), fields(title = %input.title))]
    pub async fn create_post(
        db: &DbConn,
        author_id: i32,
        input: CreatePostInput,
    ) -> Result<post::Model, ApiError> {
        let slug = slugify(&input.title);
        if slug.is_empty() {
            return Err(ApiError::BadRequest(
                "title must contain at least one letter or digit".to_owned(),
            ));
        }

        let taken = post::Entity::find()
            .filter(post::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(title_taken());
        }

        let tag_ids: BTreeSet<i32> = input.tag_ids.iter().copied().collect();
        if !tag_ids.is_empty() {
            let found = tag::Entity::find()
                .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
                .count(db)
                .await?;
            if found != tag_ids.len() as u64 {
                return Err(ApiError::NotFound("one or more tags do not exist".to_owned()));
            }
        }

        let post = post::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            html: Set(input.html),
            slug: Set(slug),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                title_taken()
            } else {
                err.into()
            }
        })?;

        if !tag_ids.is_empty() {
            post_tag::Entity::insert_many(tag_ids.into_iter().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(post.id),
                tag_id: Set(tag_id),
            }))
            .exec_without_returning(db)
            .await?;
        }

        info!(post_id = post.id, slug = %post.slug, "post created");
        Ok(post)
    }

    /// Only the author may change a post's featured image.
    pub async fn update_featured_image(
        db: &DbConn,
        user_id: i32,
        input: UpdateFeaturedImageInput,
    ) -> Result<post::Model, ApiError> {
        let post = find_post(db, input.post_id).await?;
        if post.author_id != user_id {
            return Err(ApiError::Forbidden(
                "only the author can change the featured image".to_owned(),
            ));
        }

        let mut post: post::ActiveModel = post.into();
        post.featured_image = Set(Some(input.image_url));
        Ok(post.update(db).await?)
    }

    /// Likes are unique per (user, post); liking twice is a no-op.
    pub async fn like(db: &DbConn, user_id: i32, post_id: i32) -> Result<(), ApiError> {
        find_post(db, post_id).await?;
        if like::Entity::find_by_id((user_id, post_id))
            .one(db)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let res = like::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await;
        ignore_duplicate(res)
    }

    pub async fn unlike(db: &DbConn, user_id: i32, post_id: i32) -> Result<(), ApiError> {
        let res = like::Entity::delete_by_id((user_id, post_id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ApiError::NotFound("like not found".to_owned()));
        }
        Ok(())
    }

    /// Bookmarks are unique per (user, post); bookmarking twice is a no-op.
    pub async fn bookmark(db: &DbConn, user_id: i32, post_id: i32) -> Result<(), ApiError> {
        find_post(db, post_id).await?;
        if bookmark::Entity::find_by_id((user_id, post_id))
            .one(db)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let res = bookmark::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await;
        ignore_duplicate(res)
    }

    pub async fn remove_bookmark(db: &DbConn, user_id: i32, post_id: i32) -> Result<(), ApiError> {
        let res = bookmark::Entity::delete_by_id((user_id, post_id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ApiError::NotFound("bookmark not found".to_owned()));
        }
        Ok(())
    }

    pub async fn submit_comment(
        db: &DbConn,
        author: &user::Model,
        input: SubmitCommentInput,
    ) -> Result<CommentView, ApiError> {
        find_post(db, input.post_id).await?;

        let comment = comment::ActiveModel {
            text: Set(input.text),
            user_id: Set(author.id),
            post_id: Set(input.post_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(CommentView {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author: AuthorSummary::from(author.clone()),
        })
    }
}

async fn find_post(db: &DbConn, post_id: i32) -> Result<post::Model, ApiError> {
    post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))
}

fn title_taken() -> ApiError {
    ApiError::Conflict("a post with this title already exists".to_owned())
}

fn ignore_duplicate<M>(res: Result<M, sea_orm::DbErr>) -> Result<(), ApiError> {
    match res {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Attach author, tags and the caller's bookmark flag to a list of posts, keeping order.
async fn summarize(
    db: &DbConn,
    viewer: Option<i32>,
    posts: Vec<post::Model>,
) -> Result<Vec<PostSummary>, ApiError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let authors = posts.load_one(user::Entity, db).await?;
    let tags = posts
        .load_many_to_many(tag::Entity, post_tag::Entity, db)
        .await?;

    let bookmarked: HashSet<i32> = match viewer {
        Some(user_id) => bookmark::Entity::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.is_in(posts.iter().map(|p| p.id)))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    posts
        .into_iter()
        .zip(authors)
        .zip(tags)
        .map(|((post, author), mut tags)| {
            let author = author
                .ok_or_else(|| ApiError::Internal(format!("post {} has no author", post.id)))?;
            tags.sort_by(|a, b| a.name.cmp(&b.name));

            Ok(PostSummary {
                bookmarked: bookmarked.contains(&post.id),
                id: post.id,
                slug: post.slug,
                title: post.title,
                description: post.description,
                featured_image: post.featured_image,
                created_at: post.created_at,
                author: author.into(),
                tags: tags.into_iter().map(TagSummary::from).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, description: &str, html: &str) -> CreatePostInput {
        CreatePostInput {
            title: title.to_owned(),
            description: description.to_owned(),
            html: html.to_owned(),
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn create_post_input_minimums() {
        let description = "d".repeat(60);
        let html = "h".repeat(100);

        assert!(input("Understanding Concurrency Models In Practice", &description, &html)
            .validate()
            .is_ok());

        let errors = input("Too short", &"d".repeat(59), &"h".repeat(99))
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("html"));
    }

    #[test]
    fn comment_needs_three_chars() {
        let short = SubmitCommentInput {
            post_id: 1,
            text: "hi".to_owned(),
        };
        assert!(short.validate().is_err());

        let ok = SubmitCommentInput {
            post_id: 1,
            text: "nice".to_owned(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn featured_image_must_be_a_url() {
        let bad = UpdateFeaturedImageInput {
            post_id: 1,
            image_url: "not a url".to_owned(),
        };
        assert!(bad.validate().is_err());

        let good = UpdateFeaturedImageInput {
            post_id: 1,
            image_url: "https://images.unsplash.com/photo-1".to_owned(),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn input_reads_camel_case() {
        let input: CreatePostInput = serde_json::from_value(serde_json::json!({
            "title": "t",
            "description": "d",
            "html": "h",
            "tagIds": [3, 1]
        }))
        .unwrap();
        assert_eq!(input.tag_ids, vec![3, 1]);
    }
}
