//! Procedure implementations, one module per group, in the `Query` / `Mutation` split.
//!
//! Services take a connection plus the caller's user id (when the procedure needs one) and
//! return wire-ready views. Input structs carry their own validation rules; the HTTP layer
//! runs them before calling in.

pub mod post;
pub mod session;
pub mod tag;
pub mod user;

use chrono::{DateTime, Utc};
use entity::{tag as tag_entity, user as user_entity};
use serde::Serialize;

pub use post::{PostMutation, PostQuery};
pub use session::{SessionMutation, SessionQuery};
pub use tag::{TagMutation, TagQuery};
pub use user::{UserMutation, UserQuery};

/// Author shown next to posts and comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub name: String,
    pub username: String,
    pub image: Option<String>,
}

impl From<user_entity::Model> for AuthorSummary {
    fn from(user: user_entity::Model) -> Self {
        Self {
            name: user.name,
            username: user.username,
            image: user.image,
        }
    }
}

/// User card used by follower lists and suggestions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
}

impl From<user_entity::Model> for UserSummary {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            image: user.image,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<tag_entity::Model> for TagSummary {
    fn from(tag: tag_entity::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// A post as it appears in lists (feed, profile, reading list).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub tags: Vec<TagSummary>,
    /// Whether the caller has bookmarked it; always false for anonymous callers
    pub bookmarked: bool,
}

/// A single post page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub html: String,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: i32,
    pub author: AuthorSummary,
    pub tags: Vec<TagSummary>,
    pub likes_count: u64,
    /// Whether the caller has liked it; always false for anonymous callers
    pub liked: bool,
}

/// One feed page. `next_cursor` is `None` on the last page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<PostSummary>,
    pub next_cursor: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub followed_by_me: bool,
}
