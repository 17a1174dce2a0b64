//! HTTP surface: every procedure is reachable at `/trpc/<group>.<procedure>`.
//!
//! Queries are `GET` with their input in the query string, mutations are `POST` with a
//! JSON body. Failures are rendered by [`ApiError`](crate::ApiError) as
//! `{ "code", "message" }`.

pub mod extract;

mod auth;
mod post;
mod session;
mod tag;
mod unsplash;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::{storage::MAX_AVATAR_BYTES, AppState};

/// Request body limit for `auth.uploadAvatar`: the base64 form of the largest accepted
/// avatar, plus room for the data-URL header and the JSON envelope.
pub const AVATAR_BODY_LIMIT: usize = MAX_AVATAR_BYTES.div_ceil(3) * 4 + 16 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/trpc/post.createPost", post(post::create_post))
        .route("/trpc/post.getPosts", get(post::get_posts))
        .route("/trpc/post.getPost", get(post::get_post))
        .route("/trpc/post.likePost", post(post::like_post))
        .route("/trpc/post.dislikePost", post(post::dislike_post))
        .route("/trpc/post.bookmarkPost", post(post::bookmark_post))
        .route("/trpc/post.removeBookmark", post(post::remove_bookmark))
        .route("/trpc/post.submitComment", post(post::submit_comment))
        .route("/trpc/post.getComments", get(post::get_comments))
        .route("/trpc/post.getReadingList", get(post::get_reading_list))
        .route(
            "/trpc/post.updatePostFeaturedImage",
            post(post::update_featured_image),
        )
        .route("/trpc/auth.getUserProfile", get(auth::get_user_profile))
        .route("/trpc/auth.getUserPost", get(auth::get_user_posts))
        .route(
            "/trpc/auth.uploadAvatar",
            post(auth::upload_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
        )
        .route("/trpc/auth.getSuggestions", get(auth::get_suggestions))
        .route("/trpc/auth.followUser", post(auth::follow_user))
        .route("/trpc/auth.unfollowUser", post(auth::unfollow_user))
        .route("/trpc/auth.getAllFollowers", get(auth::get_all_followers))
        .route("/trpc/auth.getAllFollowing", get(auth::get_all_following))
        .route("/trpc/tag.createTag", post(tag::create_tag))
        .route("/trpc/tag.getTags", get(tag::get_tags))
        .route("/trpc/unsplash.getImages", get(unsplash::get_images))
        .route("/auth/signin/google", get(session::sign_in))
        .route("/auth/callback/google", get(session::callback))
        .route("/auth/signout", post(session::sign_out))
        .route("/auth/session", get(session::current))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
