mod common;

use bloggery::{
    service::{
        post::{SubmitCommentInput, UpdateFeaturedImageInput},
        PostMutation, PostQuery,
    },
    ApiError,
};
use common::{create_tag, create_user, post_input, setup};
use pretty_assertions::assert_eq;
use validator::Validate;

#[tokio::test]
async fn create_post_derives_slug() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;

    let input = post_input("Understanding Concurrency Models In Practice");
    assert!(input.validate().is_ok());

    let post = PostMutation::create_post(db, author.id, input).await.unwrap();
    assert_eq!(post.slug, "understanding-concurrency-models-in-practice");
    assert_eq!(post.author_id, author.id);
    assert_eq!(post.featured_image, None);

    let detail = PostQuery::find_by_slug(db, None, &post.slug).await.unwrap();
    assert_eq!(detail.id, post.id);
    assert_eq!(detail.author.username, "ada");
    assert_eq!(detail.likes_count, 0);
    assert!(!detail.liked);
    assert!(detail.tags.is_empty());
}

#[tokio::test]
async fn non_latin_title_gets_a_transliterated_slug() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;

    let input = post_input("Понимание моделей конкурентности");
    assert!(input.validate().is_ok());

    let post = PostMutation::create_post(db, author.id, input).await.unwrap();
    assert!(post.slug.starts_with("ponimanie-"), "{}", post.slug);

    let detail = PostQuery::find_by_slug(db, None, &post.slug).await.unwrap();
    assert_eq!(detail.id, post.id);

    let accented = PostMutation::create_post(
        db,
        author.id,
        post_input("Café crème for the long debugging night"),
    )
    .await
    .unwrap();
    assert_eq!(accented.slug, "cafe-creme-for-the-long-debugging-night");
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;

    let title = "Understanding Concurrency Models In Practice";
    PostMutation::create_post(db, author.id, post_input(title))
        .await
        .unwrap();

    let err = PostMutation::create_post(db, author.id, post_input(title))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");
    assert_eq!(err.code(), "CONFLICT");

    // Same slug from a differently punctuated title
    let err = PostMutation::create_post(
        db,
        author.id,
        post_input("understanding concurrency models, in practice!"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn short_fields_fail_validation() {
    let mut input = post_input("Too short");
    input.description = "brief".to_owned();
    input.html = "<p>hi</p>".to_owned();

    let errors = input.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("title"));
    assert!(fields.contains_key("description"));
    assert!(fields.contains_key("html"));
}

#[tokio::test]
async fn post_tags_are_attached() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;
    let rust = create_tag(db, "rust").await;
    let async_tag = create_tag(db, "async").await;

    let mut input = post_input("Understanding Concurrency Models In Practice");
    input.tag_ids = vec![rust.id, async_tag.id, rust.id];
    let post = PostMutation::create_post(db, author.id, input).await.unwrap();

    let detail = PostQuery::find_by_slug(db, None, &post.slug).await.unwrap();
    let names: Vec<_> = detail.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["async", "rust"]);
}

#[tokio::test]
async fn unknown_tag_is_not_found() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;

    let mut input = post_input("Understanding Concurrency Models In Practice");
    input.tag_ids = vec![42];
    let err = PostMutation::create_post(db, author.id, input)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");

    let err = PostQuery::find_by_slug(db, None, "understanding-concurrency-models-in-practice")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn only_the_author_sets_the_featured_image() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;
    let other = create_user(db, "bob").await;
    let post = PostMutation::create_post(
        db,
        author.id,
        post_input("Understanding Concurrency Models In Practice"),
    )
    .await
    .unwrap();

    let input = |post_id| UpdateFeaturedImageInput {
        post_id,
        image_url: "https://images.test/photo.jpg".to_owned(),
    };

    let err = PostMutation::update_featured_image(db, other.id, input(post.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{err:?}");

    let err = PostMutation::update_featured_image(db, author.id, input(post.id + 100))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");

    let updated = PostMutation::update_featured_image(db, author.id, input(post.id))
        .await
        .unwrap();
    assert_eq!(
        updated.featured_image.as_deref(),
        Some("https://images.test/photo.jpg")
    );
}

#[tokio::test]
async fn liked_flag_is_caller_relative() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;
    let reader = create_user(db, "bob").await;
    let post = PostMutation::create_post(
        db,
        author.id,
        post_input("Understanding Concurrency Models In Practice"),
    )
    .await
    .unwrap();

    PostMutation::like(db, reader.id, post.id).await.unwrap();

    let as_reader = PostQuery::find_by_slug(db, Some(reader.id), &post.slug)
        .await
        .unwrap();
    assert_eq!(as_reader.likes_count, 1);
    assert!(as_reader.liked);

    let as_author = PostQuery::find_by_slug(db, Some(author.id), &post.slug)
        .await
        .unwrap();
    assert_eq!(as_author.likes_count, 1);
    assert!(!as_author.liked);

    let anonymous = PostQuery::find_by_slug(db, None, &post.slug).await.unwrap();
    assert!(!anonymous.liked);
}

#[tokio::test]
async fn comments_newest_first() {
    let db = &setup().await;
    let author = create_user(db, "ada").await;
    let reader = create_user(db, "bob").await;
    let post = PostMutation::create_post(
        db,
        author.id,
        post_input("Understanding Concurrency Models In Practice"),
    )
    .await
    .unwrap();

    let comment = |text: &str| SubmitCommentInput {
        post_id: post.id,
        text: text.to_owned(),
    };
    let first = PostMutation::submit_comment(db, &reader, comment("first!"))
        .await
        .unwrap();
    let second = PostMutation::submit_comment(db, &author, comment("thanks"))
        .await
        .unwrap();
    assert_eq!(first.author.username, "bob");

    let comments = PostQuery::comments(db, post.id).await.unwrap();
    let ids: Vec<_> = comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(comments[0].author.username, "ada");

    let err = PostMutation::submit_comment(
        db,
        &reader,
        SubmitCommentInput {
            post_id: post.id + 100,
            text: "hello".to_owned(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");

    assert!(comment("hi").validate().is_err());
}

#[tokio::test]
async fn posts_by_author() {
    let db = &setup().await;
    let ada = create_user(db, "ada").await;
    let bob = create_user(db, "bob").await;
    common::insert_post(db, ada.id, "Ada first post", common::minutes(0), &[]).await;
    let latest = common::insert_post(db, ada.id, "Ada second post", common::minutes(5), &[]).await;
    common::insert_post(db, bob.id, "Bob only post", common::minutes(3), &[]).await;

    let posts = PostQuery::find_by_author(db, None, "ada").await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, latest.id);
    assert!(posts.iter().all(|p| p.author.username == "ada"));

    let err = PostQuery::find_by_author(db, None, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");
}
