mod common;

use bloggery::{
    service::{tag::CreateTagInput, TagMutation, TagQuery},
    ApiError,
};
use common::setup;
use pretty_assertions::assert_eq;

fn input(name: &str) -> CreateTagInput {
    CreateTagInput {
        name: name.to_owned(),
        description: "Posts about this topic".to_owned(),
    }
}

#[tokio::test]
async fn tag_names_are_unique() {
    let db = &setup().await;

    let tag = TagMutation::create_tag(db, input("rust")).await.unwrap();
    assert_eq!(tag.name, "rust");
    assert_eq!(tag.slug, "rust");

    let err = TagMutation::create_tag(db, input("rust")).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");
    assert_eq!(err.to_string(), "Tag already exist");
}

#[tokio::test]
async fn tag_slug_is_derived_from_name() {
    let db = &setup().await;

    let tag = TagMutation::create_tag(db, input("Web Assembly"))
        .await
        .unwrap();
    assert_eq!(tag.slug, "web-assembly");

    // Different name, same slug
    let err = TagMutation::create_tag(db, input("web assembly"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn tags_listed_by_name() {
    let db = &setup().await;
    for name in ["tokio", "async", "rust"] {
        TagMutation::create_tag(db, input(name)).await.unwrap();
    }

    let names: Vec<_> = TagQuery::all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["async", "rust", "tokio"]);
}
