mod common;

use bloggery::service::{SessionMutation, SessionQuery};
use chrono::{Duration, Utc};
use common::{create_user, profile, setup};
use entity::session;
use pretty_assertions::assert_eq;
use sea_orm::{ActiveModelTrait, Set};

#[tokio::test]
async fn first_sign_in_registers_the_user() {
    let db = &setup().await;

    let (session, user) = SessionMutation::sign_in(db, "google", &profile("g-1", "Grace Hopper"))
        .await
        .unwrap();
    assert_eq!(user.username, "gracehopper");
    assert_eq!(user.name, "Grace Hopper");
    assert_eq!(user.email.as_deref(), Some("g-1@example.com"));
    assert_eq!(user.image.as_deref(), Some("https://pictures.test/g-1.png"));
    assert_eq!(session.user_id, user.id);
    assert!(session.expires_at > Utc::now() + Duration::days(29));

    let found = SessionQuery::find_user(db, &session.token).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    // Signing in again reuses the linked user
    let (again, same) = SessionMutation::sign_in(db, "google", &profile("g-1", "Grace Hopper"))
        .await
        .unwrap();
    assert_eq!(same.id, user.id);
    assert!(again.token != session.token);
}

#[tokio::test]
async fn usernames_get_a_free_suffix() {
    let db = &setup().await;
    create_user(db, "gracehopper").await;
    create_user(db, "gracehopper1").await;

    let (_, user) = SessionMutation::sign_in(db, "google", &profile("g-2", "Grace Hopper"))
        .await
        .unwrap();
    assert_eq!(user.username, "gracehopper2");
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let db = &setup().await;
    let (session, _) = SessionMutation::sign_in(db, "google", &profile("g-1", "Grace Hopper"))
        .await
        .unwrap();

    SessionMutation::sign_out(db, &session.token).await.unwrap();
    assert_eq!(SessionQuery::find_user(db, &session.token).await.unwrap(), None);
    assert_eq!(SessionQuery::find_user(db, "unknown").await.unwrap(), None);
}

#[tokio::test]
async fn expired_sessions_are_ignored() {
    let db = &setup().await;
    let user = create_user(db, "ada").await;

    session::ActiveModel {
        token: Set("stale".to_owned()),
        user_id: Set(user.id),
        expires_at: Set(Utc::now() - Duration::minutes(1)),
    }
    .insert(db)
    .await
    .unwrap();

    assert_eq!(SessionQuery::find_user(db, "stale").await.unwrap(), None);
}
