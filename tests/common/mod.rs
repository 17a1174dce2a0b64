#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bloggery::{
    identity::{IdentityError, IdentityProvider, ProviderProfile},
    service::post::CreatePostInput,
    storage::{ObjectStorage, StorageError},
    unsplash::{PhotoPage, PhotoSearch, PhotoSearchError},
    AppState,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use entity::{account, bookmark, comment, follow, like, post, post_tag, session, tag, user};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set,
};

pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    create_table(&db, user::Entity).await;
    create_table(&db, account::Entity).await;
    create_table(&db, session::Entity).await;
    create_table(&db, tag::Entity).await;
    create_table(&db, post::Entity).await;
    create_table(&db, post_tag::Entity).await;
    create_table(&db, like::Entity).await;
    create_table(&db, bookmark::Entity).await;
    create_table(&db, comment::Entity).await;
    create_table(&db, follow::Entity).await;

    db
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(entity);
    db.execute(backend.build(&stmt)).await.unwrap();
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        name: Set(username.to_uppercase()),
        username: Set(username.to_owned()),
        email: Set(Some(format!("{username}@example.com"))),
        image: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_tag(db: &DatabaseConnection, name: &str) -> tag::Model {
    tag::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(format!("Everything about {name}")),
        slug: Set(name.to_lowercase()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// A fixed point in time; tests offset from it to control ordering.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(n)
}

/// Insert a post directly, bypassing validation, with a chosen timestamp.
pub async fn insert_post(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    created_at: DateTime<Utc>,
    tag_ids: &[i32],
) -> post::Model {
    let post = post::ActiveModel {
        title: Set(title.to_owned()),
        description: Set(format!("{title} description")),
        html: Set(format!("<p>{title}</p>")),
        slug: Set(bloggery::slug::slugify(title)),
        featured_image: Set(None),
        author_id: Set(author_id),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    for tag_id in tag_ids {
        post_tag::ActiveModel {
            post_id: Set(post.id),
            tag_id: Set(*tag_id),
        }
        .insert(db)
        .await
        .unwrap();
    }
    post
}

pub fn post_input(title: &str) -> CreatePostInput {
    CreatePostInput {
        title: title.to_owned(),
        description: "A careful walk through the trade-offs every backend engineer meets sooner or later."
            .to_owned(),
        html: "<p>Threads, actors and async runtimes each make different promises about ordering, \
               fairness and failure.</p>"
            .to_owned(),
        tag_ids: Vec::new(),
    }
}

/// Records uploads; optionally fails every upload.
#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<(String, usize, String)>>,
    pub fail: bool,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Rejected {
                status: 500,
                body: "bucket offline".to_owned(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_owned(), bytes.len(), content_type.to_owned()));
        Ok(path.to_owned())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/public/{path}")
    }
}

/// Returns a canned page, or fails when `page` is `None`.
pub struct FakePhotos {
    pub page: Option<PhotoPage>,
}

#[async_trait]
impl PhotoSearch for FakePhotos {
    async fn search(&self, _query: &str) -> Result<PhotoPage, PhotoSearchError> {
        self.page.clone().ok_or(PhotoSearchError::Status(503))
    }
}

/// Accepts the code `"good-code"` and returns `profile` for it.
pub struct FakeIdentity {
    pub profile: ProviderProfile,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
        Ok(format!("https://accounts.test/auth?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, IdentityError> {
        if code == "good-code" {
            Ok(self.profile.clone())
        } else {
            Err(IdentityError::Status(400))
        }
    }
}

pub fn profile(sub: &str, name: &str) -> ProviderProfile {
    ProviderProfile {
        sub: sub.to_owned(),
        name: Some(name.to_owned()),
        email: Some(format!("{sub}@example.com")),
        picture: Some(format!("https://pictures.test/{sub}.png")),
    }
}

pub fn state(conn: DatabaseConnection, storage: Arc<FakeStorage>) -> AppState {
    AppState {
        conn,
        storage,
        photos: Arc::new(FakePhotos { page: None }),
        identity: Arc::new(FakeIdentity {
            profile: profile("g-1", "Grace Hopper"),
        }),
    }
}
