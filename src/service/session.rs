use std::collections::HashSet;

use chrono::{Duration, Utc};
use entity::{account, session, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, QuerySelect, Set};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, ApiError},
    identity::ProviderProfile,
    slug::username_base,
};

/// Sessions live this long after sign-in.
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

pub struct SessionQuery;

impl SessionQuery {
    /// The user behind a session token, if the session exists and has not expired.
    pub async fn find_user(db: &DbConn, token: &str) -> Result<Option<user::Model>, ApiError> {
        let Some((session, user)) = session::Entity::find_by_id(token.to_owned())
            .find_also_related(user::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            debug!(user_id = session.user_id, "session expired");
            return Ok(None);
        }
        Ok(user)
    }
}

pub struct SessionMutation;

impl SessionMutation {
    /// Resolve (or create) the user for a provider profile and open a new session.
    ///
    /// First sign-in creates the user with a username derived from the profile name
    /// and links the provider account to it.
    pub async fn sign_in(
        db: &DbConn,
        provider: &str,
        profile: &ProviderProfile,
    ) -> Result<(session::Model, user::Model), ApiError> {
        let linked = account::Entity::find_by_id((provider.to_owned(), profile.sub.clone()))
            .find_also_related(user::Entity)
            .one(db)
            .await?
            .and_then(|(_, user)| user);

        let user = match linked {
            Some(user) => user,
            None => Self::register(db, provider, profile).await?,
        };

        let session = session::ActiveModel {
            token: Set(Uuid::new_v4().simple().to_string()),
            user_id: Set(user.id),
            expires_at: Set(Utc::now() + Duration::days(SESSION_MAX_AGE_DAYS)),
        }
        .insert(db)
        .await?;

        info!(user_id = user.id, "signed in");
        Ok((session, user))
    }

    pub async fn sign_out(db: &DbConn, token: &str) -> Result<(), ApiError> {
        session::Entity::delete_by_id(token.to_owned())
            .exec(db)
            .await?;
        Ok(())
    }

    async fn register(
        db: &DbConn,
        provider: &str,
        profile: &ProviderProfile,
    ) -> Result<user::Model, ApiError> {
        let name = profile.display_name();
        let username = Self::unique_username(db, &name).await?;

        let user = user::ActiveModel {
            name: Set(name),
            username: Set(username),
            email: Set(profile.email.clone()),
            image: Set(profile.picture.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Conflict("this email is already linked to another account".to_owned())
            } else {
                err.into()
            }
        })?;

        account::ActiveModel {
            provider: Set(provider.to_owned()),
            provider_account_id: Set(profile.sub.clone()),
            user_id: Set(user.id),
        }
        .insert(db)
        .await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// `username_base(name)`, or that stem with the lowest free numeric suffix.
    pub async fn unique_username(db: &DbConn, name: &str) -> Result<String, ApiError> {
        let base = username_base(name);
        let taken: HashSet<String> = user::Entity::find()
            .select_only()
            .column(user::Column::Username)
            .filter(user::Column::Username.starts_with(base.as_str()))
            .into_tuple::<String>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        if !taken.contains(&base) {
            return Ok(base);
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}{suffix}");
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}
