//! Social blogging backend.
//!
//! Procedures are grouped the way clients call them (`post`, `auth`, `tag`, `unsplash`).
//! Each group has a service module holding its `Query` / `Mutation` halves over a
//! [`sea_orm::DatabaseConnection`], plus an axum module that exposes them under
//! `/trpc/<group>.<procedure>`.

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod service;
pub mod slug;
pub mod state;
pub mod storage;
pub mod unsplash;

pub use error::ApiError;
pub use state::AppState;
