//! SeaORM entities backing the blogging service.
//!
//! Join tables (`post_tag`, `like`, `bookmark`, `follow`) use composite primary keys, so
//! "at most one per pair" is enforced by the schema itself.

pub mod prelude;

pub mod account;
pub mod bookmark;
pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod post_tag;
pub mod session;
pub mod tag;
pub mod user;
