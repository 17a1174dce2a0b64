pub use super::account::Entity as Account;
pub use super::bookmark::Entity as Bookmark;
pub use super::comment::Entity as Comment;
pub use super::follow::Entity as Follow;
pub use super::like::Entity as Like;
pub use super::post::Entity as Post;
pub use super::post_tag::Entity as PostTag;
pub use super::session::Entity as Session;
pub use super::tag::Entity as Tag;
pub use super::user::Entity as User;
