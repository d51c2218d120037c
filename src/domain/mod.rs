pub mod feed;
pub mod post;
pub mod user;

pub use feed::{Feed, FeedListing};
pub use post::{NewPost, Post};
pub use user::User;
