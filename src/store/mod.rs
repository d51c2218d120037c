pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{Feed, FeedListing, NewPost, Post, User};

pub use sqlite::SqliteStore;

/// Summary row returned when a follow is created, for display.
#[derive(Debug, Clone)]
pub struct FollowSummary {
    pub user_name: String,
    pub feed_name: String,
}

pub trait Store {
    // User operations
    fn create_user(&self, name: &str) -> Result<User>;
    fn get_user(&self, name: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn delete_all_users(&self) -> Result<()>;

    // Feed operations
    fn create_feed(&self, name: &str, url: &str, user_id: i64) -> Result<Feed>;
    fn list_feeds(&self) -> Result<Vec<FeedListing>>;
    /// Errors with a storage "no rows" failure when the URL is unknown.
    fn get_feed_id_by_url(&self, url: &str) -> Result<i64>;
    /// The next feed due for a fetch: never-fetched feeds first, then the
    /// one with the oldest marker. None when no feeds exist.
    fn get_oldest_fetched_feed(&self) -> Result<Option<Feed>>;
    fn mark_feed_fetched(&self, id: i64, when: DateTime<Utc>) -> Result<()>;

    // Post operations
    /// Idempotent on (feed, url): returns false when the URL was already
    /// stored for the feed, true when a new row was inserted.
    fn create_post(&self, post: &NewPost) -> Result<bool>;
    fn list_posts_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>>;

    // Follow operations
    fn create_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<FollowSummary>;
    fn delete_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<()>;
    /// Names of the feeds a user follows.
    fn list_feed_follows_for_user(&self, user_id: i64) -> Result<Vec<String>>;
}
