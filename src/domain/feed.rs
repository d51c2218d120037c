use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Owning user; set once at creation.
    pub user_id: i64,
    /// None until the first successful scheduler pass picks this feed up.
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of `feeds` output: a feed together with its creator's name.
#[derive(Debug, Clone)]
pub struct FeedListing {
    pub name: String,
    pub url: String,
    pub creator: String,
}
