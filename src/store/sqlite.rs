use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, TributaryError};
use crate::domain::{Feed, FeedListing, NewPost, Post, User};
use crate::store::{FollowSummary, Store};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| TributaryError::Storage(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            TributaryError::Storage(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: Self::parse_datetime(&row.get::<_, String>(2)?),
            updated_at: Self::parse_datetime(&row.get::<_, String>(3)?),
        })
    }

    fn row_to_feed(row: &Row) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            user_id: row.get(3)?,
            last_fetched_at: row
                .get::<_, Option<String>>(4)?
                .map(|s| Self::parse_datetime(&s)),
            created_at: Self::parse_datetime(&row.get::<_, String>(5)?),
            updated_at: Self::parse_datetime(&row.get::<_, String>(6)?),
        })
    }

    fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
        Ok(Post {
            id: row.get(0)?,
            feed_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            description: row.get(4)?,
            published_at: Self::parse_datetime(&row.get::<_, String>(5)?),
            created_at: Self::parse_datetime(&row.get::<_, String>(6)?),
        })
    }
}

impl Store for SqliteStore {
    fn create_user(&self, name: &str) -> Result<User> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now.to_rfc3339()],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_user(&self, name: &str) -> Result<Option<User>> {
        let conn = self.lock()?;

        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
                params![name],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    fn delete_all_users(&self) -> Result<()> {
        let conn = self.lock()?;
        // Feeds, follows and posts cascade via foreign keys.
        conn.execute("DELETE FROM users", [])?;
        Ok(())
    }

    fn create_feed(&self, name: &str, url: &str, user_id: i64) -> Result<Feed> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO feeds (name, url, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, url, user_id, now.to_rfc3339()],
        )?;

        Ok(Feed {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            url: url.to_string(),
            user_id,
            last_fetched_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn list_feeds(&self) -> Result<Vec<FeedListing>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT f.name, f.url, u.name
             FROM feeds f
             JOIN users u ON u.id = f.user_id
             ORDER BY f.name",
        )?;
        let listings = stmt
            .query_map([], |row| {
                Ok(FeedListing {
                    name: row.get(0)?,
                    url: row.get(1)?,
                    creator: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(listings)
    }

    fn get_feed_id_by_url(&self, url: &str) -> Result<i64> {
        let conn = self.lock()?;

        let id = conn.query_row(
            "SELECT id FROM feeds WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn get_oldest_fetched_feed(&self) -> Result<Option<Feed>> {
        let conn = self.lock()?;

        // NULL markers (never fetched) sort before any timestamp; ties
        // break on id so selection is stable.
        let feed = conn
            .query_row(
                "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
                 FROM feeds
                 ORDER BY last_fetched_at IS NOT NULL, last_fetched_at ASC, id ASC
                 LIMIT 1",
                [],
                Self::row_to_feed,
            )
            .optional()?;

        Ok(feed)
    }

    fn mark_feed_fetched(&self, id: i64, when: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "UPDATE feeds SET last_fetched_at = ?2, updated_at = ?2 WHERE id = ?1",
            params![id, when.to_rfc3339()],
        )?;

        Ok(())
    }

    fn create_post(&self, post: &NewPost) -> Result<bool> {
        let conn = self.lock()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO posts (feed_id, title, url, description, published_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.feed_id,
                post.title,
                post.url,
                post.description,
                post.published_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(inserted > 0)
    }

    fn list_posts_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT p.id, p.feed_id, p.title, p.url, p.description, p.published_at, p.created_at
             FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC
             LIMIT ?2",
        )?;
        let posts = stmt
            .query_map(params![user_id, limit], Self::row_to_post)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(posts)
    }

    fn create_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<FollowSummary> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![user_id, feed_id, now],
        )?;

        let summary = conn.query_row(
            "SELECT u.name, f.name FROM users u, feeds f WHERE u.id = ?1 AND f.id = ?2",
            params![user_id, feed_id],
            |row| {
                Ok(FollowSummary {
                    user_name: row.get(0)?,
                    feed_name: row.get(1)?,
                })
            },
        )?;

        Ok(summary)
    }

    fn delete_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ?1 AND feed_id = ?2",
            params![user_id, feed_id],
        )?;

        Ok(())
    }

    fn list_feed_follows_for_user(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT f.name
             FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             WHERE ff.user_id = ?1
             ORDER BY f.name",
        )?;
        let names = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post(feed_id: i64, url: &str) -> NewPost {
        NewPost {
            feed_id,
            title: "A Post".into(),
            url: url.into(),
            description: Some("words".into()),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        assert!(user.id > 0);

        let found = store.get_user("alice").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.get_user("bob").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_name_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        store.create_user("alice").unwrap();
        assert!(matches!(
            store.create_user("alice"),
            Err(TributaryError::Storage(_))
        ));
    }

    #[test]
    fn test_delete_all_users_cascades() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let feed = store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();
        store.create_feed_follow(user.id, feed.id).unwrap();
        store
            .create_post(&sample_post(feed.id, "https://example.com/p1"))
            .unwrap();

        store.delete_all_users().unwrap();

        assert!(store.list_users().unwrap().is_empty());
        assert!(store.list_feeds().unwrap().is_empty());
        assert!(store.get_oldest_fetched_feed().unwrap().is_none());
    }

    #[test]
    fn test_feed_listing_includes_creator() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();

        let listings = store.list_feeds().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].creator, "alice");
        assert_eq!(listings[0].url, "https://example.com/feed.xml");
    }

    #[test]
    fn test_get_feed_id_by_unknown_url_errors() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.get_feed_id_by_url("https://nowhere.invalid/feed"),
            Err(TributaryError::Storage(rusqlite::Error::QueryReturnedNoRows))
        ));
    }

    #[test]
    fn test_never_fetched_feed_selected_first() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let fetched = store
            .create_feed("Old", "https://example.com/a.xml", user.id)
            .unwrap();
        store.mark_feed_fetched(fetched.id, Utc::now()).unwrap();
        let fresh = store
            .create_feed("Fresh", "https://example.com/b.xml", user.id)
            .unwrap();

        let next = store.get_oldest_fetched_feed().unwrap().unwrap();
        assert_eq!(next.id, fresh.id);
        assert!(next.last_fetched_at.is_none());
    }

    #[test]
    fn test_oldest_marker_selected_when_all_fetched() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let a = store
            .create_feed("A", "https://example.com/a.xml", user.id)
            .unwrap();
        let b = store
            .create_feed("B", "https://example.com/b.xml", user.id)
            .unwrap();

        store
            .mark_feed_fetched(a.id, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
            .unwrap();
        store
            .mark_feed_fetched(b.id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap();

        let next = store.get_oldest_fetched_feed().unwrap().unwrap();
        assert_eq!(next.id, b.id);
    }

    #[test]
    fn test_create_post_idempotent_on_url() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let feed = store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();

        let post = sample_post(feed.id, "https://example.com/p1");
        assert!(store.create_post(&post).unwrap());
        assert!(!store.create_post(&post).unwrap());

        let posts = store.list_posts_for_user(user.id, 10).unwrap();
        // Not followed yet, so nothing is visible.
        assert!(posts.is_empty());

        store.create_feed_follow(user.id, feed.id).unwrap();
        let posts = store.list_posts_for_user(user.id, 10).unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_browse_orders_newest_first_and_limits() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let feed = store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();
        store.create_feed_follow(user.id, feed.id).unwrap();

        for day in 1..=5 {
            let mut post = sample_post(feed.id, &format!("https://example.com/p{day}"));
            post.published_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
            store.create_post(&post).unwrap();
        }

        let posts = store.list_posts_for_user(user.id, 2).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].url, "https://example.com/p5");
        assert_eq!(posts[1].url, "https://example.com/p4");
    }

    #[test]
    fn test_follow_unfollow_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let feed = store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();

        let summary = store.create_feed_follow(user.id, feed.id).unwrap();
        assert_eq!(summary.user_name, "alice");
        assert_eq!(summary.feed_name, "Blog");
        assert_eq!(store.list_feed_follows_for_user(user.id).unwrap(), ["Blog"]);

        store.delete_feed_follow(user.id, feed.id).unwrap();
        assert!(store.list_feed_follows_for_user(user.id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_follow_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let feed = store
            .create_feed("Blog", "https://example.com/feed.xml", user.id)
            .unwrap();

        store.create_feed_follow(user.id, feed.id).unwrap();
        assert!(matches!(
            store.create_feed_follow(user.id, feed.id),
            Err(TributaryError::Storage(_))
        ));
    }
}
