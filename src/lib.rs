//! # Tributary
//!
//! A multi-user command-line RSS feed aggregator: registered users
//! subscribe to feeds, and a background loop periodically pulls new items
//! into a shared store for later browsing.
//!
//! ## Architecture
//!
//! ```text
//! Dispatcher → Handlers → Store
//!                ↘ Scheduler → Fetcher → Normalizer → Store
//! ```
//!
//! - [`cli`]: command parsing, identity resolution and dispatch
//! - [`scheduler`]: the recurring fetch loop, one feed per tick
//! - [`fetcher`]: HTTP client and RSS document decoding
//! - [`normalizer`]: publication-date parsing over known layouts
//! - [`store`]: SQLite persistence layer
//!
//! ## Quick Start
//!
//! ```bash
//! tributary register alice
//! tributary addfeed "Rust Blog" https://blog.rust-lang.org/feed.xml
//! tributary agg 1h
//! tributary browse 5
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together the store and the feed
/// fetcher; [`TributaryError`](app::TributaryError) is the single error
/// type every fallible path returns.
pub mod app;

/// Command-line surface: the closed [`Command`](cli::Command) set, the
/// dispatcher, and the command handlers.
pub mod cli;

/// Core domain models: [`User`](domain::User), [`Feed`](domain::Feed),
/// [`Post`](domain::Post).
pub mod domain;

/// HTTP fetching and RSS decoding.
///
/// The [`FeedFetcher`](fetcher::FeedFetcher) trait is the seam tests use
/// to substitute canned documents for the network.
pub mod fetcher;

/// Publication-date normalization over a fixed, ordered layout list.
pub mod normalizer;

/// The ingestion scheduler: sequential, one feed per tick, oldest-due
/// first.
pub mod scheduler;

/// Persisted session state (`db_url`, `current_user_name`).
pub mod session;

/// SQLite persistence layer behind the [`Store`](store::Store) trait.
pub mod store;
