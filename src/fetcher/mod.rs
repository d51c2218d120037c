pub mod http_fetcher;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use rss::Channel;

use crate::app::{Result, TributaryError};

/// In-memory shape of one fetched RSS document. Lives only for the
/// duration of a single scrape pass.
#[derive(Debug, Clone, Default)]
pub struct RawFeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RawFeedItem>,
}

#[derive(Debug, Clone, Default)]
pub struct RawFeedItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    /// Raw `<pubDate>` text, left for the normalizer to interpret.
    pub pub_date: String,
}

#[async_trait]
pub trait FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<RawFeedDocument>;
}

/// Decode an RSS body into a [`RawFeedDocument`], unescaping HTML entities
/// in every title and description field. Publishers commonly double-encode
/// entities, so this runs on channel-level and per-item text alike.
pub fn decode_document(body: &[u8]) -> Result<RawFeedDocument> {
    let channel = Channel::read_from(body).map_err(|e| TributaryError::Parse(e.to_string()))?;

    let items = channel
        .items()
        .iter()
        .map(|item| RawFeedItem {
            title: decode_html_entities(item.title().unwrap_or_default()).to_string(),
            link: item.link().unwrap_or_default().to_string(),
            description: item
                .description()
                .map(|d| decode_html_entities(d).to_string()),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    Ok(RawFeedDocument {
        title: decode_html_entities(channel.title()).to_string(),
        link: channel.link().to_string(),
        description: decode_html_entities(channel.description()).to_string(),
        items,
    })
}
