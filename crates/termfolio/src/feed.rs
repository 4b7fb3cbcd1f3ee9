//! RSS/Atom feed fetching for the Feed page.
//!
//! A single [`FeedService`] is shared by every session. Fetched posts are
//! cached for the configured TTL so that visitors opening the Feed page do
//! not each hit the remote server.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::{Error, Result};

/// Title used for posts without one.
pub const UNTITLED: &str = "Untitled";

/// Date format for [`FeedItem::date`].
const DATE_FORMAT: &str = "%m-%d-%Y";

/// HTML entity decoding passes; feeds are sometimes escaped more than once.
const MAX_UNESCAPE_PASSES: usize = 3;

/// One post shown on the Feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    /// Post title.
    pub title: String,
    /// Post URL, or the feed's own URL when the post has none.
    pub link: String,
    /// Publication date as `MM-DD-YYYY`; empty when unknown.
    pub date: String,
}

/// A fetched set of posts.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Posts in feed order.
    pub items: Vec<FeedItem>,
    /// When the posts were fetched.
    pub fetched_at: Instant,
}

/// Fetches and caches the configured feed.
#[derive(Debug)]
pub struct FeedService {
    client: Client,
    config: FeedConfig,
    cache: Mutex<Option<FeedSnapshot>>,
    refresh: tokio::sync::Mutex<()>,
}

impl FeedService {
    /// Create a service for the configured feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(crate::version::version())
            .build()?;

        Ok(Self {
            client,
            config,
            cache: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
        })
    }

    /// The feed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn cache(&self) -> MutexGuard<'_, Option<FeedSnapshot>> {
        // The cache holds plain data; a panic elsewhere cannot leave it torn.
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn fresh_snapshot(&self) -> Option<FeedSnapshot> {
        self.cache()
            .as_ref()
            .filter(|snapshot| {
                !snapshot.items.is_empty()
                    && snapshot.fetched_at.elapsed() <= self.config.cache_ttl()
            })
            .cloned()
    }

    /// Whether a cached snapshot younger than the TTL is available.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh_snapshot().is_some()
    }

    /// The cached snapshot if fresh, otherwise a newly fetched one.
    ///
    /// Concurrent callers share a single in-flight fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be fetched or parsed. The previous
    /// snapshot, if any, is kept.
    pub async fn latest(&self) -> Result<FeedSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock().await;
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        let snapshot = FeedSnapshot {
            items: self.fetch().await?,
            fetched_at: Instant::now(),
        };
        *self.cache() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Fetch the feed, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeedRequest`] on transport failure,
    /// [`Error::FeedStatus`] on a non-success response, and
    /// [`Error::FeedParse`] when the body is not RSS or Atom.
    pub async fn fetch(&self) -> Result<Vec<FeedItem>> {
        debug!("Fetching feed from {}", self.config.url);
        let response = self.client.get(&self.config.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Feed request to {} returned {}", self.config.url, status);
            return Err(Error::FeedStatus {
                status: status.to_string(),
            });
        }

        let body = response.bytes().await?;
        let items = parse_feed(&body, self.config.max_items)?;
        info!("Fetched {} feed items", items.len());
        Ok(items)
    }
}

/// Parse an RSS or Atom document into at most `max_items` posts.
///
/// # Errors
///
/// Returns [`Error::FeedParse`] when the document cannot be parsed.
pub fn parse_feed(body: &[u8], max_items: usize) -> Result<Vec<FeedItem>> {
    let feed = feed_rs::parser::parse(body).map_err(|e| Error::FeedParse(e.to_string()))?;

    let feed_link = feed
        .links
        .first()
        .map(|link| normalize_text(&link.href))
        .unwrap_or_default();

    let items = feed
        .entries
        .iter()
        .take(max_items)
        .map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|text| normalize_text(&text.content))
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            let link = entry
                .links
                .first()
                .map(|link| normalize_text(&link.href))
                .filter(|link| !link.is_empty())
                .unwrap_or_else(|| feed_link.clone());

            FeedItem {
                title,
                link,
                date: format_date(entry.published.or(entry.updated)),
            }
        })
        .collect();

    Ok(items)
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Decode HTML entities and strip invisible spacing characters.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    let mut text = value.to_string();
    for _ in 0..MAX_UNESCAPE_PASSES {
        let decoded = html_escape::decode_html_entities(&text).into_owned();
        if decoded == text {
            break;
        }
        text = decoded;
    }
    text.replace('\u{a0}', " ").replace('\u{200b}', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Notes</title>
    <link>https://notes.example.com/</link>
    <description>Notes</description>
    <item>
      <title>Tom &amp;amp; Jerry</title>
      <link>https://notes.example.com/tom-and-jerry</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title></title>
      <pubDate>Sun, 31 Dec 2023 08:30:00 +0000</pubDate>
    </item>
    <item>
      <title>No date</title>
      <link>https://notes.example.com/no-date</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom notes</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-03-05T12:00:00Z</updated>
  <link href="https://atom.example.com/"/>
  <entry>
    <title>Only updated</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <link href="https://atom.example.com/only-updated"/>
    <updated>2024-03-05T12:00:00Z</updated>
  </entry>
</feed>"#;

    fn config_for(server: &Server, ttl_secs: u64) -> FeedConfig {
        FeedConfig {
            url: format!("{}/feed.xml", server.url()),
            cache_ttl_secs: ttl_secs,
            ..FeedConfig::default()
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Tom &amp;amp; Jerry"), "Tom & Jerry");
        assert_eq!(normalize_text("a\u{a0}b\u{200b}c"), "a bc");
        assert_eq!(normalize_text("&amp;amp;amp;amp;lt;"), "&amp;lt;");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS.as_bytes(), 25).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Tom & Jerry");
        assert_eq!(items[0].link, "https://notes.example.com/tom-and-jerry");
        assert_eq!(items[0].date, "01-02-2024");

        // Fallbacks: untitled, feed link.
        assert_eq!(items[1].title, UNTITLED);
        assert_eq!(items[1].link, "https://notes.example.com/");
        assert_eq!(items[1].date, "12-31-2023");

        assert_eq!(items[2].date, "");
    }

    #[test]
    fn test_parse_atom_uses_updated_date() {
        let items = parse_feed(ATOM.as_bytes(), 25).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Only updated");
        assert_eq!(items[0].date, "03-05-2024");
    }

    #[test]
    fn test_parse_limits_items() {
        let items = parse_feed(RSS.as_bytes(), 2).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_feed(b"this is not xml", 25).unwrap_err();
        assert!(matches!(err, Error::FeedParse(_)));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(RSS)
            .create_async()
            .await;

        let service = FeedService::new(config_for(&server, 900)).unwrap();
        let items = service.fetch().await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed.xml")
            .with_status(404)
            .create_async()
            .await;

        let service = FeedService::new(config_for(&server, 900)).unwrap();
        let err = service.fetch().await.unwrap_err();

        assert_eq!(err.to_string(), "feed request failed: 404 Not Found");
        assert!(err.is_feed_error());
    }

    #[tokio::test]
    async fn test_latest_uses_cache_within_ttl() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_body(RSS)
            .expect(1)
            .create_async()
            .await;

        let service = FeedService::new(config_for(&server, 900)).unwrap();
        assert!(!service.is_fresh());

        let first = service.latest().await.unwrap();
        assert!(service.is_fresh());
        let second = service.latest().await.unwrap();

        mock.assert_async().await;
        assert_eq!(first.items, second.items);
        assert_eq!(first.fetched_at, second.fetched_at);
    }

    #[tokio::test]
    async fn test_latest_refetches_when_stale() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_body(RSS)
            .expect(2)
            .create_async()
            .await;

        let service = FeedService::new(config_for(&server, 0)).unwrap();
        service.latest().await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        service.latest().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_latest_keeps_previous_snapshot_on_error() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_body(RSS)
            .expect(1)
            .create_async()
            .await;

        let service = FeedService::new(config_for(&server, 0)).unwrap();
        service.latest().await.unwrap();
        ok.assert_async().await;
        ok.remove_async().await;

        let _failing = server
            .mock("GET", "/feed.xml")
            .with_status(500)
            .create_async()
            .await;
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert!(service.latest().await.is_err());
        assert_eq!(service.cache().as_ref().map(|s| s.items.len()), Some(3));
    }
}
