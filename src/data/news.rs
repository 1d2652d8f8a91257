//! News API client
//!
//! Fetches storm, flood and tornado headlines from the weather news API.
//! Responses are cached on disk so a previous batch of headlines can still be
//! shown when the API is unreachable.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{NewsArticle, NewsTopic};
use crate::cache::CacheManager;

/// Time-to-live for news cache entries in hours
const CACHE_TTL_HOURS: u64 = 1;

/// Number of articles shown per topic
pub const MAX_ARTICLES: usize = 6;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching news
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("News service returned status {0}")]
    Status(u16),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Response from `get_news`
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<NewsArticle>,
}

/// Client for the news endpoint
#[derive(Debug, Clone)]
pub struct NewsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cache manager for persisting responses
    cache_manager: Option<CacheManager>,
    /// API root
    base_url: String,
}

impl NewsClient {
    /// Creates a new NewsClient without a disk cache
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            cache_manager: None,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a new NewsClient backed by the given cache manager
    pub fn with_cache(base_url: impl Into<String>, cache_manager: CacheManager) -> Self {
        Self {
            cache_manager: Some(cache_manager),
            ..Self::new(base_url)
        }
    }

    fn cache_key(topic: NewsTopic) -> String {
        format!("news_{}", topic.query())
    }

    /// Fetches the latest articles for a topic
    ///
    /// # Behavior
    /// - Returns fresh cached articles without a request
    /// - Otherwise fetches from the API and caches the result
    /// - On API failure, returns expired cached articles if any exist
    pub async fn fetch_news(&self, topic: NewsTopic) -> Result<Vec<NewsArticle>, NewsError> {
        self.fetch(topic, false).await
    }

    /// Like [`fetch_news`](Self::fetch_news), but always asks the API first
    ///
    /// A cached batch is still returned if the request fails.
    pub async fn refresh_news(&self, topic: NewsTopic) -> Result<Vec<NewsArticle>, NewsError> {
        self.fetch(topic, true).await
    }

    async fn fetch(&self, topic: NewsTopic, refresh: bool) -> Result<Vec<NewsArticle>, NewsError> {
        let cache_key = Self::cache_key(topic);

        if let (false, Some(cache_manager)) = (refresh, &self.cache_manager) {
            if let Some(cached) = cache_manager.read::<Vec<NewsArticle>>(&cache_key) {
                if !cached.is_expired {
                    debug!(topic = topic.query(), "serving news from cache");
                    return Ok(cached.data);
                }
            }
        }

        match self.fetch_from_api(topic).await {
            Ok(articles) => {
                if let Some(ref cache_manager) = self.cache_manager {
                    if let Err(e) = cache_manager.write(&cache_key, &articles, CACHE_TTL_HOURS) {
                        warn!(error = %e, "failed to cache news");
                    }
                }
                Ok(articles)
            }
            Err(api_error) => {
                if let Some(ref cache_manager) = self.cache_manager {
                    if let Some(cached) = cache_manager.read::<Vec<NewsArticle>>(&cache_key) {
                        warn!(error = %api_error, topic = topic.query(), "news API failed, using stale cache");
                        return Ok(cached.data);
                    }
                }
                Err(api_error)
            }
        }
    }

    async fn fetch_from_api(&self, topic: NewsTopic) -> Result<Vec<NewsArticle>, NewsError> {
        let url = format!("{}/api/get_news/", self.base_url);
        debug!(topic = topic.query(), "fetching news");

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", topic.query())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        parse_news(&text)
    }
}

/// Parses a `get_news` body, keeping at most [`MAX_ARTICLES`] articles
fn parse_news(body: &str) -> Result<Vec<NewsArticle>, NewsError> {
    let response: NewsResponse = serde_json::from_str(body)?;
    let mut articles = response.news;
    articles.truncate(MAX_ARTICLES);
    Ok(articles)
}
