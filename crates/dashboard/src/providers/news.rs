use reqwest::Client;
use serde::Deserialize;
use wallboard_core::config::{NewsConfig, NewsFeed};
use wallboard_core::model::{NewsData, NewsStory};
use wallboard_core::FetchError;

use super::{endpoint, get_json, parse_time};

/// Images narrower than this are only used when nothing wider exists.
const MIN_IMAGE_WIDTH: u32 = 400;
const SOURCE: &str = "ESPN";

#[derive(Debug, Default, Deserialize)]
pub struct NewsFeedResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
pub struct Article {
    /// Numeric in practice, occasionally a string.
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: u32,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fetches every configured feed and merges the newest stories.
pub async fn fetch(client: &Client, cfg: &NewsConfig) -> Result<NewsData, FetchError> {
    let mut handles = Vec::with_capacity(cfg.feeds.len());
    for feed in &cfg.feeds {
        let url = endpoint(&cfg.base_url, &format!("{}/news", feed.path), &[])?;
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            get_json::<NewsFeedResponse>(&client, url).await
        }));
    }

    let mut stories = Vec::new();
    let mut succeeded = 0usize;
    for (feed, handle) in cfg.feeds.iter().zip(handles) {
        let res = handle
            .await
            .map_err(|e| FetchError::Http(format!("feed task failed: {e}")))
            .and_then(|r| r);
        match res {
            Ok(resp) => {
                succeeded += 1;
                stories.extend(parse_feed(resp, feed, cfg.per_feed));
            }
            Err(e) => tracing::warn!(feed = %feed.label, error = %e, "news feed failed"),
        }
    }

    if succeeded == 0 && !cfg.feeds.is_empty() {
        return Err(FetchError::AllSourcesFailed("news"));
    }

    Ok(NewsData {
        stories: newest_first(stories, cfg.max_stories),
    })
}

/// First `per_feed` articles of one feed. Articles without a readable
/// publish time are skipped.
pub fn parse_feed(resp: NewsFeedResponse, feed: &NewsFeed, per_feed: usize) -> Vec<NewsStory> {
    resp.articles
        .into_iter()
        .take(per_feed)
        .filter_map(|a| {
            let published_at = parse_time(&a.published)?;
            let image_url = a
                .images
                .iter()
                .find(|img| img.width >= MIN_IMAGE_WIDTH)
                .or_else(|| a.images.first())
                .map(|img| img.url.clone());
            let category = a
                .categories
                .iter()
                .find(|c| c.kind.as_deref() == Some("league"))
                .and_then(|c| c.description.clone())
                .unwrap_or_else(|| feed.label.clone());
            let id = match a.id {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => format!("{}-{}", feed.label, published_at.timestamp()),
                other => other.to_string(),
            };

            Some(NewsStory {
                id,
                title: a.headline,
                snippet: a.description,
                source: SOURCE.into(),
                category,
                published_at,
                image_url,
            })
        })
        .collect()
}

/// Sorts newest first and keeps the top `max`.
pub fn newest_first(mut stories: Vec<NewsStory>, max: usize) -> Vec<NewsStory> {
    stories.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    stories.truncate(max);
    stories
}
