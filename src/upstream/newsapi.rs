use async_trait::async_trait;
use serde::Deserialize;

use super::{ensure_success, join_url, Article, NewsProvider};
use crate::errors::GatewayError;

const PROVIDER: &str = "newsapi";
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(
        &self,
        category: &str,
        country: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<Article>, GatewayError> {
        let mut query = vec![
            ("category", category.to_string()),
            ("pageSize", page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(country) = country {
            query.push(("country", country.to_ascii_lowercase()));
        }

        let response = self
            .http
            .get(join_url(&self.base_url, "v2/top-headlines"))
            .header("X-Api-Key", &self.api_key)
            .query(&query)
            .send()
            .await?;
        let parsed: HeadlinesResponse = ensure_success(PROVIDER, response).await?.json().await?;

        // Removed articles come back with null fields; skip them.
        Ok(parsed
            .articles
            .into_iter()
            .filter_map(|article| match (article.title, article.url) {
                (Some(title), Some(url)) => Some(Article { title, url }),
                _ => None,
            })
            .collect())
    }
}
