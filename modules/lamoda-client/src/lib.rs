pub mod error;
pub mod parse;
pub mod types;

pub use error::{LamodaError, Result};
pub use parse::{parse_sneaker_cards, parse_sneaker_detail, parse_sneaker_links};
pub use types::{SneakerCard, SneakerDetail, SneakerLink};

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.lamoda.by";

/// Men's sneakers listing, relative to the base URL.
const SNEAKERS_CATALOG: &str = "c/5971/shoes-muzhkrossovki/?sitelink=topmenuM&l=4";

pub struct LamodaClient {
    client: reqwest::Client,
    base_url: String,
}

impl LamodaClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn listing_url(&self, page: u32) -> String {
        format!("{}/{}&page={}", self.base_url, SNEAKERS_CATALOG, page)
    }

    pub fn href_url(&self, href: &str) -> String {
        format!("{}/{}", self.base_url, href.trim().trim_start_matches('/'))
    }

    pub fn article_url(&self, article: &str) -> String {
        format!("{}/p/{}", self.base_url, article.trim())
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "Fetching catalog page");

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LamodaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// All product cards on one listing page (1-based).
    pub async fn sneakers(&self, page: u32) -> Result<Vec<SneakerCard>> {
        if page == 0 {
            return Err(LamodaError::InvalidInput("page must be positive".into()));
        }
        let html = self.fetch(&self.listing_url(page)).await?;
        let cards = parse_sneaker_cards(&html);
        tracing::info!(page, count = cards.len(), "Parsed sneaker cards");
        Ok(cards)
    }

    /// Product page links on one listing page (1-based).
    pub async fn sneaker_links(&self, page: u32) -> Result<Vec<SneakerLink>> {
        if page == 0 {
            return Err(LamodaError::InvalidInput("page must be positive".into()));
        }
        let html = self.fetch(&self.listing_url(page)).await?;
        let links = parse_sneaker_links(&html);
        tracing::info!(page, count = links.len(), "Parsed sneaker links");
        Ok(links)
    }

    /// Product page addressed by its site-relative link.
    pub async fn sneaker_by_href(&self, href: &str) -> Result<SneakerDetail> {
        if href.trim().trim_matches('/').is_empty() {
            return Err(LamodaError::InvalidInput("href must not be empty".into()));
        }
        let html = self.fetch(&self.href_url(href)).await?;
        Ok(parse_sneaker_detail(&html))
    }

    /// Product page addressed by article number.
    pub async fn sneaker_by_article(&self, article: &str) -> Result<SneakerDetail> {
        if article.trim().is_empty() {
            return Err(LamodaError::InvalidInput("article must not be empty".into()));
        }
        let html = self.fetch(&self.article_url(article)).await?;
        Ok(parse_sneaker_detail(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LamodaClient {
        LamodaClient::new("https://www.lamoda.by/").unwrap()
    }

    #[test]
    fn listing_url_carries_page() {
        assert_eq!(
            client().listing_url(3),
            "https://www.lamoda.by/c/5971/shoes-muzhkrossovki/?sitelink=topmenuM&l=4&page=3"
        );
    }

    #[test]
    fn href_url_tolerates_leading_slash() {
        let c = client();
        assert_eq!(
            c.href_url("/p/rtladl534401/shoes-napapijri-krossovki/"),
            "https://www.lamoda.by/p/rtladl534401/shoes-napapijri-krossovki/"
        );
        assert_eq!(c.href_url("p/x/"), "https://www.lamoda.by/p/x/");
    }

    #[test]
    fn article_url() {
        assert_eq!(
            client().article_url("rtlada874801"),
            "https://www.lamoda.by/p/rtlada874801"
        );
    }
}
