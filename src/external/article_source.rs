use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::errors::AppError;
use crate::models::Article;

/// Combined article text is capped at this many characters (preamble plus
/// as much of the detail section as fits).
const BODY_TEXT_LIMIT: usize = 400;

/// Discovery and fetch collaborator for news articles.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Candidate article URLs, most-recent-first, bounded to a small
    /// window so each pass stays cheap.
    async fn list_article_urls(&self) -> Result<Vec<String>, AppError>;

    async fn fetch_article(&self, url: &str) -> Result<Article, AppError>;
}

/// Scrapes the mfn.se press-release feed: the listing page for URLs, then
/// each article page for company, timestamp, subject and text.
pub struct MfnSource {
    base_url: String,
    window: usize,
    client: Client,
}

impl MfnSource {
    pub fn new(base_url: String, window: usize, timeout_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            base_url,
            window,
            client,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "{}: status {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ArticleSource for MfnSource {
    async fn list_article_urls(&self) -> Result<Vec<String>, AppError> {
        let listing_url = format!("{}/all/s", self.base_url);
        let html = self.get_text(&listing_url).await?;

        let urls = parse_listing(&html, &self.base_url, self.window)?;
        debug!(count = urls.len(), "discovered article urls");

        Ok(urls)
    }

    async fn fetch_article(&self, url: &str) -> Result<Article, AppError> {
        let html = self.get_text(url).await?;
        parse_article(&html, url)
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("selector must be valid")
}

/// Pull article URLs out of the listing page. Each item carries its link
/// in an onclick handler rather than an href.
fn parse_listing(html: &str, base_url: &str, window: usize) -> Result<Vec<String>, AppError> {
    let document = Html::parse_document(html);
    let item_sel = selector(".short-item-wrapper");
    let link_sel = selector(".short-item.compressible");

    let mut urls = Vec::new();
    for item in document.select(&item_sel) {
        if urls.len() >= window {
            break;
        }
        let onclick = item
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("onclick"))
            .ok_or_else(|| AppError::Parse("listing item without article link".to_string()))?;

        let path = onclick
            .trim_start_matches("goToNewsItem(event, '")
            .trim_end_matches("')");
        urls.push(format!("{}{}", base_url, path));
    }

    Ok(urls)
}

fn parse_article(html: &str, url: &str) -> Result<Article, AppError> {
    let document = Html::parse_document(html);

    let company_name = select_text(&document, ".tray.company")
        .ok_or_else(|| AppError::Parse(format!("{}: missing company", url)))?;

    let raw_date = select_text(&document, ".full-item .publish-date")
        .ok_or_else(|| AppError::Parse(format!("{}: missing publish date", url)))?;
    let published_at = NaiveDateTime::parse_from_str(raw_date.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| AppError::Parse(format!("{}: bad publish date {:?}: {}", url, raw_date, e)))?
        .and_utc();

    let subject = select_text(&document, ".title")
        .ok_or_else(|| AppError::Parse(format!("{}: missing title", url)))?;

    let preamble = select_text(&document, ".full-item .mfn-preamble")
        .ok_or_else(|| AppError::Parse(format!("{}: missing preamble", url)))?;

    // The detail section is the element following the publish date; the
    // page carries no more specific class for it.
    let detail = document
        .select(&selector(".full-item .publish-date"))
        .next()
        .and_then(next_element)
        .map(element_text)
        .unwrap_or_default();

    let mut body_text = preamble;
    for ch in detail.chars() {
        if body_text.chars().count() >= BODY_TEXT_LIMIT {
            break;
        }
        body_text.push(ch);
    }

    Ok(Article {
        url: url.to_string(),
        company_name,
        published_at,
        subject,
        body_text,
    })
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .next()
        .map(|el| element_text(el))
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().replace('\n', "")
}

fn next_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div class="short-item-wrapper grid-u-1 removable-grid">
          <div class="short-item compressible"
               onclick="goToNewsItem(event, '/cis/a/acme/acme-buyback-123')"></div>
        </div>
        <div class="short-item-wrapper grid-u-1 removable-grid">
          <div class="short-item compressible"
               onclick="goToNewsItem(event, '/cis/b/beta/beta-offer-456')"></div>
        </div>
    "#;

    const ARTICLE: &str = r#"
        <div class="tray company">Acme Corp</div>
        <div class="full-item">
          <div class="title">Acme announces buyback</div>
          <div class="publish-date">2021-03-04 09:15:00</div>
          <div>Shares were repurchased at an average price of NOK 55.20 during the week.</div>
          <div class="mfn-preamble">Acme Corp has repurchased own shares. </div>
        </div>
    "#;

    #[test]
    fn listing_yields_absolute_urls_in_order() {
        let urls = parse_listing(LISTING, "https://mfn.se", 10).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://mfn.se/cis/a/acme/acme-buyback-123",
                "https://mfn.se/cis/b/beta/beta-offer-456",
            ]
        );
    }

    #[test]
    fn listing_respects_window_bound() {
        let urls = parse_listing(LISTING, "https://mfn.se", 1).unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0], "https://mfn.se/cis/a/acme/acme-buyback-123");
    }

    #[test]
    fn article_fields_are_extracted() {
        let article = parse_article(ARTICLE, "https://mfn.se/cis/a/acme/acme-buyback-123").unwrap();
        assert_eq!(article.company_name, "Acme Corp");
        assert_eq!(article.subject, "Acme announces buyback");
        assert_eq!(article.published_at.to_rfc3339(), "2021-03-04T09:15:00+00:00");
        assert!(article.body_text.starts_with("Acme Corp has repurchased own shares."));
        assert!(article.body_text.contains("average price of NOK 55.20"));
        assert!(article.body_text.chars().count() <= BODY_TEXT_LIMIT);
    }

    #[test]
    fn article_without_company_is_a_parse_error() {
        let html = "<div class='full-item'></div>";
        let err = parse_article(html, "https://mfn.se/x").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
