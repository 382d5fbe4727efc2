use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::errors::AppError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/78.0.3904.87 Safari/537.36";

/// Live market-price collaborator. Resolution is by company name, not
/// ticker, because that is all the news feed carries.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn current_price(&self, company_name: &str) -> Result<f64, AppError>;
}

/// Constant-price lookup. The default until a real quote feed is wired
/// in; also what the tests script against.
pub struct FixedPriceLookup {
    price: f64,
}

impl FixedPriceLookup {
    pub fn new(price: f64) -> Self {
        Self { price }
    }
}

#[async_trait]
impl PriceLookup for FixedPriceLookup {
    async fn current_price(&self, _company_name: &str) -> Result<f64, AppError> {
        Ok(self.price)
    }
}

/// Resolves a company through the investing.com search page, then scrapes
/// the last traded price off the quote page. Requires a browser
/// User-Agent or the site serves an empty shell.
pub struct InvestingLookup {
    base_url: String,
    client: Client,
}

impl InvestingLookup {
    pub fn new(timeout_secs: u64) -> Result<Self, AppError> {
        Self::with_base_url("https://www.investing.com".to_string(), timeout_secs)
    }

    pub fn with_base_url(base_url: String, timeout_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Lookup(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Lookup(format!(
                "{}: status {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Lookup(format!("{}: {}", url, e)))
    }

    async fn quote_page_url(&self, company_name: &str) -> Result<String, AppError> {
        let search_url = format!(
            "{}/search/?q={}",
            self.base_url,
            urlencode(company_name)
        );
        let html = self.get_text(&search_url).await?;

        let href = parse_first_quote_href(&html).ok_or_else(|| {
            AppError::Lookup(format!("no quote found for company {:?}", company_name))
        })?;

        Ok(format!("{}{}", self.base_url, href))
    }
}

#[async_trait]
impl PriceLookup for InvestingLookup {
    async fn current_price(&self, company_name: &str) -> Result<f64, AppError> {
        let quote_url = self.quote_page_url(company_name).await?;
        let html = self.get_text(&quote_url).await?;

        parse_last_price(&html)
            .ok_or_else(|| AppError::Lookup(format!("no price on quote page {}", quote_url)))
    }
}

fn urlencode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn parse_first_quote_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(".js-inner-all-results-quote-item.row").ok()?;

    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.to_string())
}

fn parse_last_price(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let sel = Selector::parse("#last_last").ok()?;

    let raw: String = document.select(&sel).next()?.text().collect();
    // Thousands separators on the quote page.
    raw.trim().replace(',', "").parse::<f64>().ok()
}
