use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::db::AlertStore;
use crate::errors::AppError;
use crate::external::{ArticleSource, PriceLookup};
use crate::models::{Article, NewAlert};
use crate::services::notifier::Notifier;
use crate::services::price_extractor::extract_price;
use crate::services::ratio;

/// Everything one pass needs, owned and injected. Collaborators sit
/// behind traits so passes are scriptable in tests.
#[derive(Clone)]
pub struct PipelineContext {
    pub source: Arc<dyn ArticleSource>,
    pub price_lookup: Arc<dyn PriceLookup>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn AlertStore>,
    pub threshold: f64,
    pub receiver_email: String,
}

/// Structured result of one pass over the article window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub discovered: usize,
    pub fetched: usize,
    pub alerted: usize,
    pub skipped_no_price: usize,
    pub skipped_below_threshold: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
}

enum ArticleOutcome {
    Alerted,
    NoPrice,
    BelowThreshold,
    AlreadyProcessed,
}

/// Run one full pass: discover the recent article window, then push each
/// article through fetch, extract, evaluate, dedup and alert. A failure
/// in one article never aborts the rest of the pass; only a discovery
/// failure is pass-fatal.
pub async fn run_pass(ctx: &PipelineContext) -> Result<PassReport, AppError> {
    let urls = ctx.source.list_article_urls().await?;

    let mut report = PassReport {
        discovered: urls.len(),
        ..PassReport::default()
    };

    for url in &urls {
        match process_article(ctx, url).await {
            Ok(outcome) => {
                report.fetched += 1;
                match outcome {
                    ArticleOutcome::Alerted => report.alerted += 1,
                    ArticleOutcome::NoPrice => report.skipped_no_price += 1,
                    ArticleOutcome::BelowThreshold => report.skipped_below_threshold += 1,
                    ArticleOutcome::AlreadyProcessed => report.skipped_duplicate += 1,
                }
            }
            Err(e) => {
                report.failed += 1;
                warn!(url = %url, error = %e, "article skipped");
            }
        }
    }

    info!(
        discovered = report.discovered,
        fetched = report.fetched,
        alerted = report.alerted,
        no_price = report.skipped_no_price,
        below_threshold = report.skipped_below_threshold,
        duplicate = report.skipped_duplicate,
        failed = report.failed,
        "pass complete"
    );

    Ok(report)
}

/// One article, start to finish. The dedup check runs after all
/// computation and before any side effect; the store's unique insert is
/// the final guard against a concurrent pass.
async fn process_article(ctx: &PipelineContext, url: &str) -> Result<ArticleOutcome, AppError> {
    let article = ctx.source.fetch_article(url).await?;

    let Some(price_at_news) = extract_price(&article.body_text) else {
        // Most articles mention no per-share price; not an error.
        debug!(url, "no extractable price");
        return Ok(ArticleOutcome::NoPrice);
    };

    let price_now = ctx
        .price_lookup
        .current_price(&article.company_name)
        .await?;

    let decision = ratio::evaluate(price_at_news, price_now, ctx.threshold)?;

    info!(
        company = %article.company_name,
        price_at_news,
        price_now,
        ratio = decision.ratio,
        url,
        "article evaluated"
    );

    if !decision.qualifies {
        return Ok(ArticleOutcome::BelowThreshold);
    }

    if ctx.store.exists(url).await? {
        debug!(url, "alert already recorded");
        return Ok(ArticleOutcome::AlreadyProcessed);
    }

    let subject = format!(
        "Price for {} at moment of news is {}. Current stock price is {}. Ratio {}",
        article.company_name, price_at_news, price_now, decision.ratio
    );
    let body = format!(
        "{} \n\n {} \n\n Url: {}",
        article.subject, article.body_text, article.url
    );

    // Best-effort: a delivery failure must not stop the durable record.
    if let Err(e) = ctx
        .notifier
        .notify(&subject, &body, &ctx.receiver_email)
        .await
    {
        error!(url, error = %e, "notification failed, persisting alert anyway");
    }

    match ctx.store.insert(new_alert(&article, price_at_news, price_now)).await {
        Ok(_) => Ok(ArticleOutcome::Alerted),
        Err(AppError::DuplicateKey(_)) => {
            // Lost a race with an overlapping pass. The other writer owns
            // the record; a duplicate notification is tolerable, a
            // duplicate row is not.
            warn!(url, "concurrent pass already recorded this alert");
            Ok(ArticleOutcome::AlreadyProcessed)
        }
        Err(e) => Err(e),
    }
}

fn new_alert(article: &Article, price_at_news: f64, price_now: f64) -> NewAlert {
    NewAlert {
        article_at: article.published_at,
        company_name: article.company_name.clone(),
        subject: article.subject.clone(),
        url: article.url.clone(),
        body_text: article.body_text.clone(),
        price_at_news,
        price_now,
    }
}
