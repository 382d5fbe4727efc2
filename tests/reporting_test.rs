//! The read-only reporting surface: pagination over persisted alerts,
//! with ratios matching the evaluator's arithmetic.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use pricewatch_backend::app::create_app;
use pricewatch_backend::db::AlertStore;
use pricewatch_backend::errors::AppError;
use pricewatch_backend::external::{ArticleSource, FixedPriceLookup};
use pricewatch_backend::models::{Alert, Article, NewAlert};
use pricewatch_backend::services::notifier::{LogNotifier, Notifier};
use pricewatch_backend::services::pipeline::PipelineContext;
use pricewatch_backend::state::AppState;

#[derive(Default)]
struct MemoryAlertStore {
    rows: Mutex<Vec<Alert>>,
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn exists(&self, url: &str) -> Result<bool, AppError> {
        Ok(self.rows.lock().unwrap().iter().any(|a| a.url == url))
    }

    async fn insert(&self, alert: NewAlert) -> Result<Alert, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.url == alert.url) {
            return Err(AppError::DuplicateKey(alert.url));
        }
        let inserted = Alert {
            id: rows.len() as i64 + 1,
            recorded_at: Utc::now(),
            article_at: alert.article_at,
            company_name: alert.company_name,
            subject: alert.subject,
            url: alert.url,
            body_text: alert.body_text,
            price_at_news: alert.price_at_news,
            price_now: alert.price_now,
        };
        rows.push(inserted.clone());
        Ok(inserted)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<Alert>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct EmptySource;

#[async_trait]
impl ArticleSource for EmptySource {
    async fn list_article_urls(&self) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }

    async fn fetch_article(&self, url: &str) -> Result<Article, AppError> {
        Err(AppError::Fetch(format!("{}: not scripted", url)))
    }
}

fn test_state(store: Arc<MemoryAlertStore>) -> AppState {
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let pipeline = Arc::new(PipelineContext {
        source: Arc::new(EmptySource),
        price_lookup: Arc::new(FixedPriceLookup::new(2.0)),
        notifier,
        store: store.clone(),
        threshold: 1.03,
        receiver_email: "alerts@example.com".to_string(),
    });
    AppState { store, pipeline }
}

async fn seed(store: &MemoryAlertStore, n: usize) {
    for i in 1..=n {
        store
            .insert(NewAlert {
                article_at: Utc.with_ymd_and_hms(2021, 3, 4, 9, 15, 0).unwrap(),
                company_name: format!("Company {}", i),
                subject: format!("Subject {}", i),
                url: format!("https://mfn.se/x/{}", i),
                body_text: "body".to_string(),
                price_at_news: 10.0,
                price_now: 11.0,
            })
            .await
            .unwrap();
    }
}

async fn get_json(state: AppState, uri: &str) -> serde_json::Value {
    let app = create_app(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn alerts_page_is_newest_first_with_total() {
    let store = Arc::new(MemoryAlertStore::default());
    seed(&store, 3).await;

    let body = get_json(test_state(store), "/api/alerts?page=1&per_page=2").await;

    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["company_name"], "Company 3");
    assert_eq!(items[1]["company_name"], "Company 2");
    assert_eq!(items[0]["text"], "Subject 3 body");
    assert_eq!(items[0]["url"], "https://mfn.se/x/3");
    // price_now / price_at_news, same arithmetic as the evaluator
    assert!((items[0]["ratio"].as_f64().unwrap() - 1.1).abs() < 1e-12);
}

#[tokio::test]
async fn second_page_holds_the_remainder() {
    let store = Arc::new(MemoryAlertStore::default());
    seed(&store, 3).await;

    let body = get_json(test_state(store), "/api/alerts?page=2&per_page=2").await;

    assert_eq!(body["total"], 3);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["company_name"], "Company 1");
}

#[tokio::test]
async fn defaults_and_bounds_are_applied() {
    let store = Arc::new(MemoryAlertStore::default());
    seed(&store, 1).await;

    // No params: page 1, per_page 10.
    let body = get_json(test_state(store.clone()), "/api/alerts").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);

    // Out-of-range values are clamped instead of erroring.
    let body = get_json(test_state(store), "/api/alerts?page=0&per_page=5000").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 100);
}

#[tokio::test]
async fn huge_page_number_serves_an_empty_page() {
    let store = Arc::new(MemoryAlertStore::default());
    seed(&store, 3).await;

    // Offset arithmetic must saturate at the i64 boundary, not overflow.
    let uri = format!("/api/alerts?page={}&per_page=100", i64::MAX);
    let body = get_json(test_state(store), &uri).await;

    assert_eq!(body["total"], 3);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_store_serves_an_empty_page() {
    let store = Arc::new(MemoryAlertStore::default());

    let body = get_json(test_state(store), "/api/alerts").await;

    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoint_responds() {
    let store = Arc::new(MemoryAlertStore::default());
    let app = create_app(test_state(store));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
