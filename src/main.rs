use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use pricewatch_backend::app;
use pricewatch_backend::config::Config;
use pricewatch_backend::db::{AlertStore, PgAlertStore};
use pricewatch_backend::external::{
    ArticleSource, FixedPriceLookup, InvestingLookup, MfnSource, PriceLookup,
};
use pricewatch_backend::logging::{init_logging, LoggingConfig};
use pricewatch_backend::services::job_scheduler_service::JobSchedulerService;
use pricewatch_backend::services::notifier::{LogNotifier, Notifier, SmtpNotifier};
use pricewatch_backend::services::pipeline::PipelineContext;
use pricewatch_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    // Unusable configuration is fatal before any pass starts.
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn AlertStore> = Arc::new(PgAlertStore::new(pool));

    let source: Arc<dyn ArticleSource> = Arc::new(MfnSource::new(
        config.news_base_url.clone(),
        config.article_window,
        config.http_timeout_secs,
    )?);

    // The real quote feed's guarantees are still unsettled; default to the
    // fixed lookup unless PRICE_LOOKUP=investing is set.
    let lookup_name = std::env::var("PRICE_LOOKUP").unwrap_or_else(|_| "fixed".to_string());
    let price_lookup: Arc<dyn PriceLookup> = match lookup_name.to_lowercase().as_str() {
        "investing" => {
            tracing::info!("Using price lookup: investing.com");
            Arc::new(InvestingLookup::new(config.http_timeout_secs)?)
        }
        "fixed" => {
            let price = std::env::var("FIXED_PRICE")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(2.0);
            tracing::info!("Using price lookup: fixed at {}", price);
            Arc::new(FixedPriceLookup::new(price))
        }
        other => {
            return Err(format!(
                "Invalid PRICE_LOOKUP: {}. Must be 'fixed' or 'investing'",
                other
            )
            .into());
        }
    };

    let notifier: Arc<dyn Notifier> = if config.smtp.enabled {
        Arc::new(SmtpNotifier::new(&config.smtp)?)
    } else {
        tracing::warn!("SMTP disabled, notifications will be logged only");
        Arc::new(LogNotifier)
    };

    let pipeline = Arc::new(PipelineContext {
        source,
        price_lookup,
        notifier,
        store: store.clone(),
        threshold: config.alert_threshold,
        receiver_email: config.receiver_email.clone(),
    });

    let mut scheduler = JobSchedulerService::new(pipeline.clone()).await?;
    scheduler.start(&config.scan_cron).await?;

    let app = app::create_app(AppState { store, pipeline });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Pricewatch backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
