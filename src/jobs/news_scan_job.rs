use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::pipeline;
use tracing::info;

/// One scheduled pass over the recent news window.
///
/// Discovery, fetch, price extraction, ratio evaluation and alerting all
/// happen inside `pipeline::run_pass`; this wrapper only translates the
/// pass report into the scheduler's result shape.
pub async fn run_news_scan(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("Starting news scan job");

    let report = pipeline::run_pass(&ctx.pipeline).await?;

    Ok(JobResult {
        items_processed: (report.fetched) as i32,
        items_failed: report.failed as i32,
    })
}
