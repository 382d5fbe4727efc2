use crate::errors::AppError;
use crate::jobs::news_scan_job;
use crate::services::pipeline::PipelineContext;
use chrono::Utc;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub pipeline: Arc<PipelineContext>,
}

#[derive(Debug)]
pub struct JobResult {
    pub items_processed: i32,
    pub items_failed: i32,
}

pub struct JobSchedulerService {
    scheduler: JobScheduler,
    context: JobContext,
}

impl JobSchedulerService {
    pub async fn new(pipeline: Arc<PipelineContext>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Config(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            context: JobContext { pipeline },
        })
    }

    /// Start all scheduled jobs
    pub async fn start(&mut self, scan_cron: &str) -> Result<(), AppError> {
        info!("Starting job scheduler...");

        // Test mode runs the scan every minute regardless of SCAN_CRON
        let test_mode = std::env::var("JOB_SCHEDULER_TEST_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let (schedule, description) = if test_mode {
            ("0 */1 * * * *".to_string(), "Every minute (TEST MODE)")
        } else {
            (scan_cron.to_string(), "News scan on configured cron")
        };

        self.schedule_job(&schedule, "news_scan", description, news_scan_job::run_news_scan)
            .await?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::Config(format!("Failed to start scheduler: {}", e)))?;

        Ok(())
    }

    async fn schedule_job<F, Fut>(
        &mut self,
        schedule: &str,
        job_name: &'static str,
        description: &str,
        job_fn: F,
    ) -> Result<(), AppError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<JobResult, AppError>> + Send + 'static,
    {
        let context = self.context.clone();
        let job_fn = Arc::new(job_fn);

        let job = Job::new_async(schedule, move |_uuid, _l| {
            let context = context.clone();
            let job_fn = job_fn.clone();
            Box::pin(async move {
                execute_job(job_name, context, job_fn).await;
            })
        })
        .map_err(|e| AppError::Config(format!("Failed to create job {}: {}", job_name, e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Config(format!("Failed to add job {}: {}", job_name, e)))?;

        info!("Scheduled: {} - {} [cron: {}]", job_name, description, schedule);
        Ok(())
    }
}

async fn execute_job<F, Fut>(job_name: &str, context: JobContext, job_fn: Arc<F>)
where
    F: Fn(JobContext) -> Fut,
    Fut: std::future::Future<Output = Result<JobResult, AppError>>,
{
    info!("Starting job: {}", job_name);
    let started_at = Utc::now();

    let result = job_fn(context).await;

    let duration_ms = (Utc::now() - started_at).num_milliseconds();

    match result {
        Ok(job_result) => {
            info!(
                "Job completed: {} (processed: {}, failed: {}, duration: {}ms)",
                job_name, job_result.items_processed, job_result.items_failed, duration_ms
            );
        }
        Err(e) => {
            error!("Job failed: {} - {} ({}ms)", job_name, e, duration_ms);
        }
    }
}
