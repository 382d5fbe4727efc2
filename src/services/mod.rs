pub mod job_scheduler_service;
pub mod notifier;
pub mod pipeline;
pub mod price_extractor;
pub mod ratio;
