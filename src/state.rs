use std::sync::Arc;

use crate::db::AlertStore;
use crate::services::pipeline::PipelineContext;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AlertStore>,
    pub pipeline: Arc<PipelineContext>,
}
