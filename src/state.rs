use crate::backend::HttpBackend;
use crate::chart::ChartSessions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub backend: HttpBackend,
    pub charts: Arc<ChartSessions>,
}

impl AppState {
    pub fn new(backend: HttpBackend) -> Self {
        Self {
            backend,
            charts: Arc::new(ChartSessions::new()),
        }
    }
}
