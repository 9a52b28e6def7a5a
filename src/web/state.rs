use std::sync::Arc;

use crate::config::Config;
use crate::render::RenderJob;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub job: RenderJob,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let job = RenderJob::from_config(&config);
        AppState {
            config: Arc::new(config),
            job,
        }
    }

    pub fn store(&self) -> RecordStore {
        RecordStore::new(self.config.store.records.clone())
    }
}
