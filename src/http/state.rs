use crate::correction::RequestDefaults;
use crate::storage::AudioStore;
use crate::task::TaskRunner;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub runner: TaskRunner,
    pub audio_store: Arc<dyn AudioStore>,
    pub defaults: RequestDefaults,
}

impl AppState {
    pub fn new(
        runner: TaskRunner,
        audio_store: Arc<dyn AudioStore>,
        defaults: RequestDefaults,
    ) -> Self {
        Self {
            runner,
            audio_store,
            defaults,
        }
    }
}
