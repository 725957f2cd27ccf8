use std::sync::Arc;

use chatpush_config::Settings;
use chatpush_services::push::{FcmClient, PushSend};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub push: Arc<dyn PushSend>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let push = Arc::new(FcmClient::new(settings.fcm.clone()));
        Self { settings, push }
    }

    /// State around a caller-provided push backend; tests inject a fake here.
    pub fn with_push(settings: Settings, push: Arc<dyn PushSend>) -> Self {
        Self { settings, push }
    }
}
