use crate::config::AppConfig;
use crate::services::agenda::AgendaStore;
use crate::services::backend::BookingApi;
use crate::services::notifications::Notifier;

pub struct AppState {
    pub config: AppConfig,
    pub api: Box<dyn BookingApi>,
    pub agenda: AgendaStore,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: AppConfig, api: Box<dyn BookingApi>) -> Self {
        Self {
            config,
            api,
            agenda: AgendaStore::new(),
            notifier: Notifier::new(),
        }
    }
}
