use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::signup::SignupStore;
use crate::init::config::AppConfig;

use super::builder::ServerStateBuilder;

pub struct ServerState {
    pub(crate) config: AppConfig,
    pub(crate) server_start_time: tokio::time::Instant,
    pub(crate) signup_store: Arc<dyn SignupStore>,
    pub(crate) responses_handled: AtomicU64,
}

impl ServerState {
    pub fn builder() -> ServerStateBuilder {
        ServerStateBuilder::default()
    }

    pub fn get_theme(&self) -> &str {
        &self.config.theme
    }

    pub fn is_debug(&self) -> bool {
        self.config.debug
    }

    pub fn get_signup_store(&self) -> &dyn SignupStore {
        self.signup_store.as_ref()
    }

    pub fn get_uptime(&self) -> tokio::time::Duration {
        self.server_start_time.elapsed()
    }

    pub fn get_responses_handled(&self) -> u64 {
        self.responses_handled.load(Ordering::SeqCst)
    }

    pub fn add_responses_handled(&self) {
        self.responses_handled.fetch_add(1, Ordering::SeqCst);
    }
}
