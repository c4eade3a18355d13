use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use crate::domain::signup::SignupStore;
use crate::init::config::AppConfig;

use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    config: Option<AppConfig>,
    server_start_time: Option<tokio::time::Instant>,
    signup_store: Option<Arc<dyn SignupStore>>,
}

impl ServerStateBuilder {
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn signup_store(mut self, signup_store: Arc<dyn SignupStore>) -> Self {
        self.signup_store = Some(signup_store);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            config: self
                .config
                .ok_or_else(|| anyhow::anyhow!("config is required"))?,
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow::anyhow!("server_start_time is required"))?,
            signup_store: self
                .signup_store
                .ok_or_else(|| anyhow::anyhow!("signup_store is required"))?,
            responses_handled: AtomicU64::new(0u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signup::InMemorySignupStore;

    #[test]
    fn build_fails_without_store() {
        let config = AppConfig::from_lookup(|key| match key {
            "AWS_REGION" => Some("us-east-1".to_string()),
            "STARTUP_SIGNUP_TABLE" => Some("signups".to_string()),
            _ => None,
        })
        .unwrap();

        let err = ServerState::builder()
            .config(config.clone())
            .server_start_time(tokio::time::Instant::now())
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("signup_store"));

        let state = ServerState::builder()
            .config(config)
            .server_start_time(tokio::time::Instant::now())
            .signup_store(Arc::new(InMemorySignupStore::new("signups", "email")))
            .build()
            .unwrap();
        assert_eq!(state.get_responses_handled(), 0);
        assert_eq!(state.get_theme(), "default");
    }
}
