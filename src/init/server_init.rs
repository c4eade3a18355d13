use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::signup::{DynamoSignupStore, InMemorySignupStore, SignupStore};
use crate::routers::main_router::build_router;

use super::config::{AppConfig, StoreKind};
use super::state::ServerState;

pub async fn server_init_proc(
    start: tokio::time::Instant,
    config: AppConfig,
) -> anyhow::Result<()> {
    let signup_store: Arc<dyn SignupStore> = match config.store_kind {
        StoreKind::DynamoDb => Arc::new(DynamoSignupStore::from_config(&config).await),
        StoreKind::Memory => Arc::new(InMemorySignupStore::new(
            config.signup_table.clone(),
            config.key_attribute.clone(),
        )),
    };

    run_startup_probe(signup_store.as_ref()).await;

    let bind_addr = config.bind_addr;
    let state = Arc::new(
        ServerState::builder()
            .config(config)
            .server_start_time(start)
            .signup_store(signup_store)
            .build()?,
    );

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!(
        addr = %bind_addr,
        theme = %state.get_theme(),
        debug = state.is_debug(),
        elapsed = ?start.elapsed(),
        "Backend server starting..."
    );
    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Checks once that the signup table is reachable. A failure is logged and
/// startup carries on.
pub async fn run_startup_probe(store: &dyn SignupStore) {
    match store.describe().await {
        Ok(table) => info!(
            table = %table.table_name,
            status = %table.status,
            item_count = ?table.item_count,
            "Connected to signup table"
        ),
        Err(e) => error!(error = %e, "Could not connect to signup table"),
    }
}
