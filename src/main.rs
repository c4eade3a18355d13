use init::{config::AppConfig, server_init::server_init_proc};
use tracing::{Level, info};

// modules tree
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}
pub mod domain {
    pub mod signup;
}
pub mod errors {
    pub mod code_error;
}
pub mod handlers {
    pub mod root;
    pub mod signup;
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod logging;
    }

    #[cfg(test)]
    mod tests;
}
pub mod init {
    pub mod config;
    pub mod server_init;
    pub mod state;
}
pub mod util {
    pub mod time {
        pub mod now;
    }
}

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();

    let config = AppConfig::load()?;
    init_tracing(config.debug, config.log_json);

    info!(
        build_time = build_info::BUILD_TIME,
        server = build_info::AXUM_VERSION,
        rustc = build_info::RUST_VERSION,
        "Initializing server..."
    );
    server_init_proc(start, config).await?;

    Ok(())
}

fn init_tracing(debug: bool, json: bool) {
    let max_level = if debug { Level::DEBUG } else { Level::INFO };

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(max_level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(max_level).init();
    }
}
