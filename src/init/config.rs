use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, anyhow};

pub const APPLICATION_CONFIG_FILE: &str = "application.config";

const DEFAULT_THEME: &str = "default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_KEY_ATTRIBUTE: &str = "email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    DynamoDb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub theme: String,
    pub debug: bool,
    pub aws_region: String,
    pub signup_table: String,
    pub bind_addr: SocketAddr,
    pub store_kind: StoreKind,
    pub key_attribute: String,
    pub dynamodb_endpoint_url: Option<String>,
    pub log_json: bool,
}

impl AppConfig {
    /// Reads `.env` (unless running on AWS), the process environment and the
    /// optional `application.config` file. Values in the file win over the
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        if std::env::var("IS_AWS").is_err() {
            allow_missing_env_file(dotenvy::dotenv())?;
        }

        let file_values = read_config_file(Path::new(APPLICATION_CONFIG_FILE))?;

        Self::from_lookup(|key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let theme = lookup("THEME").unwrap_or_else(|| DEFAULT_THEME.to_string());

        // FLASK_DEBUG is the older name of the same switch
        let debug_flag = lookup("DEBUG").or_else(|| lookup("FLASK_DEBUG"));
        let debug = parse_debug_flag(debug_flag.as_deref());

        let aws_region = lookup("AWS_REGION")
            .ok_or_else(|| anyhow!("Environment variable AWS_REGION not found"))?;

        let signup_table = lookup("STARTUP_SIGNUP_TABLE")
            .ok_or_else(|| anyhow!("Environment variable STARTUP_SIGNUP_TABLE not found"))?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let store_kind = match lookup("SIGNUP_STORE").as_deref() {
            None => StoreKind::DynamoDb,
            Some(s) => match s.trim().to_ascii_lowercase().as_str() {
                "dynamodb" | "dynamo" | "ddb" => StoreKind::DynamoDb,
                "memory" | "mem" | "in-memory" => StoreKind::Memory,
                other => return Err(anyhow!("Unsupported SIGNUP_STORE: {other}")),
            },
        };

        let key_attribute =
            lookup("SIGNUP_KEY_ATTRIBUTE").unwrap_or_else(|| DEFAULT_KEY_ATTRIBUTE.to_string());

        let dynamodb_endpoint_url = lookup("DYNAMODB_ENDPOINT_URL").filter(|s| !s.is_empty());

        let log_json = lookup("LOG_FORMAT")
            .map(|v| v.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(AppConfig {
            theme,
            debug,
            aws_region,
            signup_table,
            bind_addr,
            store_kind,
            key_attribute,
            dynamodb_endpoint_url,
            log_json,
        })
    }
}

/// Only the exact string `"true"` turns debug mode on.
pub fn parse_debug_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn allow_missing_env_file<T>(result: Result<T, dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context("Could not load .env")),
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let mut values = HashMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Could not parse {}", path.display()))?;
        values.insert(key, value);
    }

    Ok(values)
}
