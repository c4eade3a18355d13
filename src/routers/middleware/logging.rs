use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, Response},
    middleware::Next,
};
use chrono::Utc;
use tokio::time::Instant;
use tracing::Level;

use crate::{
    build_info::{AXUM_VERSION, BUILD_TIME, RUST_VERSION},
    init::state::ServerState,
};

const ERROR_HEADERS: [&str; 5] = [
    "x-error-log-level",
    "x-error-status-code",
    "x-error-code",
    "x-error-message",
    "x-error-detail",
];

// by default, debug and below not logged at all; hence why
macro_rules! log_codeerror {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

pub async fn log_middleware(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    // earliest possible timestamp of server-received request, read by handlers
    let now = Utc::now();

    state.add_responses_handled();

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = client_ip(request.headers(), peer);

    tracing::info!(kind = %"RECV", method = %method, path = %path, client_ip = ?client_ip);
    request.extensions_mut().insert(now);

    let mut response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();
    let headers = response.headers_mut();

    if status.is_success() {
        tracing::info!(
            kind = %"RESP",
            method = %method,
            path = %path,
            client_ip = ?client_ip,
            status = %status.as_u16(),
            duration = ?duration
        );
    } else if headers.contains_key("x-error-code") {
        let log_level = header_value_to_str(headers.get("x-error-log-level")).unwrap_or("INFO");
        let error_code = header_value_to_str(headers.get("x-error-code")).unwrap_or("");
        let message = header_value_to_str(headers.get("x-error-message")).unwrap_or("");
        let detail = header_value_to_str(headers.get("x-error-detail")).unwrap_or("");

        log_codeerror!(
            log_level.parse::<Level>().unwrap_or(Level::ERROR),
            kind = %"ERSP",
            method = %method,
            path = %path,
            client_ip = ?client_ip,
            status = %status.as_u16(),
            duration = ?duration,
            error_code = %error_code,
            message = %message,
            detail = %detail
        );
    } else {
        tracing::info!(
            kind = %"ERSP",
            method = %method,
            path = %path,
            client_ip = ?client_ip,
            status = %status.as_u16(),
            duration = ?duration
        );
    }

    for name in ERROR_HEADERS {
        headers.remove(name);
    }

    headers.insert("x-server-built-time", HeaderValue::from_static(BUILD_TIME));
    headers.insert("x-server-name", HeaderValue::from_static(AXUM_VERSION));
    headers.insert("x-server-rust-version", HeaderValue::from_static(RUST_VERSION));

    response
}

/// Prefers the first `x-forwarded-for` hop over the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
        .or_else(|| peer.map(|addr| addr.ip()))
}

fn header_value_to_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer = Some("127.0.0.1:40000".parse().unwrap());

        assert_eq!(
            client_ip(&headers, peer),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn falls_back_to_peer_address() {
        let headers = HeaderMap::new();
        let peer = Some("192.0.2.10:5000".parse().unwrap());

        assert_eq!(client_ip(&headers, peer), Some("192.0.2.10".parse().unwrap()));
        assert_eq!(client_ip(&headers, None), None);
    }
}
