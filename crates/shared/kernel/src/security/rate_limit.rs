use crate::server::ApiError;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::sync::Cache;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tport_domain::config::RateLimitConfig;
use tracing::warn;

/// Fixed-window request counter per client address.
///
/// A counter is created on the first request of a window and expires `window` later regardless
/// of traffic, which resets the budget.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    counters: Cache<IpAddr, Arc<AtomicU32>>,
    max_requests: u32,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration, capacity: u64) -> Self {
        Self {
            counters: Cache::builder().max_capacity(capacity).time_to_live(window).build(),
            max_requests,
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_seconds), config.capacity)
    }

    /// Counts one request from `ip`; `false` once the window budget is spent.
    pub fn allow(&self, ip: IpAddr) -> bool {
        let counter = self.counters.get_with(ip, || Arc::new(AtomicU32::new(0)));
        counter.fetch_add(1, Ordering::Relaxed) < self.max_requests
    }
}

/// Middleware rejecting requests over the budget with `429`.
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let ip = client_ip(
        request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0),
        request.headers(),
    );
    if limiter.allow(ip) {
        next.run(request).await
    } else {
        warn!(%ip, path = %request.uri().path(), "Rate limit exceeded");
        ApiError::TooManyRequests { message: "Too many requests".into(), context: None }
            .into_response()
    }
}

/// Peer address when the listener provides it, else the first `X-Forwarded-For` hop.
#[must_use]
pub fn client_ip(peer: Option<SocketAddr>, headers: &HeaderMap) -> IpAddr {
    peer.map(|addr| addr.ip())
        .or_else(|| {
            headers
                .get("x-forwarded-for")?
                .to_str()
                .ok()?
                .split(',')
                .next()?
                .trim()
                .parse()
                .ok()
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
