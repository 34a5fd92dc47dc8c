//! Fixed-window request limiting per client IP.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::config::RateLimit;
use crate::state::AppState;

struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(limit: &RateLimit) -> Self {
        Self {
            max_requests: limit.max_requests,
            window: limit.window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request from `ip` and report whether it is within the limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        // Forget clients whose window is over so the map stays small.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let entry = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        entry.count += 1;
        entry.count <= self.max_requests
    }
}

/// First address of `X-Forwarded-For`, then the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| peer.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    if !state.rate_limiter.check(ip) {
        tracing::warn!(%ip, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Demasiadas solicitudes, intenta de nuevo más tarde"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimit {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_limit_applies_per_ip() {
        let limiter = limiter(2);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        let now = Instant::now();

        assert!(limiter.check_at(a, now));
        assert!(limiter.check_at(a, now));
        assert!(!limiter.check_at(a, now));
        assert!(limiter.check_at(b, now));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert!(limiter.check_at(ip, start));
        assert!(!limiter.check_at(ip, start + Duration::from_secs(30)));
        assert!(limiter.check_at(ip, start + Duration::from_secs(61)));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(peer)),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), peer.ip());
        assert_eq!(
            client_ip(&HeaderMap::new(), None),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }
}
