use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

/// Hits counted for one client in its current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Fixed-window request counter keyed by client IP.
///
/// A client's window opens on its first request and lasts `window`; once
/// it has elapsed the next request opens a fresh one. Counters live only in
/// memory and are lost on restart.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: DashMap::new(),
        }
    }

    /// Counts a request from `client`. Returns false once the client is over
    /// the cap; rejected requests are not counted.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        // the entry guard holds the shard lock, so reset and increment are atomic
        let mut entry = self.clients.entry(client).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.max_requests {
            return false;
        }
        entry.hits += 1;
        true
    }

    /// Drops clients whose window has closed.
    fn sweep_at(&self, now: Instant) {
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    /// Spawns a task that sweeps expired clients once per window.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.window);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let before = limiter.clients.len();
                limiter.sweep_at(Instant::now());
                tracing::debug!(
                    "rate limiter swept {} expired clients",
                    before.saturating_sub(limiter.clients.len())
                );
            }
        })
    }
}

/// Rejects requests over the limit with 429 before they reach a handler.
///
/// Needs the router to be served with connect info
/// (`into_make_service_with_connect_info::<SocketAddr>`).
pub async fn limit_by_client(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = addr.ip();

    if limiter.check(client) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response()
    }
}
