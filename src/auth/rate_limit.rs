use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

/// Attempts are counted separately for every client address and auth route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    pub ip: IpAddr,
    pub route: String,
}

impl AttemptKey {
    pub fn new(ip: IpAddr, route: impl Into<String>) -> Self {
        Self {
            ip,
            route: route.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    attempts: u32,
}

/// In-memory fixed-window limiter for the credential endpoints.
#[derive(Clone)]
pub struct RateLimitState {
    max_attempts: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<AttemptKey, Window>>>,
}

impl RateLimitState {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.auth_rate_limit_max,
            Duration::from_secs(config.auth_rate_limit_window_secs),
        )
    }

    /// Records one attempt. `Ok` carries the attempts left in the current
    /// window, `Err` the time until the window reopens.
    pub async fn record_attempt(&self, key: &AttemptKey) -> Result<u32, Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.clone()).or_insert(Window {
            opened_at: now,
            attempts: 0,
        });
        let elapsed = now.duration_since(window.opened_at);
        if elapsed > self.window {
            *window = Window {
                opened_at: now,
                attempts: 0,
            };
        }

        if window.attempts >= self.max_attempts {
            return Err(self.window.saturating_sub(elapsed));
        }
        window.attempts += 1;
        Ok(self.max_attempts - window.attempts)
    }

    /// Forgets windows that closed more than one window length ago.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let horizon = self.window * 2;
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.opened_at) < horizon);
        tracing::debug!(dropped = before - windows.len(), "Rate limit windows pruned");
    }

    #[cfg(test)]
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn retry_after_secs(wait: Duration) -> u64 {
    // round up so clients never retry a moment too early
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = AttemptKey::new(addr.ip(), req.uri().path());

    match state.rate_limiter.record_attempt(&key).await {
        Ok(remaining) => {
            tracing::debug!(ip = %key.ip, route = %key.route, remaining, "Auth attempt allowed");
            Ok(next.run(req).await)
        }
        Err(wait) => {
            let retry_after_secs = retry_after_secs(wait);
            tracing::warn!(
                ip = %key.ip,
                route = %key.route,
                retry_after_secs,
                "Auth rate limit exceeded"
            );
            Err(AppError::RateLimited { retry_after_secs })
        }
    }
}
