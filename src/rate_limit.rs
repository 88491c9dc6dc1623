//! Per-client request budget.
//!
//! Time is cut into fixed windows counted from limiter creation. Each client
//! gets its own governor cell per window, keyed by `(ip, window index)`,
//! holding a burst of `N` that only replenishes one cell per full window.
//! Within one window at most `N` requests pass; the next window starts from a
//! fresh key with the whole budget.

use std::{net::IpAddr, num::NonZeroU32, time::Duration};

use governor::{
    clock::{Clock, DefaultClock, Reference},
    middleware::NoOpMiddleware,
    state::keyed::HashMapStateStore,
    Quota, RateLimiter,
};

use crate::errors::GatewayError;

pub const DEFAULT_BUDGET: u32 = 50;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

type WindowKey = (IpAddr, u64);

pub struct ClientRateLimiter<C: Clock = DefaultClock> {
    limiter:
        RateLimiter<WindowKey, HashMapStateStore<WindowKey>, C, NoOpMiddleware<C::Instant>>,
    clock: C,
    origin: C::Instant,
    window: Duration,
}

impl ClientRateLimiter<DefaultClock> {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self::with_clock(budget, window, DefaultClock::default())
    }
}

impl<C: Clock + Clone> ClientRateLimiter<C> {
    pub fn with_clock(budget: u32, window: Duration, clock: C) -> Self {
        let burst = NonZeroU32::new(budget).unwrap_or(NonZeroU32::MIN);
        let window = if window.is_zero() {
            DEFAULT_WINDOW
        } else {
            window
        };
        let quota = Quota::with_period(window)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::hashmap_with_clock(quota, clock.clone()),
            origin: clock.now(),
            clock,
            window,
        }
    }

    /// Consumes one unit of `client`'s budget for the current window, or
    /// reports how long until the window closes.
    pub fn check(&self, client: IpAddr) -> Result<(), GatewayError> {
        let elapsed = Duration::from(self.clock.now().duration_since(self.origin));
        let window_nanos = self.window.as_nanos().max(1);
        let index = elapsed.as_nanos() / window_nanos;
        let key = (client, u64::try_from(index).unwrap_or(u64::MAX));

        self.limiter.check_key(&key).map_err(|_| {
            let window_end = window_nanos.saturating_mul(index + 1);
            let remaining = window_end.saturating_sub(elapsed.as_nanos());
            let retry_after = Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX));
            tracing::debug!(client = %client, ?retry_after, "request rejected by rate limiter");
            GatewayError::RateLimited { retry_after }
        })
    }

    /// Drops cells of windows that can no longer be charged.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

impl Default for ClientRateLimiter<DefaultClock> {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET, DEFAULT_WINDOW)
    }
}
