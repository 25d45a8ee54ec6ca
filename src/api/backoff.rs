//! Waiting policies
//!
//! Two fixed policies pause the client: the cooldown after an HTTP 429 and the
//! courtesy delay during long pagination runs. Both wait through a [`Sleeper`]
//! so tests can observe the waits without sleeping.

use crate::config::RateLimitSettings;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Blocking wait on the tokio timer; cannot be cut short
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Wait that another task can cut short with [`InterruptibleSleeper::interrupt`]
#[derive(Debug, Clone, Default)]
pub struct InterruptibleSleeper {
    notify: Arc<Notify>,
}

impl InterruptibleSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the wait in progress, or the next one if none is running
    pub fn interrupt(&self) {
        self.notify.notify_one();
    }
}

#[async_trait]
impl Sleeper for InterruptibleSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.notify.notified() => {
                tracing::info!("Wait of {:?} interrupted", duration);
            }
        }
    }
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Fixed cooldown after the API answered 429
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub cooldown: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(5 * 60),
        }
    }
}

impl From<&RateLimitSettings> for RateLimitPolicy {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            cooldown: Duration::from_secs(settings.cooldown_secs),
        }
    }
}

/// Random pause inserted every `every` items during bulk pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtesyDelay {
    pub every: usize,
    pub min: Duration,
    pub max: Duration,
}

impl Default for CourtesyDelay {
    fn default() -> Self {
        Self {
            every: 20_000,
            min: Duration::from_secs(120),
            max: Duration::from_secs(180),
        }
    }
}

impl From<&RateLimitSettings> for CourtesyDelay {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            every: settings.courtesy_every.max(1),
            min: Duration::from_secs(settings.courtesy_min_secs),
            max: Duration::from_secs(settings.courtesy_max_secs.max(settings.courtesy_min_secs)),
        }
    }
}

impl CourtesyDelay {
    /// Pick a delay uniformly in `[min, max]`
    pub fn pick(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}
