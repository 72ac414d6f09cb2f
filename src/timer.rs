//! Timer collaborator (§4.7, §6): schedules the per-request timeout
//! `Core::send` registers on dispatch, firing a callback once after the
//! requested delay unless cancelled first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// A handle to a scheduled timeout, cancellable before it fires.
pub trait TimerHandle: Send + Sync {
    fn cancel(&self);
}

/// Schedules timeout callbacks for in-flight requests (§4.6, §6).
#[async_trait]
pub trait Timer: Send + Sync {
    /// Schedules `on_expire` to run after `after` unless cancelled first.
    fn schedule(&self, after: Duration, on_expire: Box<dyn FnOnce() + Send>) -> Box<dyn TimerHandle>;
}

/// Shared cancellation flag backing the tokio-based timers below: `cancel()`
/// sets it, and the spawned task checks it right before firing.
struct FlagHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle for FlagHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Production timer backed by `tokio::time::sleep` (§6).
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, after: Duration, on_expire: Box<dyn FnOnce() + Send>) -> Box<dyn TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if !flag.load(Ordering::Acquire) {
                on_expire();
            }
        });
        Box::new(FlagHandle { cancelled })
    }
}
