//! Background expiry polling.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::SessionManager;

/// How often the session token is re-checked unless configured otherwise.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(15 * 60);

const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// A running expiry poll. Stopping or dropping it cancels the timer.
#[derive(Debug)]
pub struct ExpiryWatcher {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl SessionManager {
    /// Check expiry now and then every `interval` until the returned watcher
    /// is stopped or dropped. Must be called from within a tokio runtime.
    pub fn start_expiry_watch(&self, interval: Duration) -> ExpiryWatcher {
        let interval = interval.max(MIN_CHECK_INTERVAL);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let session = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcome = session.check_expiry();
                        debug!(?outcome, "Periodic session expiry check");
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            debug!("Expiry watcher stopped");
        });

        debug!(interval = ?interval, "Expiry watcher started");

        ExpiryWatcher {
            shutdown,
            handle: Some(handle),
        }
    }
}

impl ExpiryWatcher {
    /// Stop polling and wait for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.await {
            warn!(error = %e, "Expiry watcher task failed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Clock, FixedClock, SessionState};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Panics once `broken` is set, so the watcher task dies on its next check.
    #[derive(Clone)]
    struct BrokenClock {
        inner: FixedClock,
        broken: Arc<AtomicBool>,
    }

    impl Clock for BrokenClock {
        fn now(&self) -> DateTime<Utc> {
            if self.broken.load(Ordering::SeqCst) {
                panic!("clock unavailable");
            }
            self.inner.now()
        }
    }

    fn token_expiring(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp }).to_string());
        format!("h.{payload}.s")
    }

    fn setup() -> (SessionManager, FixedClock) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        (SessionManager::new(clock.clone()), clock)
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_poll_signs_out_after_expiry() {
        let (session, clock) = setup();
        let exp = clock.now().timestamp() + 10 * 60;
        session.sign_in(token_expiring(exp), json!({}));

        let watcher = session.start_expiry_watch(DEFAULT_CHECK_INTERVAL);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(session.state(), SessionState::SignedIn);

        clock.advance(chrono::Duration::minutes(20));
        tokio::time::sleep(DEFAULT_CHECK_INTERVAL).await;
        assert_eq!(session.state(), SessionState::SignedOut);

        watcher.stop().await;
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_stopped_watcher_no_longer_checks() {
        let (session, clock) = setup();
        let exp = clock.now().timestamp() + 60;
        session.sign_in(token_expiring(exp), json!({}));

        let watcher = session.start_expiry_watch(DEFAULT_CHECK_INTERVAL);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(watcher.is_running());
        watcher.stop().await;

        clock.advance(chrono::Duration::hours(1));
        tokio::time::sleep(DEFAULT_CHECK_INTERVAL * 2).await;
        assert_eq!(session.state(), SessionState::SignedIn);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_dropping_watcher_cancels_it() {
        let (session, clock) = setup();
        let exp = clock.now().timestamp() + 60;
        session.sign_in(token_expiring(exp), json!({}));

        drop(session.start_expiry_watch(DEFAULT_CHECK_INTERVAL));

        clock.advance(chrono::Duration::hours(1));
        tokio::time::sleep(DEFAULT_CHECK_INTERVAL * 2).await;
        assert_eq!(session.state(), SessionState::SignedIn);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_first_check_runs_immediately() {
        let (session, clock) = setup();
        let exp = clock.now().timestamp() + 60;
        session.sign_in(token_expiring(exp), json!({}));
        clock.advance(chrono::Duration::minutes(2));

        let _watcher = session.start_expiry_watch(DEFAULT_CHECK_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_stop_after_task_panicked() {
        let clock = BrokenClock {
            inner: FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            broken: Arc::new(AtomicBool::new(false)),
        };
        let session = SessionManager::new(clock.clone());
        let exp = clock.now().timestamp() + 60;
        session.sign_in(token_expiring(exp), json!({}));

        clock.broken.store(true, Ordering::SeqCst);
        let watcher = session.start_expiry_watch(DEFAULT_CHECK_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!watcher.is_running());
        watcher.stop().await;
        assert_eq!(session.state(), SessionState::SignedIn);
    }
}
