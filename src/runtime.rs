//! Drives a shared [`Page`] on tokio timers.
//!
//! One task owns the tick for the whole page. Visibility changes arrive on a
//! `watch` channel; dropping its sender ends the task.

use crate::page::Page;
use crate::scheduler::Visibility;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub type SharedPage = Arc<Mutex<Page>>;

/// Wrap a page for sharing between the tick task and the host application.
pub fn shared(page: Page) -> SharedPage {
    Arc::new(Mutex::new(page))
}

/// Wall-clock source in Unix milliseconds.
pub trait TimeSource: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Wall-clock time derived from tokio's clock, so paused-time tests stay
/// consistent with timer deadlines.
#[derive(Debug, Clone, Copy)]
pub struct TokioTime {
    origin_ms: i64,
    start: Instant,
}

impl TokioTime {
    /// Report `origin_ms` now and advance with tokio's clock from here.
    pub fn starting_at(origin_ms: i64) -> Self {
        TokioTime {
            origin_ms,
            start: Instant::now(),
        }
    }
}

impl TimeSource for TokioTime {
    fn now_ms(&self) -> i64 {
        self.origin_ms + self.start.elapsed().as_millis() as i64
    }
}

fn lock(page: &SharedPage) -> MutexGuard<'_, Page> {
    page.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keep the page's clocks ticking until the visibility sender is dropped.
///
/// The page starts (or stays paused) according to the channel's current value.
pub async fn drive<T: TimeSource>(page: SharedPage, mut visibility: watch::Receiver<Visibility>, time: T) {
    let initial = *visibility.borrow_and_update();
    {
        let mut page = lock(&page);
        match initial {
            Visibility::Visible => page.start(time.now_ms()),
            Visibility::Hidden => {
                page.set_visibility(Visibility::Hidden, time.now_ms());
            }
        }
    }
    tracing::debug!(?initial, "clock tick task started");

    loop {
        let delay = lock(&page).delay_until_next(time.now_ms());
        let changed = match delay {
            Some(ms) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                        let mut page = lock(&page);
                        if let Some(report) = page.tick(time.now_ms()) {
                            if report.failed > 0 || report.removed > 0 {
                                tracing::debug!(?report, "refresh finished with problems");
                            }
                        }
                        continue;
                    }
                    changed = visibility.changed() => changed,
                }
            }
            None => visibility.changed().await,
        };
        if changed.is_err() {
            break;
        }
        let next = *visibility.borrow_and_update();
        tracing::debug!(visibility = ?next, "page visibility changed");
        lock(&page).set_visibility(next, time.now_ms());
    }
    tracing::debug!("clock tick task stopped");
}

/// Spawn [`drive`] on the current runtime. Returns the visibility sender and
/// the task handle.
pub fn spawn<T: TimeSource>(page: SharedPage, time: T) -> (watch::Sender<Visibility>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Visibility::Visible);
    let handle = tokio::spawn(drive(page, rx, time));
    (tx, handle)
}
