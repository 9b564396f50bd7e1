//! Single-flight thumbnail strip refresh.
//!
//! At most one strip job runs per slider. A request arriving while a job
//! is running is dropped, not queued. Finished strips travel back over a
//! channel that the owning thread drains with [`ThumbnailRefresher::poll`].
//!
//! Each request is stamped with the asset generation. A strip built for
//! an asset that has since been replaced is discarded on poll, and the
//! refresher remembers that a fresh request is owed. A failed job keeps
//! the width it was built for, so the owner can tell whether the failure
//! also swallowed a newer layout.
//!
//! A panicking provider is reported as a failed job; the in-flight guard
//! is always released.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace, warn};

use crate::core::workers::Workers;
use crate::media::{AssetRef, Thumbnail, ThumbnailProvider};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Started,
    /// Another job is running; this request was dropped.
    Busy,
    /// Nothing to render: no provider, no duration or no width.
    Skipped,
}

/// A finished strip for the current asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Strip {
    pub track_width_px: f64,
    pub thumbnails: Vec<Thumbnail>,
}

struct Finished {
    generation: u64,
    track_width_px: f64,
    result: anyhow::Result<Vec<Thumbnail>>,
}

pub struct ThumbnailRefresher {
    provider: Option<Arc<dyn ThumbnailProvider>>,
    workers: Arc<Workers>,
    busy: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    stale: bool,
    /// Width of the last failed job since the last `take_failed`.
    failed_width: Option<f64>,
    tx: Sender<Finished>,
    rx: Receiver<Finished>,
}

impl ThumbnailRefresher {
    pub fn new(workers: Arc<Workers>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            provider: None,
            workers,
            busy: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            stale: false,
            failed_width: None,
            tx,
            rx,
        }
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn ThumbnailProvider>>) {
        self.provider = provider;
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark strips of the previous asset as stale.
    pub fn invalidate(&mut self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Thumbnail generation -> {}", generation);
    }

    /// Ask for a strip. Dropped when a job is already running.
    pub fn request(&self, asset: &AssetRef, duration: f64, track_width_px: f64) -> RefreshOutcome {
        let Some(provider) = self.provider.as_ref() else {
            return RefreshOutcome::Skipped;
        };
        if duration <= 0.0 || track_width_px <= 0.0 {
            return RefreshOutcome::Skipped;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Thumbnail refresh for {} dropped: job in flight", asset);
            return RefreshOutcome::Busy;
        }

        let provider = Arc::clone(provider);
        let busy = Arc::clone(&self.busy);
        let tx = self.tx.clone();
        let asset = asset.clone();
        let generation = self.generation.load(Ordering::Acquire);

        debug!("Thumbnail refresh started: {} ({}s, {}px)", asset, duration, track_width_px);
        self.workers.execute(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                provider.generate_strip(&asset, duration, track_width_px)
            }))
            .unwrap_or_else(|_| Err(anyhow::anyhow!("thumbnail provider panicked")));
            busy.store(false, Ordering::Release);
            let _ = tx.send(Finished {
                generation,
                track_width_px,
                result,
            });
        });
        RefreshOutcome::Started
    }

    /// Latest strip for the current asset, if any finished since the
    /// last poll. Provider errors are logged and swallowed.
    pub fn poll(&mut self) -> Option<Strip> {
        let current = self.generation.load(Ordering::Acquire);
        let mut latest = None;

        for finished in self.rx.try_iter() {
            if finished.generation != current {
                trace!("Discarding stale thumbnail strip (generation {})", finished.generation);
                self.stale = true;
                continue;
            }
            match finished.result {
                Ok(thumbnails) => {
                    trace!("Thumbnail strip ready: {} images", thumbnails.len());
                    self.stale = false;
                    latest = Some(Strip {
                        track_width_px: finished.track_width_px,
                        thumbnails,
                    });
                }
                Err(e) => {
                    warn!("Thumbnail generation failed: {:#}", e);
                    self.failed_width = Some(finished.track_width_px);
                }
            }
        }
        latest
    }

    /// True once after a stale strip was discarded.
    pub fn take_stale(&mut self) -> bool {
        std::mem::take(&mut self.stale)
    }

    /// Track width of the last job that failed, once.
    pub fn take_failed(&mut self) -> Option<f64> {
        self.failed_width.take()
    }
}
