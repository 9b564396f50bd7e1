//! Export of the committed selection.
//!
//! One job per user request, run on its own thread so the slider keeps
//! resolving gestures. The collaborator's error is passed through as
//! `TrimError::ExportFailure` and never retried.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use log::{info, warn};

use crate::error::{Result, TrimError};
use crate::media::{AssetRef, ExportService};

pub struct ExportJob {
    asset: AssetRef,
    start: f64,
    end: f64,
    rx: Receiver<Result<PathBuf>>,
    outcome: Option<Result<PathBuf>>,
}

impl std::fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportJob")
            .field("asset", &self.asset)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("finished", &self.outcome.is_some())
            .finish()
    }
}

impl ExportJob {
    /// Start trimming `[start, end]` seconds of `asset`.
    pub fn spawn(service: Arc<dyn ExportService>, asset: AssetRef, start: f64, end: f64) -> Result<Self> {
        validate_range(start, end)?;

        let (tx, rx) = bounded(1);
        let job_asset = asset.clone();
        info!("Export started: {} [{:.3}s..{:.3}s]", asset, start, end);

        thread::Builder::new()
            .name("trimrange-export".into())
            .spawn(move || {
                let outcome = service
                    .trim(&job_asset, start, end)
                    .map_err(|e| TrimError::ExportFailure(format!("{:#}", e)));
                match &outcome {
                    Ok(path) => info!("Export finished: {}", path.display()),
                    Err(e) => warn!("{}", e),
                }
                let _ = tx.send(outcome);
            })
            .map_err(|e| {
                warn!("Failed to spawn export thread: {}", e);
                TrimError::WorkerUnavailable
            })?;

        Ok(Self {
            asset,
            start,
            end,
            rx,
            outcome: None,
        })
    }

    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    pub fn range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// Non-blocking check. `None` while the export is still running.
    pub fn try_result(&mut self) -> Option<Result<PathBuf>> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.outcome = Some(Err(TrimError::WorkerUnavailable)),
            }
        }
        self.outcome.clone()
    }

    /// Block until the export finishes.
    pub fn wait(mut self) -> Result<PathBuf> {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        self.rx.recv().unwrap_or(Err(TrimError::WorkerUnavailable))
    }
}

fn validate_range(start: f64, end: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
        return Err(TrimError::InvalidRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExporter {
        calls: Mutex<Vec<(f64, f64)>>,
    }

    impl ExportService for RecordingExporter {
        fn trim(&self, asset: &AssetRef, start: f64, end: f64) -> anyhow::Result<PathBuf> {
            self.calls.lock().unwrap().push((start, end));
            Ok(asset.path().with_extension("trim.mp4"))
        }
    }

    struct FailingExporter;

    impl ExportService for FailingExporter {
        fn trim(&self, _asset: &AssetRef, _start: f64, _end: f64) -> anyhow::Result<PathBuf> {
            anyhow::bail!("codec not supported")
        }
    }

    #[test]
    fn test_export_success() {
        let service = Arc::new(RecordingExporter::default());
        let job = ExportJob::spawn(service.clone(), AssetRef::new("clip.mp4"), 1.0, 4.5).unwrap();
        assert_eq!(job.range(), (1.0, 4.5));
        let out = job.wait().unwrap();
        assert_eq!(out, PathBuf::from("clip.trim.mp4"));
        assert_eq!(*service.calls.lock().unwrap(), vec![(1.0, 4.5)]);
    }

    #[test]
    fn test_export_failure_passed_through() {
        let job = ExportJob::spawn(Arc::new(FailingExporter), AssetRef::new("clip.mp4"), 0.0, 2.0).unwrap();
        assert_eq!(
            job.wait(),
            Err(TrimError::ExportFailure("codec not supported".into()))
        );
    }

    #[test]
    fn test_invalid_range_rejected() {
        let service: Arc<dyn ExportService> = Arc::new(RecordingExporter::default());
        for (s, e) in [(3.0, 3.0), (4.0, 1.0), (-1.0, 2.0), (0.0, f64::NAN)] {
            let err = ExportJob::spawn(Arc::clone(&service), AssetRef::new("a.mp4"), s, e).unwrap_err();
            assert!(matches!(err, TrimError::InvalidRange { .. }));
        }
    }

    #[test]
    fn test_try_result_polls_until_done() {
        let mut job =
            ExportJob::spawn(Arc::new(RecordingExporter::default()), AssetRef::new("clip.mp4"), 0.0, 1.0).unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let result = loop {
            if let Some(r) = job.try_result() {
                break r;
            }
            assert!(std::time::Instant::now() < deadline);
            std::thread::sleep(std::time::Duration::from_millis(2));
        };
        assert!(result.is_ok());
        // stays available after the first read
        assert!(job.try_result().is_some());
    }
}
