//! Trim slider control.
//!
//! [`TrimSlider`] ties the selection model, gesture controller, observer
//! and thumbnail refresher together. The host feeds it pointer deltas,
//! playback positions and layout changes; it answers with notifications
//! and a [`SliderLayout`] to draw.
//!
//! Everything here runs on the host's input thread. Only thumbnail and
//! export work leaves it.

use std::ops::Range;
use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::config::TrimConfig;
use crate::core::constraints::ConstraintSolver;
use crate::core::gesture::{DragTarget, GestureController, Resolved};
use crate::core::range_model::RangeModel;
use crate::core::slider_events::{NullObserver, TrimObserver};
use crate::core::workers::Workers;
use crate::error::{Result, TrimError};
use crate::export::ExportJob;
use crate::media::{AssetRef, ExportService, MediaInfoProvider, Thumbnail, ThumbnailProvider};
use crate::thumbnails::{RefreshOutcome, Strip, ThumbnailRefresher};
use crate::utils::time::format_seconds;

/// Pixel geometry for one frame of drawing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SliderLayout {
    pub track_width_px: f64,
    pub start_x: f64,
    pub end_x: f64,
    pub playhead_x: f64,
    /// Draggable band between the handles.
    pub band: Range<f64>,
    pub start_label: String,
    pub end_label: String,
    pub playhead_visible: bool,
}

pub struct TrimSlider {
    model: RangeModel,
    gesture: GestureController,
    observer: Box<dyn TrimObserver>,
    config: TrimConfig,
    track_width_px: f64,
    playhead_visible: bool,
    asset: Option<AssetRef>,
    refresher: ThumbnailRefresher,
    strip: Option<Strip>,
}

impl std::fmt::Debug for TrimSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrimSlider")
            .field("model", &self.model)
            .field("target", &self.gesture.active_target())
            .field("track_width_px", &self.track_width_px)
            .field("asset", &self.asset)
            .finish()
    }
}

impl TrimSlider {
    /// Slider with its own background workers and no observer.
    pub fn new(config: TrimConfig) -> Result<Self> {
        Self::with_workers(config, Arc::new(Workers::for_media()))
    }

    pub fn with_workers(config: TrimConfig, workers: Arc<Workers>) -> Result<Self> {
        config.validate()?;
        let gesture = GestureController::new(
            ConstraintSolver::new(config.constraints()),
            config.is_playhead_draggable,
        );
        Ok(Self {
            model: RangeModel::default(),
            gesture,
            observer: Box::new(NullObserver),
            config,
            track_width_px: 0.0,
            playhead_visible: true,
            asset: None,
            refresher: ThumbnailRefresher::new(workers),
            strip: None,
        })
    }

    pub fn with_observer(mut self, observer: impl TrimObserver + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    pub fn set_observer(&mut self, observer: impl TrimObserver + 'static) {
        self.observer = Box::new(observer);
    }

    pub fn set_thumbnail_provider(&mut self, provider: Option<Arc<dyn ThumbnailProvider>>) {
        self.refresher.set_provider(provider);
        self.refresh_thumbnails();
    }

    pub fn config(&self) -> &TrimConfig {
        &self.config
    }

    /// Swap configuration. Applies to the next resolved increment; the
    /// current selection is left as is.
    pub fn set_config(&mut self, config: TrimConfig) -> Result<()> {
        config.validate()?;
        self.gesture.solver_mut().set_constraints(config.constraints());
        self.gesture.set_playhead_draggable(config.is_playhead_draggable);
        self.config = config;
        Ok(())
    }

    // ========== Asset ==========

    /// Load a new asset. An unknown duration leaves the slider degenerate
    /// (duration 0) until a later attach succeeds.
    pub fn attach_asset(&mut self, asset: AssetRef, info: &dyn MediaInfoProvider) {
        let duration = match info.duration_seconds(&asset) {
            Ok(d) => d,
            Err(e) => {
                warn!("{}", e);
                0.0
            }
        };
        info!("Attached {} ({}s)", asset, duration);
        self.asset = Some(asset);
        self.set_duration(duration);
    }

    /// Reset to a full selection over `seconds` without a provider.
    pub fn set_duration(&mut self, seconds: f64) {
        if self.gesture.is_dragging() {
            self.gesture.cancel(self.observer.as_mut());
        }
        self.model.reset(seconds);
        let constraints = self.gesture.solver().constraints();
        if constraints.is_unsatisfiable(self.model.duration()) {
            let pinned = TrimError::UnsatisfiableConstraint {
                duration: self.model.duration(),
                min_space: constraints.min_space_seconds,
            };
            debug!("{}: selection pinned to the full asset", pinned);
        }
        self.strip = None;
        self.refresher.invalidate();
        self.refresh_thumbnails();
    }

    pub fn asset(&self) -> Option<&AssetRef> {
        self.asset.as_ref()
    }

    // ========== Programmatic positioning ==========

    pub fn set_start_position(&mut self, seconds: f64) -> Resolved {
        self.gesture.set_start(seconds, &mut self.model, self.observer.as_mut())
    }

    pub fn set_end_position(&mut self, seconds: f64) -> Resolved {
        self.gesture.set_end(seconds, &mut self.model, self.observer.as_mut())
    }

    /// Explicit seek, confined to the selection.
    pub fn set_playhead(&mut self, seconds: f64) -> Resolved {
        self.gesture.seek(seconds, &mut self.model, self.observer.as_mut())
    }

    /// Playback position reported by the player. Loops at the end handle.
    pub fn update_playhead(&mut self, seconds: f64) -> Resolved {
        self.gesture.playback_tick(seconds, &mut self.model, self.observer.as_mut())
    }

    // ========== Gestures ==========

    pub fn begin_drag(&mut self, target: DragTarget) -> bool {
        if target == DragTarget::Playhead && !self.playhead_visible {
            trace!("Playhead hidden, drag refused");
            return false;
        }
        self.gesture.begin(target, self.observer.as_mut())
    }

    pub fn drag_by(&mut self, dx_px: f64) -> Resolved {
        self.gesture.drag_by(dx_px, &mut self.model, self.track_width_px, self.observer.as_mut())
    }

    /// Queue a pointer delta; resolved on the next [`flush`](Self::flush).
    pub fn accumulate(&mut self, dx_px: f64) {
        self.gesture.accumulate(dx_px);
    }

    pub fn flush(&mut self) -> Resolved {
        self.gesture.resolve(&mut self.model, self.track_width_px, self.observer.as_mut())
    }

    pub fn end_drag(&mut self) -> Resolved {
        self.gesture.end(&mut self.model, self.track_width_px, self.observer.as_mut())
    }

    pub fn cancel_drag(&mut self) {
        self.gesture.cancel(self.observer.as_mut());
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn active_target(&self) -> Option<DragTarget> {
        self.gesture.active_target()
    }

    // ========== Layout ==========

    /// Host reports a new track width. Refreshes thumbnails on change.
    pub fn track_width_changed(&mut self, width_px: f64) {
        if !width_px.is_finite() || width_px <= 0.0 || width_px == self.track_width_px {
            return;
        }
        debug!("Track width {} -> {}", self.track_width_px, width_px);
        self.track_width_px = width_px;
        self.refresh_thumbnails();
    }

    pub fn track_width(&self) -> f64 {
        self.track_width_px
    }

    pub fn layout(&self) -> SliderLayout {
        let width = self.track_width_px;
        let start_x = RangeModel::pixel_from_percent(self.model.start_pct(), width);
        let end_x = RangeModel::pixel_from_percent(self.model.end_pct(), width);
        SliderLayout {
            track_width_px: width,
            start_x,
            end_x,
            playhead_x: RangeModel::pixel_from_percent(self.model.playhead_pct(), width),
            band: start_x..end_x,
            start_label: format_seconds(self.model.start_seconds()),
            end_label: format_seconds(self.model.end_seconds()),
            playhead_visible: self.playhead_visible,
        }
    }

    /// What a press at `x_px` would grab. The start handle grabs to its
    /// left and the end handle to its right, so the playhead (always
    /// inside the selection) never shadows them. Inside the selection the
    /// playhead wins over the band.
    pub fn hit_test(&self, x_px: f64) -> Option<DragTarget> {
        if !x_px.is_finite() || self.track_width_px <= 0.0 {
            return None;
        }
        let layout = self.layout();
        let handle_w = self.config.handle_hit_width_px;

        if x_px < layout.start_x {
            return (x_px >= layout.start_x - handle_w).then_some(DragTarget::Start);
        }
        if x_px > layout.end_x {
            return (x_px <= layout.end_x + handle_w).then_some(DragTarget::End);
        }

        if self.playhead_visible && self.gesture.playhead_draggable() {
            let half = self.config.playhead_hit_width_px / 2.0;
            if (x_px - layout.playhead_x).abs() <= half {
                return Some(DragTarget::Playhead);
            }
        }

        if layout.band.contains(&x_px) {
            return Some(DragTarget::WholeRange);
        }
        // Collapsed selection, or a press exactly on the end handle
        if x_px == layout.start_x && layout.start_x == layout.end_x {
            return Some(DragTarget::Start);
        }
        Some(DragTarget::End)
    }

    pub fn show_playhead(&mut self) {
        self.playhead_visible = true;
    }

    pub fn hide_playhead(&mut self) {
        self.playhead_visible = false;
    }

    pub fn is_playhead_visible(&self) -> bool {
        self.playhead_visible
    }

    pub fn is_playhead_sticky(&self) -> bool {
        self.config.is_playhead_sticky
    }

    // ========== Thumbnails ==========

    /// Drain finished thumbnail work. Re-requests when the finished strip
    /// belongs to a previous asset or an outdated width, or when a job for
    /// an outdated width failed.
    pub fn poll_thumbnails(&mut self) -> Option<&[Thumbnail]> {
        let fresh = self.refresher.poll();
        let stale = self.refresher.take_stale();
        let failed_width = self.refresher.take_failed();

        let mut updated = false;
        if let Some(strip) = fresh {
            let outdated = strip.track_width_px != self.track_width_px;
            self.strip = Some(strip);
            updated = true;
            if outdated {
                trace!("Thumbnail strip built for an old width");
                self.refresh_thumbnails();
            }
        }
        if stale {
            self.refresh_thumbnails();
        }
        if let Some(width) = failed_width {
            // Same width: leave it, retrying would fail the same way
            if width != self.track_width_px && !updated {
                trace!("Thumbnail job for {}px failed, track is now {}px", width, self.track_width_px);
                self.refresh_thumbnails();
            }
        }
        if updated { self.thumbnails() } else { None }
    }

    /// Last strip delivered for the current asset.
    pub fn thumbnails(&self) -> Option<&[Thumbnail]> {
        self.strip.as_ref().map(|s| s.thumbnails.as_slice())
    }

    fn refresh_thumbnails(&mut self) {
        let Some(asset) = self.asset.as_ref() else {
            return;
        };
        if self.refresher.request(asset, self.model.duration(), self.track_width_px) == RefreshOutcome::Busy {
            warn!("Thumbnail refresh dropped for {}: job in flight", asset);
        }
    }

    // ========== Queries ==========

    pub fn model(&self) -> &RangeModel {
        &self.model
    }

    pub fn duration(&self) -> f64 {
        self.model.duration()
    }

    /// Committed selection `(start, end)` in seconds.
    pub fn selection_seconds(&self) -> (f64, f64) {
        (self.model.start_seconds(), self.model.end_seconds())
    }

    pub fn playhead_seconds(&self) -> f64 {
        self.model.playhead_seconds()
    }

    // ========== Export ==========

    /// Export the current selection of the attached asset.
    pub fn export(&self, service: Arc<dyn ExportService>) -> Result<ExportJob> {
        let Some(asset) = self.asset.clone() else {
            return Err(TrimError::InvalidDuration(self.model.duration()));
        };
        if self.model.is_degenerate() {
            return Err(TrimError::InvalidDuration(self.model.duration()));
        }
        let (start, end) = self.selection_seconds();
        ExportJob::spawn(service, asset, start, end)
    }
}
