//! Selection state and unit conversions.
//!
//! Positions are stored as percentages of the asset duration (0..=100).
//! Seconds are the unit callers configure and receive; pixels only exist
//! at the edge where pointer deltas come in and layout goes out. The four
//! conversion functions below are the only place those units meet.
//!
//! A zero duration is a legal transient state (asset not loaded yet):
//! conversions return `0.0` instead of failing. Use the `checked_*`
//! variants when the caller needs to know.

use log::trace;
use serde::Serialize;

use crate::error::{Result, TrimError};

/// Upper bound of a normalized position.
pub const MAX_PERCENT: f64 = 100.0;

/// Duration plus the three normalized positions.
///
/// Invariant after every settled mutation:
/// `0 <= start <= playhead <= end <= 100`.
///
/// Serialize only: a deserialized state would bypass the setters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeModel {
    duration: f64,
    start_pct: f64,
    end_pct: f64,
    playhead_pct: f64,
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl RangeModel {
    /// Full selection over `duration` seconds, playhead at the start.
    pub fn new(duration: f64) -> Self {
        Self {
            duration: sanitize_duration(duration),
            start_pct: 0.0,
            end_pct: MAX_PERCENT,
            playhead_pct: 0.0,
        }
    }

    /// Replace the duration and reset to a full selection.
    pub fn reset(&mut self, duration: f64) {
        *self = Self::new(duration);
        trace!("RangeModel reset: duration={}s", self.duration);
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// True when conversions would divide by zero.
    pub fn is_degenerate(&self) -> bool {
        self.duration <= 0.0
    }

    pub fn start_pct(&self) -> f64 {
        self.start_pct
    }

    pub fn end_pct(&self) -> f64 {
        self.end_pct
    }

    pub fn playhead_pct(&self) -> f64 {
        self.playhead_pct
    }

    pub fn start_seconds(&self) -> f64 {
        self.seconds_from_percent(self.start_pct)
    }

    pub fn end_seconds(&self) -> f64 {
        self.seconds_from_percent(self.end_pct)
    }

    pub fn playhead_seconds(&self) -> f64 {
        self.seconds_from_percent(self.playhead_pct)
    }

    // ========== Conversions ==========

    /// `duration * p / 100`, or `0.0` for a degenerate duration.
    pub fn seconds_from_percent(&self, percent: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.duration * percent / MAX_PERCENT
    }

    /// `s * 100 / duration`, unclamped, or `0.0` for a degenerate duration.
    pub fn percent_from_seconds(&self, seconds: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        seconds * MAX_PERCENT / self.duration
    }

    pub fn checked_seconds_from_percent(&self, percent: f64) -> Result<f64> {
        if self.is_degenerate() {
            return Err(TrimError::InvalidDuration(self.duration));
        }
        Ok(self.seconds_from_percent(percent))
    }

    pub fn checked_percent_from_seconds(&self, seconds: f64) -> Result<f64> {
        if self.is_degenerate() {
            return Err(TrimError::InvalidDuration(self.duration));
        }
        Ok(self.percent_from_seconds(seconds))
    }

    /// `p * width / 100`.
    pub fn pixel_from_percent(percent: f64, track_width_px: f64) -> f64 {
        percent * track_width_px / MAX_PERCENT
    }

    /// `px * 100 / width`, or `0.0` for a track with no width.
    pub fn percent_from_pixel(px: f64, track_width_px: f64) -> f64 {
        if track_width_px <= 0.0 || !track_width_px.is_finite() {
            return 0.0;
        }
        px * MAX_PERCENT / track_width_px
    }

    // ========== Mutation ==========
    //
    // Setters store already-resolved values. Constraint checks live in
    // ConstraintSolver; these only guard against out-of-track input.

    pub(crate) fn set_start_pct(&mut self, pct: f64) {
        self.start_pct = clamp_percent(pct);
    }

    pub(crate) fn set_end_pct(&mut self, pct: f64) {
        self.end_pct = clamp_percent(pct);
    }

    pub(crate) fn set_playhead_pct(&mut self, pct: f64) {
        self.playhead_pct = clamp_percent(pct);
    }
}

/// Clamp to the track bounds. NaN collapses to 0.
pub fn clamp_percent(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, MAX_PERCENT)
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}
