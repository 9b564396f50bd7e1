//! Constraint solving for handle, playhead and whole-range drags.
//!
//! Every function here is total: any proposal maps to an admissible
//! position. Selection length limits are configured in seconds and
//! converted through the model, so they stay correct when the track is
//! resized.

use log::trace;
use serde::{Deserialize, Serialize};

use super::range_model::{clamp_percent, RangeModel, MAX_PERCENT};

/// Legal distance between the two handles, in seconds.
///
/// `max_space_seconds == 0` means unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConstraints {
    pub min_space_seconds: f64,
    pub max_space_seconds: f64,
}

impl Default for SelectionConstraints {
    fn default() -> Self {
        Self {
            min_space_seconds: 1.0,
            max_space_seconds: 0.0,
        }
    }
}

impl SelectionConstraints {
    pub fn new(min_space_seconds: f64, max_space_seconds: f64) -> Self {
        Self {
            min_space_seconds,
            max_space_seconds,
        }
    }

    /// Maximum applies only when set and shorter than the asset.
    pub fn caps_length(&self, duration: f64) -> bool {
        self.max_space_seconds > 0.0 && duration > self.max_space_seconds
    }

    /// Asset is shorter than the minimum selection: no legal partial
    /// selection exists and both handles pin to the track edges.
    pub fn is_unsatisfiable(&self, duration: f64) -> bool {
        duration < self.min_space_seconds
    }
}

/// Result of a whole-range translation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translation {
    pub start_pct: f64,
    pub end_pct: f64,
    pub playhead_pct: f64,
    /// Delta actually applied after boundary reduction.
    pub applied_delta: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstraintSolver {
    constraints: SelectionConstraints,
}

impl ConstraintSolver {
    pub fn new(constraints: SelectionConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &SelectionConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: SelectionConstraints) {
        self.constraints = constraints;
    }

    /// Admissible start position for a proposed percent.
    pub fn resolve_start(&self, model: &RangeModel, proposed: f64) -> f64 {
        let duration = model.duration();
        let end = model.end_pct();
        let mut p = clamp_percent(proposed);

        let min_bound = end - model.percent_from_seconds(self.constraints.min_space_seconds);

        if self.constraints.caps_length(duration) {
            let max_bound = end - model.percent_from_seconds(self.constraints.max_space_seconds);
            if p < max_bound {
                p = max_bound;
            }
        }

        if self.constraints.is_unsatisfiable(duration) {
            trace!("start pinned: duration {}s < min {}s", duration, self.constraints.min_space_seconds);
            p = 0.0;
        } else if p > min_bound {
            p = min_bound;
        }

        clamp_percent(p)
    }

    /// Admissible end position for a proposed percent. Mirror of
    /// [`resolve_start`](Self::resolve_start).
    pub fn resolve_end(&self, model: &RangeModel, proposed: f64) -> f64 {
        let duration = model.duration();
        let start = model.start_pct();
        let mut p = clamp_percent(proposed);

        let min_bound = start + model.percent_from_seconds(self.constraints.min_space_seconds);

        if self.constraints.caps_length(duration) {
            let max_bound = start + model.percent_from_seconds(self.constraints.max_space_seconds);
            if p > max_bound {
                p = max_bound;
            }
        }

        if self.constraints.is_unsatisfiable(duration) {
            trace!("end pinned: duration {}s < min {}s", duration, self.constraints.min_space_seconds);
            p = MAX_PERCENT;
        } else if p < min_bound {
            p = min_bound;
        }

        clamp_percent(p)
    }

    /// Playhead is confined to the current selection.
    pub fn resolve_playhead(&self, model: &RangeModel, proposed: f64) -> f64 {
        within(clamp_percent(proposed), model.start_pct(), model.end_pct())
    }

    /// Shift the whole selection by `delta` percent.
    ///
    /// Both edge checks use the same proposed delta, so one step can
    /// shorten the move but never widen the selection.
    pub fn resolve_translation(&self, model: &RangeModel, delta: f64) -> Translation {
        let start = model.start_pct();
        let end = model.end_pct();
        let proposed = if delta.is_finite() { delta } else { 0.0 };

        let mut applied = proposed;
        if start + proposed < 0.0 {
            applied = -start;
        }
        if end + proposed > MAX_PERCENT {
            applied = MAX_PERCENT - end;
        }

        let new_start = clamp_percent(start + applied);
        let new_end = clamp_percent(end + applied);
        let playhead = within(model.playhead_pct() + applied, new_start, new_end);

        Translation {
            start_pct: new_start,
            end_pct: new_end,
            playhead_pct: playhead,
            applied_delta: applied,
        }
    }
}

/// `value` limited to `[lo, hi]`. Never panics, `hi` wins if the bounds cross.
pub(crate) fn within(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(duration: f64, start: f64, end: f64) -> RangeModel {
        let mut m = RangeModel::new(duration);
        m.set_start_pct(start);
        m.set_end_pct(end);
        m.set_playhead_pct(start);
        m
    }

    #[test]
    fn test_start_respects_min_space() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(2.0, 0.0));
        let m = model(10.0, 0.0, 100.0);
        assert!((solver.resolve_start(&m, 95.0) - 80.0).abs() < 1e-9);
        assert_eq!(solver.resolve_start(&m, 40.0), 40.0);
    }

    #[test]
    fn test_end_respects_min_space() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(2.0, 0.0));
        let m = model(10.0, 30.0, 100.0);
        assert!((solver.resolve_end(&m, 35.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_space_caps_selection() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(1.0, 4.0));
        let m = model(10.0, 20.0, 80.0);
        // end - 40% = 40
        assert!((solver.resolve_start(&m, 10.0) - 40.0).abs() < 1e-9);
        // start + 40% = 60
        assert!((solver.resolve_end(&m, 95.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_space_ignored_when_longer_than_asset() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(1.0, 30.0));
        let m = model(10.0, 50.0, 100.0);
        assert_eq!(solver.resolve_start(&m, 0.0), 0.0);
    }

    #[test]
    fn test_unsatisfiable_minimum_pins_full_width() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(5.0, 0.0));
        let m = model(1.0, 0.0, 100.0);
        for p in [-20.0, 0.0, 30.0, 99.0, 250.0] {
            assert_eq!(solver.resolve_start(&m, p), 0.0);
            assert_eq!(solver.resolve_end(&m, p), 100.0);
        }
    }

    #[test]
    fn test_min_wins_over_misconfigured_max() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(5.0, 2.0));
        let m = model(10.0, 0.0, 100.0);
        // max pulls 70 up to 80, min pushes it back to 50
        assert!((solver.resolve_start(&m, 70.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_track_bounds_clamp() {
        let solver = ConstraintSolver::new(SelectionConstraints::new(0.0, 0.0));
        let m = model(10.0, 20.0, 80.0);
        assert_eq!(solver.resolve_start(&m, -50.0), 0.0);
        assert_eq!(solver.resolve_end(&m, 500.0), 100.0);
    }

    #[test]
    fn test_playhead_confined_to_selection() {
        let solver = ConstraintSolver::default();
        let m = model(10.0, 20.0, 80.0);
        assert_eq!(solver.resolve_playhead(&m, 10.0), 20.0);
        assert_eq!(solver.resolve_playhead(&m, 90.0), 80.0);
        assert_eq!(solver.resolve_playhead(&m, 55.0), 55.0);
    }

    #[test]
    fn test_translation_stops_at_left_edge() {
        let solver = ConstraintSolver::default();
        let m = model(10.0, 10.0, 30.0);
        let t = solver.resolve_translation(&m, -15.0);
        assert_eq!(t.start_pct, 0.0);
        assert_eq!(t.end_pct, 20.0);
        assert_eq!(t.applied_delta, -10.0);
        assert_eq!(t.playhead_pct, 0.0);
    }

    #[test]
    fn test_translation_stops_at_right_edge() {
        let solver = ConstraintSolver::default();
        let m = model(10.0, 70.0, 90.0);
        let t = solver.resolve_translation(&m, 25.0);
        assert_eq!(t.start_pct, 80.0);
        assert_eq!(t.end_pct, 100.0);
        assert_eq!(t.applied_delta, 10.0);
    }

    #[test]
    fn test_translation_full_selection_cannot_move() {
        let solver = ConstraintSolver::default();
        let m = model(10.0, 0.0, 100.0);
        let t = solver.resolve_translation(&m, 12.0);
        assert_eq!((t.start_pct, t.end_pct), (0.0, 100.0));
        let t = solver.resolve_translation(&m, -12.0);
        assert_eq!((t.start_pct, t.end_pct), (0.0, 100.0));
    }

    #[test]
    fn test_translation_ignores_nan() {
        let solver = ConstraintSolver::default();
        let m = model(10.0, 10.0, 30.0);
        let t = solver.resolve_translation(&m, f64::NAN);
        assert_eq!((t.start_pct, t.end_pct), (10.0, 30.0));
    }
}
