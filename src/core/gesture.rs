//! Drag gesture state machine.
//!
//! `Idle -> Dragging(target) -> Idle`. Pointer deltas (pixels) are
//! accumulated in the [`DragSession`] and resolved through the
//! [`ConstraintSolver`]; each resolved increment is written into the
//! [`RangeModel`] immediately and reported at most once:
//! - `range_changed(start, end)` if either handle moved
//! - `playhead_changed(seconds)` if the playhead moved
//!
//! Nothing is reported for an increment that leaves a value unchanged.
//!
//! # Playhead coupling
//!
//! - Start handle drag: playhead follows the start handle.
//! - End handle drag: playhead follows the end handle while dragging and
//!   snaps to the start handle when the gesture ends (not on cancel).
//! - Whole range drag: playhead shifts with the selection.
//! - Passive playback reaching the end handle loops back to the start
//!   handle. Manual end-handle drags never trigger that loop reset.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::constraints::{within, ConstraintSolver};
use super::range_model::RangeModel;
use super::slider_events::TrimObserver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragTarget {
    Start,
    End,
    Playhead,
    WholeRange,
}

/// Per-gesture state. Discarded when the gesture ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub target: DragTarget,
    /// Translation in pixels received since the last resolved increment.
    pub pending_px: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// What one increment changed, in seconds. `None` = unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Resolved {
    pub range: Option<(f64, f64)>,
    pub playhead: Option<f64>,
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.playhead.is_none()
    }

    /// Combine with a later increment; later values win.
    fn then(self, later: Resolved) -> Resolved {
        Resolved {
            range: later.range.or(self.range),
            playhead: later.playhead.or(self.playhead),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GestureController {
    phase: GesturePhase,
    solver: ConstraintSolver,
    playhead_draggable: bool,
}

impl GestureController {
    pub fn new(solver: ConstraintSolver, playhead_draggable: bool) -> Self {
        Self {
            phase: GesturePhase::Idle,
            solver,
            playhead_draggable,
        }
    }

    pub fn solver(&self) -> &ConstraintSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut ConstraintSolver {
        &mut self.solver
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging(_))
    }

    pub fn active_target(&self) -> Option<DragTarget> {
        match self.phase {
            GesturePhase::Dragging(session) => Some(session.target),
            GesturePhase::Idle => None,
        }
    }

    pub fn playhead_draggable(&self) -> bool {
        self.playhead_draggable
    }

    /// Only gates the playhead's own drag, not programmatic moves.
    pub fn set_playhead_draggable(&mut self, draggable: bool) {
        self.playhead_draggable = draggable;
    }

    // ========== Gesture flow ==========

    /// Start a gesture. Refused while another gesture is active, or for
    /// the playhead when it is not draggable.
    pub fn begin(&mut self, target: DragTarget, observer: &mut dyn TrimObserver) -> bool {
        if let GesturePhase::Dragging(session) = self.phase {
            debug!("Drag {:?} refused: {:?} already active", target, session.target);
            return false;
        }
        if target == DragTarget::Playhead && !self.playhead_draggable {
            trace!("Playhead drag disabled");
            return false;
        }

        self.phase = GesturePhase::Dragging(DragSession {
            target,
            pending_px: 0.0,
        });
        debug!("Drag began: {:?}", target);
        observer.drag_began();
        true
    }

    /// Add a raw pointer delta without resolving it yet.
    pub fn accumulate(&mut self, dx_px: f64) {
        if let GesturePhase::Dragging(ref mut session) = self.phase {
            if dx_px.is_finite() {
                session.pending_px += dx_px;
            }
        }
    }

    /// Resolve the accumulated translation as one increment.
    pub fn resolve(
        &mut self,
        model: &mut RangeModel,
        track_width_px: f64,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        self.resolve_pending(model, track_width_px, false, observer)
    }

    /// Accumulate and resolve in one step.
    pub fn drag_by(
        &mut self,
        dx_px: f64,
        model: &mut RangeModel,
        track_width_px: f64,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        self.accumulate(dx_px);
        self.resolve(model, track_width_px, observer)
    }

    /// Finish the gesture: flush pending translation, apply the end
    /// handle's playhead snap, return to idle.
    pub fn end(
        &mut self,
        model: &mut RangeModel,
        track_width_px: f64,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        if !self.is_dragging() {
            return Resolved::default();
        }
        let resolved = self.resolve_pending(model, track_width_px, true, observer);
        debug!("Drag ended: {:?}", self.active_target());
        self.phase = GesturePhase::Idle;
        observer.drag_ended();
        resolved
    }

    /// Abort the gesture. Already resolved increments stay applied,
    /// unresolved translation is dropped.
    pub fn cancel(&mut self, observer: &mut dyn TrimObserver) {
        if let GesturePhase::Dragging(session) = self.phase {
            debug!("Drag cancelled: {:?} ({}px unresolved)", session.target, session.pending_px);
            self.phase = GesturePhase::Idle;
            observer.drag_ended();
        }
    }

    fn resolve_pending(
        &mut self,
        model: &mut RangeModel,
        track_width_px: f64,
        ending: bool,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        let GesturePhase::Dragging(ref mut session) = self.phase else {
            return Resolved::default();
        };
        let dx_px = std::mem::take(&mut session.pending_px);
        let target = session.target;

        if dx_px == 0.0 && !(ending && target == DragTarget::End) {
            return Resolved::default();
        }

        let delta = RangeModel::percent_from_pixel(dx_px, track_width_px);
        let (start, end, playhead) = match target {
            DragTarget::Start => {
                let start = self.solver.resolve_start(model, model.start_pct() + delta);
                (start, model.end_pct(), start)
            }
            DragTarget::End => {
                let end = self.solver.resolve_end(model, model.end_pct() + delta);
                let playhead = if ending { model.start_pct() } else { end };
                (model.start_pct(), end, playhead)
            }
            DragTarget::Playhead => {
                let playhead = self.solver.resolve_playhead(model, model.playhead_pct() + delta);
                (model.start_pct(), model.end_pct(), playhead)
            }
            DragTarget::WholeRange => {
                let t = self.solver.resolve_translation(model, delta);
                (t.start_pct, t.end_pct, t.playhead_pct)
            }
        };
        trace!(
            "Resolved {:?} {:+.2}px -> start={:.3}% end={:.3}% playhead={:.3}%",
            target, dx_px, start, end, playhead
        );
        commit(model, start, end, playhead, observer)
    }

    // ========== Programmatic updates ==========

    /// Move the start handle to `seconds`, validated like a drag.
    pub fn set_start(
        &mut self,
        seconds: f64,
        model: &mut RangeModel,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        let start = self.solver.resolve_start(model, model.percent_from_seconds(seconds));
        let end = model.end_pct();
        let playhead = within(model.playhead_pct(), start, end);
        commit(model, start, end, playhead, observer)
    }

    /// Move the end handle to `seconds`, validated like a drag.
    pub fn set_end(
        &mut self,
        seconds: f64,
        model: &mut RangeModel,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        let start = model.start_pct();
        let end = self.solver.resolve_end(model, model.percent_from_seconds(seconds));
        let playhead = within(model.playhead_pct(), start, end);
        commit(model, start, end, playhead, observer)
    }

    /// Explicit seek, confined to the selection.
    pub fn seek(
        &mut self,
        seconds: f64,
        model: &mut RangeModel,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        let playhead = self.solver.resolve_playhead(model, model.percent_from_seconds(seconds));
        commit(model, model.start_pct(), model.end_pct(), playhead, observer)
    }

    /// Passive playback position from the media player.
    ///
    /// Ignored during a gesture. Reaching the end handle loops the
    /// playhead to the start handle and reports it so the player seeks
    /// back. A position before the start handle is clamped and reported
    /// the same way. Otherwise the playhead follows silently, since the
    /// player is already there.
    pub fn playback_tick(
        &mut self,
        seconds: f64,
        model: &mut RangeModel,
        observer: &mut dyn TrimObserver,
    ) -> Resolved {
        if self.is_dragging() || model.is_degenerate() || !seconds.is_finite() {
            return Resolved::default();
        }

        if seconds >= model.end_seconds() {
            let start = model.start_pct();
            model.set_playhead_pct(start);
            let start_seconds = model.start_seconds();
            // Compared against the reported position, which is what the
            // player is actually showing.
            if start_seconds == seconds {
                return Resolved::default();
            }
            trace!("Playback reached end ({}s), looping to {}s", seconds, start_seconds);
            observer.playhead_changed(start_seconds);
            return Resolved {
                range: None,
                playhead: Some(start_seconds),
            };
        }

        let reported = model.percent_from_seconds(seconds);
        let playhead = self.solver.resolve_playhead(model, reported);
        model.set_playhead_pct(playhead);
        if playhead == reported {
            return Resolved::default();
        }
        // Player is outside the selection: tell it where the playhead went
        let clamped_seconds = model.playhead_seconds();
        trace!("Playback at {}s outside selection, playhead clamped to {}s", seconds, clamped_seconds);
        observer.playhead_changed(clamped_seconds);
        Resolved {
            range: None,
            playhead: Some(clamped_seconds),
        }
    }
}

/// Write resolved positions and report what changed.
fn commit(
    model: &mut RangeModel,
    start: f64,
    end: f64,
    playhead: f64,
    observer: &mut dyn TrimObserver,
) -> Resolved {
    let range_changed = start != model.start_pct() || end != model.end_pct();
    let playhead_changed = playhead != model.playhead_pct();

    model.set_start_pct(start);
    model.set_end_pct(end);
    model.set_playhead_pct(playhead);

    let mut resolved = Resolved::default();
    if range_changed {
        let range = (model.start_seconds(), model.end_seconds());
        observer.range_changed(range.0, range.1);
        resolved.range = Some(range);
    }
    if playhead_changed {
        let seconds = model.playhead_seconds();
        observer.playhead_changed(seconds);
        resolved.playhead = Some(seconds);
    }
    resolved
}

impl Resolved {
    /// Merge a sequence of increments into their net effect.
    pub fn fold(items: impl IntoIterator<Item = Resolved>) -> Resolved {
        items.into_iter().fold(Resolved::default(), Resolved::then)
    }
}
