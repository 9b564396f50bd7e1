//! Scripted slider sessions.
//!
//! A script is a JSON array of steps replayed against a [`TrimSlider`]
//! whose observer publishes on an [`EventBus`]. After each step the bus
//! queue is drained into [`Record`]s, so the output lists every
//! notification in emission order.
//!
//! ```json
//! [
//!   { "op": "begin", "target": "start" },
//!   { "op": "drag", "dx": 40.0 },
//!   { "op": "end" },
//!   { "op": "play", "seconds": 9.5 }
//! ]
//! ```

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::TrimConfig;
use crate::core::event_bus::{downcast_event, BoxedEvent, EventBus};
use crate::core::gesture::DragTarget;
use crate::core::slider_events::{DragBeganEvent, DragEndedEvent, PlayheadChangedEvent, RangeChangedEvent};
use crate::slider::TrimSlider;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Begin { target: DragTarget },
    Drag { dx: f64 },
    End,
    Cancel,
    /// Explicit seek.
    Seek { seconds: f64 },
    /// Playback position reported by a player.
    Play { seconds: f64 },
    SetStart { seconds: f64 },
    SetEnd { seconds: f64 },
    Resize { width: f64 },
}

/// One output line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Record {
    RangeChanged { step: usize, start: f64, end: f64 },
    PlayheadChanged { step: usize, seconds: f64 },
    DragBegan { step: usize },
    DragEnded { step: usize },
    /// A `begin` the slider did not accept.
    Refused { step: usize, target: DragTarget },
    Final { duration: f64, start: f64, end: f64, playhead: f64 },
}

pub fn parse_steps(text: &str) -> Result<Vec<Step>> {
    serde_json::from_str(text).context("Invalid replay script")
}

pub fn load_steps(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    parse_steps(&text).with_context(|| format!("In {}", path.display()))
}

pub struct Replay {
    slider: TrimSlider,
    bus: EventBus,
}

impl Replay {
    pub fn new(config: TrimConfig, duration: f64, track_width_px: f64) -> Result<Self> {
        let bus = EventBus::new();
        let mut slider = TrimSlider::new(config)?.with_observer(bus.emitter());
        slider.set_duration(duration);
        slider.track_width_changed(track_width_px);
        Ok(Self { slider, bus })
    }

    pub fn slider(&self) -> &TrimSlider {
        &self.slider
    }

    /// Apply one step and return what it emitted.
    pub fn apply(&mut self, index: usize, step: &Step) -> Vec<Record> {
        trace!("step {}: {:?}", index, step);
        let mut records = Vec::new();
        match *step {
            Step::Begin { target } => {
                if !self.slider.begin_drag(target) {
                    debug!("step {}: {:?} drag refused", index, target);
                    records.push(Record::Refused { step: index, target });
                }
            }
            Step::Drag { dx } => {
                self.slider.drag_by(dx);
            }
            Step::End => {
                self.slider.end_drag();
            }
            Step::Cancel => self.slider.cancel_drag(),
            Step::Seek { seconds } => {
                self.slider.set_playhead(seconds);
            }
            Step::Play { seconds } => {
                self.slider.update_playhead(seconds);
            }
            Step::SetStart { seconds } => {
                self.slider.set_start_position(seconds);
            }
            Step::SetEnd { seconds } => {
                self.slider.set_end_position(seconds);
            }
            Step::Resize { width } => self.slider.track_width_changed(width),
        }
        records.extend(self.bus.poll().iter().filter_map(|e| record_for(index, e)));
        records
    }

    pub fn final_state(&self) -> Record {
        let (start, end) = self.slider.selection_seconds();
        Record::Final {
            duration: self.slider.duration(),
            start,
            end,
            playhead: self.slider.playhead_seconds(),
        }
    }

    /// Replay all steps, writing one JSON object per line.
    pub fn run(&mut self, steps: &[Step], out: &mut impl Write) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            for record in self.apply(index, step) {
                write_record(out, &record)?;
            }
        }
        write_record(out, &self.final_state())?;
        out.flush().context("Failed to flush output")
    }
}

fn write_record(out: &mut impl Write, record: &Record) -> Result<()> {
    serde_json::to_writer(&mut *out, record).context("Failed to write record")?;
    writeln!(out).context("Failed to write record")
}

fn record_for(step: usize, event: &BoxedEvent) -> Option<Record> {
    if let Some(e) = downcast_event::<RangeChangedEvent>(event) {
        return Some(Record::RangeChanged { step, start: e.start, end: e.end });
    }
    if let Some(e) = downcast_event::<PlayheadChangedEvent>(event) {
        return Some(Record::PlayheadChanged { step, seconds: e.0 });
    }
    if downcast_event::<DragBeganEvent>(event).is_some() {
        return Some(Record::DragBegan { step });
    }
    if downcast_event::<DragEndedEvent>(event).is_some() {
        return Some(Record::DragEnded { step });
    }
    trace!("Unhandled event: {}", (**event).type_name());
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let steps = parse_steps(
            r#"[
                {"op": "begin", "target": "whole_range"},
                {"op": "drag", "dx": -12.5},
                {"op": "end"},
                {"op": "set_start", "seconds": 2},
                {"op": "resize", "width": 640}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps[0], Step::Begin { target: DragTarget::WholeRange });
        assert_eq!(steps[1], Step::Drag { dx: -12.5 });
        assert_eq!(steps[2], Step::End);
        assert_eq!(steps[3], Step::SetStart { seconds: 2.0 });
        assert_eq!(steps[4], Step::Resize { width: 640.0 });
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(parse_steps(r#"[{"op": "zoom"}]"#).is_err());
    }

    #[test]
    fn test_replay_records_in_order() {
        let config = TrimConfig {
            min_space_seconds: 2.0,
            ..Default::default()
        };
        let mut replay = Replay::new(config, 10.0, 100.0).unwrap();
        let steps = [
            Step::Begin { target: DragTarget::Start },
            Step::Drag { dx: 95.0 },
            Step::End,
        ];
        let records: Vec<Record> = steps
            .iter()
            .enumerate()
            .flat_map(|(i, s)| replay.apply(i, s))
            .collect();

        assert_eq!(records[0], Record::DragBegan { step: 0 });
        assert!(matches!(records[1], Record::RangeChanged { step: 1, start, end }
            if (start - 8.0).abs() < 1e-9 && end == 10.0));
        assert!(matches!(records[2], Record::PlayheadChanged { step: 1, .. }));
        assert_eq!(records[3], Record::DragEnded { step: 2 });
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_refused_begin_recorded() {
        let config = TrimConfig {
            is_playhead_draggable: false,
            ..Default::default()
        };
        let mut replay = Replay::new(config, 10.0, 100.0).unwrap();
        let records = replay.apply(0, &Step::Begin { target: DragTarget::Playhead });
        assert_eq!(records, vec![Record::Refused { step: 0, target: DragTarget::Playhead }]);
    }

    #[test]
    fn test_run_writes_json_lines() {
        let mut replay = Replay::new(TrimConfig::default(), 10.0, 100.0).unwrap();
        let steps = parse_steps(r#"[{"op": "set_end", "seconds": 5}, {"op": "play", "seconds": 5}]"#).unwrap();
        let mut out = Vec::new();
        replay.run(&steps, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines[0]["event"], "range_changed");
        assert_eq!(lines[0]["end"], 5.0);
        let last = lines.last().unwrap();
        assert_eq!(last["event"], "final");
        assert_eq!(last["end"], 5.0);
        assert_eq!(last["playhead"], 0.0);
    }
}
