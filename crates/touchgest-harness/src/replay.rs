#![forbid(unsafe_code)]

//! Replay a [`Script`] through a [`GestureSystem`] and record the outcome.
//!
//! Every event becomes an [`EventRecord`]; the report serializes to JSONL,
//! one record per line, for golden comparisons and CI artifacts.

use std::io::Write;

use serde::Serialize;
use serde_json::{Value, json};
use touchgest_core::{AnyGestureEvent, GestureEvent, GestureSystem, HitTest, SnapshotError};
use web_time::{Duration, Instant};

use crate::error::HarnessError;
use crate::script::Script;

/// One gesture event, flattened for logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub frame: usize,
    pub at_ms: u64,
    pub kind: &'static str,
    pub phase: &'static str,
    pub gesture: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
    /// Kind-specific values (positions, gap, rotation, elapsed time).
    pub detail: Value,
}

impl EventRecord {
    fn from_event(frame: usize, at_ms: u64, event: &AnyGestureEvent) -> Self {
        let (kind, target, detail) = match event {
            AnyGestureEvent::TwoFingerDrag(e) => {
                let g = e.gesture();
                let detail = json!({
                    "position": [g.position().x, g.position().y],
                    "delta": [g.delta().x, g.delta().y],
                });
                ("two_finger_drag", started_target(e), detail)
            }
            AnyGestureEvent::Pinch(e) => {
                let g = e.gesture();
                let detail = json!({
                    "gap_inches": g.gap_inches(),
                    "gap_delta_inches": g.gap_delta_inches(),
                });
                ("pinch", started_target(e), detail)
            }
            AnyGestureEvent::Twist(e) => {
                let detail = json!({ "delta_rotation": e.gesture().delta_rotation() });
                ("twist", started_target(e), detail)
            }
            AnyGestureEvent::Drag(e) => {
                let g = e.gesture();
                let detail = json!({
                    "position": [g.position().x, g.position().y],
                    "delta": [g.delta().x, g.delta().y],
                });
                ("drag", started_target(e), detail)
            }
            AnyGestureEvent::Tap(e) => {
                let elapsed = u64::try_from(e.gesture().elapsed().as_millis()).unwrap_or(u64::MAX);
                ("tap", started_target(e), json!({ "elapsed_ms": elapsed }))
            }
        };
        Self {
            frame,
            at_ms,
            kind,
            phase: event.phase_name(),
            gesture: event.id().0,
            target,
            detail,
        }
    }
}

fn started_target<K>(event: &GestureEvent<K>) -> Option<u64> {
    match event {
        GestureEvent::Started { target, .. } => target.map(|t| t.0),
        _ => None,
    }
}

/// A frame the system refused.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFrame {
    pub frame: usize,
    pub error: SnapshotError,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub events: Vec<EventRecord>,
    pub rejected: Vec<RejectedFrame>,
    /// Live gestures after the last frame.
    pub active_after: usize,
    /// Touches still retained after the last frame.
    pub retained_after: usize,
}

impl ReplayReport {
    /// Kinds in the order their gestures started.
    #[must_use]
    pub fn started_kinds(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter(|e| e.phase == "started")
            .map(|e| e.kind)
            .collect()
    }

    /// `(kind, phase)` pairs in emission order.
    #[must_use]
    pub fn timeline(&self) -> Vec<(&'static str, &'static str)> {
        self.events.iter().map(|e| (e.kind, e.phase)).collect()
    }

    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// One JSON object per line: every event, then every rejected frame.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        for rejected in &self.rejected {
            let line = json!({
                "frame": rejected.frame,
                "rejected": rejected.error.to_string(),
            });
            out.push_str(&serde_json::to_string(&line)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<(), HarnessError> {
        writer.write_all(self.to_jsonl()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Feed every frame of `script` to `system`.
///
/// Frame `i` is delivered at `start + script.frames[i].at_ms`. Rejected
/// snapshots are recorded and the replay continues.
pub fn replay(
    system: &mut GestureSystem,
    script: &Script,
    hit_test: &dyn HitTest,
    start: Instant,
) -> ReplayReport {
    let mut report = ReplayReport::default();

    for (index, frame) in script.iter().enumerate() {
        let _span = tracing::debug_span!(
            "replay_frame",
            frame = index,
            at_ms = frame.at_ms,
            touches = frame.touches.len()
        )
        .entered();

        let now = start + Duration::from_millis(frame.at_ms);
        match system.frame(&frame.touches, hit_test, now) {
            Ok(events) => {
                report.events.extend(
                    events
                        .iter()
                        .map(|e| EventRecord::from_event(index, frame.at_ms, e)),
                );
            }
            Err(error) => {
                tracing::warn!(frame = index, %error, "frame rejected");
                report.rejected.push(RejectedFrame {
                    frame: index,
                    error,
                });
            }
        }
    }

    report.active_after = system.active_count();
    report.retained_after = system.registry().retained_count();
    tracing::info!(
        frames = script.len(),
        events = report.events.len(),
        rejected = report.rejected.len(),
        "replay finished"
    );
    report
}
