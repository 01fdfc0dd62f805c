//! Pointer replay: canvas points become absolute screen moves.
//!
//! The device-facing end is a [`PointerSink`]. [`OffsetInjector`] adapts a
//! sink into a [`PathObserver`] by translating every canvas point by the
//! canvas origin on screen. Real OS injection lives outside this crate; here
//! are a recording sink for tests and a JSON-lines sink for piping moves to
//! another process.

use std::io::Write;

use noise_walk_core::{PathObserver, Point2D, WalkError};
use serde::Serialize;
use tracing::{debug, trace};

/// Receives absolute pointer positions.
pub trait PointerSink {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WalkError>;
}

impl<S: PointerSink + ?Sized> PointerSink for &mut S {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WalkError> {
        (**self).move_to(x, y)
    }
}

impl<S: PointerSink + ?Sized> PointerSink for Box<S> {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WalkError> {
        (**self).move_to(x, y)
    }
}

/// Replays a path through `sink`, shifted by a fixed canvas-to-screen offset.
///
/// Any sink error is reported as `WalkError::Injection`, which makes the
/// driver abort the session.
pub struct OffsetInjector<S> {
    sink: S,
    offset: Point2D,
    moves: usize,
}

impl<S: PointerSink> OffsetInjector<S> {
    pub fn new(sink: S, offset: Point2D) -> Self {
        Self {
            sink,
            offset,
            moves: 0,
        }
    }

    pub fn offset(&self) -> Point2D {
        self.offset
    }

    /// Number of successful moves.
    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: PointerSink> PathObserver for OffsetInjector<S> {
    fn on_start(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        debug!(%start, %target, offset = %self.offset, "replaying path");
        Ok(())
    }

    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
        let screen = point.offset(self.offset.x, self.offset.y);
        trace!(%screen, "pointer move");
        self.sink
            .move_to(screen.x, screen.y)
            .map_err(|e| match e {
                WalkError::Injection(msg) => WalkError::Injection(msg),
                other => WalkError::Injection(other.to_string()),
            })?;
        self.moves += 1;
        Ok(())
    }
}

/// Keeps every move in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    moves: Vec<Point2D>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> &[Point2D] {
        &self.moves
    }
}

impl PointerSink for RecordingSink {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WalkError> {
        self.moves.push(Point2D::new(x, y));
        Ok(())
    }
}

#[derive(Serialize)]
struct MoveRecord {
    seq: usize,
    x: f64,
    y: f64,
}

/// Writes each move as one JSON object per line: `{"seq":0,"x":..,"y":..}`.
///
/// Flushes after every line so a reader sees moves as they happen.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    seq: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointerSink for JsonLinesSink<W> {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WalkError> {
        let record = MoveRecord {
            seq: self.seq,
            x,
            y,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| WalkError::Injection(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|e| WalkError::Injection(e.to_string()))?;
        self.seq += 1;
        Ok(())
    }
}
