//! Runs a path session and fans its points out to observers.
//!
//! [`drive`] runs on the calling thread; [`spawn`] runs the same loop on a
//! dedicated background thread and hands back a [`SessionHandle`] that can
//! cancel it and collect the result. Only one session should drive a given
//! pointer at a time.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;

use noise_walk_core::{PathObserver, Point2D, RandomSource, SessionStatus, WalkError};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::session::{PathSession, SessionReport};

/// Runs `session` to the end, forwarding every point to each observer.
///
/// An observer error aborts the session and is returned as-is; the remaining
/// observers are not told about the failed point. `on_finish` is only called
/// for sessions that ended normally (completed or cancelled).
pub fn drive<R: RandomSource>(
    session: &mut PathSession<R>,
    observers: &mut [&mut dyn PathObserver],
) -> Result<SessionReport, WalkError> {
    let (start, target) = (session.start(), session.target());
    for observer in observers.iter_mut() {
        if let Err(e) = observer.on_start(start, target) {
            session.abort();
            return Err(e);
        }
    }

    while let Some(point) = session.next() {
        for observer in observers.iter_mut() {
            if let Err(e) = observer.on_point(point) {
                warn!(error = %e, %point, "observer failed, aborting path session");
                session.abort();
                return Err(e);
            }
        }
    }

    let report = session.report();
    for observer in observers.iter_mut() {
        observer.on_finish(report.status)?;
    }
    debug!(status = %report.status, points = report.points_emitted, "drive finished");
    Ok(report)
}

/// Result of a background session: the observer it owned and the outcome.
pub struct Finished<O> {
    pub observer: O,
    pub outcome: Result<SessionReport, WalkError>,
}

/// Handle to a session running on a background thread.
pub struct SessionHandle<O> {
    cancel: CancelToken,
    thread: JoinHandle<Finished<O>>,
}

impl<O> SessionHandle<O> {
    /// Requests cancellation. Fire-and-forget; use [`join`](Self::join) to
    /// observe the terminal status.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the session's cancel token (e.g. for a Ctrl+C handler).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the session thread.
    ///
    /// Returns `WalkError::Io` if the thread panicked.
    pub fn join(self) -> Result<Finished<O>, WalkError> {
        self.thread
            .join()
            .map_err(|_| WalkError::Io("path session thread panicked".into()))
    }
}

/// Runs `session` on a new thread, feeding `observer`.
///
/// Compose several observers with a tuple: `(recorder, injector)`.
pub fn spawn<R, O>(mut session: PathSession<R>, mut observer: O) -> Result<SessionHandle<O>, WalkError>
where
    R: RandomSource + Send + 'static,
    O: PathObserver + Send + 'static,
{
    let cancel = session.cancel_token();
    let thread = std::thread::Builder::new()
        .name("noise-walk-session".into())
        .spawn(move || {
            let outcome = drive(&mut session, &mut [&mut observer]);
            Finished { observer, outcome }
        })
        .map_err(|e| WalkError::Io(format!("failed to spawn session thread: {e}")))?;
    Ok(SessionHandle { cancel, thread })
}

/// Event sent by a [`PointSender`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEvent {
    Started { start: Point2D, target: Point2D },
    Point(Point2D),
    Finished(SessionStatus),
}

/// Observer that forwards the stream over a channel, so a presentation layer
/// on another thread can draw while the session runs.
///
/// A dropped receiver is not an error: the session keeps going.
pub struct PointSender {
    tx: Sender<PathEvent>,
}

impl PointSender {
    pub fn new(tx: Sender<PathEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sender observer and its receiving end.
    pub fn channel() -> (Self, Receiver<PathEvent>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl PathObserver for PointSender {
    fn on_start(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        let _ = self.tx.send(PathEvent::Started { start, target });
        Ok(())
    }

    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
        let _ = self.tx.send(PathEvent::Point(point));
        Ok(())
    }

    fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
        let _ = self.tx.send(PathEvent::Finished(status));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise_walk_core::{MotionParams, NoiseField, Xorshift64};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Collect {
        started: bool,
        points: Vec<Point2D>,
        finished: Option<SessionStatus>,
    }

    impl PathObserver for Collect {
        fn on_start(&mut self, _start: Point2D, _target: Point2D) -> Result<(), WalkError> {
            self.started = true;
            Ok(())
        }

        fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
            self.points.push(point);
            Ok(())
        }

        fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
            self.finished = Some(status);
            Ok(())
        }
    }

    /// Fails on the n-th point.
    struct FailAt(usize);

    impl PathObserver for FailAt {
        fn on_point(&mut self, _point: Point2D) -> Result<(), WalkError> {
            if self.0 == 0 {
                return Err(WalkError::Injection("pointer unavailable".into()));
            }
            self.0 -= 1;
            Ok(())
        }
    }

    fn straight_session(length: f64, step_sleep: f64) -> PathSession {
        PathSession::new(
            Arc::new(NoiseField::filled(8, 8, 0.5).unwrap()),
            Point2D::new(0.0, 0.0),
            Point2D::new(length, 0.0),
            1000.0,
            1000.0,
            MotionParams {
                speed_min: 10.0,
                speed_max_multiplier: 0.0,
                jitter_multiplier: 0.0,
                deviation_degrees_max: 0.0,
                step_sleep,
            },
            Xorshift64::new(1),
        )
        .unwrap()
    }

    #[test]
    fn drive_feeds_every_observer() {
        let mut session = straight_session(35.0, 0.0);
        let mut a = Collect::default();
        let mut b = Collect::default();
        let report = drive(&mut session, &mut [&mut a, &mut b]).unwrap();

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.points_emitted, 5);
        assert!(a.started && b.started);
        assert_eq!(a.points, b.points);
        assert_eq!(a.points.last(), Some(&Point2D::new(35.0, 0.0)));
        assert_eq!(a.finished, Some(SessionStatus::Completed));
    }

    #[test]
    fn drive_with_no_observers_still_runs() {
        let mut session = straight_session(20.0, 0.0);
        let report = drive(&mut session, &mut []).unwrap();
        assert_eq!(report.status, SessionStatus::Completed);
    }

    #[test]
    fn observer_failure_aborts_session() {
        let mut session = straight_session(1000.0, 0.0);
        let mut collect = Collect::default();
        let mut failing = FailAt(2);
        let err = drive(&mut session, &mut [&mut collect, &mut failing]).unwrap_err();

        assert!(matches!(err, WalkError::Injection(_)));
        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert_eq!(collect.points.len(), 3);
        assert_eq!(collect.finished, None);
    }

    #[test]
    fn tuple_observer_feeds_both_halves() {
        let mut session = straight_session(15.0, 0.0);
        let mut pair = (Collect::default(), Collect::default());
        drive(&mut session, &mut [&mut pair]).unwrap();
        assert_eq!(pair.0.points.len(), 3);
        assert_eq!(pair.0.points, pair.1.points);
    }

    #[test]
    fn spawn_runs_to_completion_and_returns_observer() {
        let handle = spawn(straight_session(50.0, 0.0), Collect::default()).unwrap();
        let finished = handle.join().unwrap();
        let report = finished.outcome.unwrap();
        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(finished.observer.points.len(), 6);
    }

    #[test]
    fn spawn_can_be_cancelled() {
        let (sender, rx) = PointSender::channel();
        let handle = spawn(straight_session(100_000.0, 0.005), sender).unwrap();

        // Wait until the walker is actually moving, then stop it.
        let mut seen = 0;
        while seen < 3 {
            if let PathEvent::Point(_) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                seen += 1;
            }
        }
        handle.cancel();
        let finished = handle.join().unwrap();
        let report = finished.outcome.unwrap();
        assert_eq!(report.status, SessionStatus::Cancelled);
        assert_ne!(report.last_point, Point2D::new(100_000.0, 0.0));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.last(), Some(&PathEvent::Finished(SessionStatus::Cancelled)));
    }

    #[test]
    fn point_sender_streams_lifecycle() {
        let (mut sender, rx) = PointSender::channel();
        let mut session = straight_session(10.0, 0.0);
        drive(&mut session, &mut [&mut sender]).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                PathEvent::Started {
                    start: Point2D::new(0.0, 0.0),
                    target: Point2D::new(10.0, 0.0),
                },
                PathEvent::Point(Point2D::new(0.0, 0.0)),
                PathEvent::Point(Point2D::new(10.0, 0.0)),
                PathEvent::Finished(SessionStatus::Completed),
            ]
        );
    }

    #[test]
    fn point_sender_tolerates_dropped_receiver() {
        let (mut sender, rx) = PointSender::channel();
        drop(rx);
        let mut session = straight_session(30.0, 0.0);
        assert!(drive(&mut session, &mut [&mut sender]).is_ok());
    }
}
