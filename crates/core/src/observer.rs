//! The seam between a path producer and its consumers.
//!
//! A path session yields points; renderers, recorders and pointer injectors
//! consume them through [`PathObserver`]. The trait is object-safe so a driver
//! can fan points out to `&mut dyn PathObserver` values of different types.

use crate::error::WalkError;
use crate::point::Point2D;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a path session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still stepping toward the target.
    Running,
    /// Reached the target exactly.
    Completed,
    /// Stopped by its cancel token before reaching the target.
    Cancelled,
}

impl SessionStatus {
    /// `Completed` or `Cancelled`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        })
    }
}

/// Consumer of an emitted point stream.
///
/// An error from any method aborts the session; the driver cancels it and
/// hands the error back to the caller.
pub trait PathObserver {
    /// Called once before the first point.
    fn on_start(&mut self, _start: Point2D, _target: Point2D) -> Result<(), WalkError> {
        Ok(())
    }

    /// Called for every emitted point, starting with the start point.
    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError>;

    /// Called once with the terminal status when the session ends normally.
    fn on_finish(&mut self, _status: SessionStatus) -> Result<(), WalkError> {
        Ok(())
    }
}

/// Pairs compose: both halves see every event, the first one first.
impl<A: PathObserver, B: PathObserver> PathObserver for (A, B) {
    fn on_start(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        self.0.on_start(start, target)?;
        self.1.on_start(start, target)
    }

    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
        self.0.on_point(point)?;
        self.1.on_point(point)
    }

    fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
        self.0.on_finish(status)?;
        self.1.on_finish(status)
    }
}

/// An absent observer ignores everything.
impl<O: PathObserver> PathObserver for Option<O> {
    fn on_start(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        match self {
            Some(o) => o.on_start(start, target),
            None => Ok(()),
        }
    }

    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
        match self {
            Some(o) => o.on_point(point),
            None => Ok(()),
        }
    }

    fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
        match self {
            Some(o) => o.on_finish(status),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Observer that counts points and fails after a limit.
    struct Counting {
        points: usize,
        limit: usize,
        finished: Option<SessionStatus>,
    }

    impl PathObserver for Counting {
        fn on_point(&mut self, _point: Point2D) -> Result<(), WalkError> {
            self.points += 1;
            if self.points > self.limit {
                return Err(WalkError::Injection("limit reached".into()));
            }
            Ok(())
        }

        fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
            self.finished = Some(status);
            Ok(())
        }
    }

    #[test]
    fn observer_trait_is_object_safe() {
        let mut observer = Counting {
            points: 0,
            limit: 10,
            finished: None,
        };
        let dyn_ref: &mut dyn PathObserver = &mut observer;
        dyn_ref.on_start(Point2D::default(), Point2D::new(1.0, 1.0)).unwrap();
        dyn_ref.on_point(Point2D::default()).unwrap();
        dyn_ref.on_finish(SessionStatus::Completed).unwrap();
        assert_eq!(observer.points, 1);
        assert_eq!(observer.finished, Some(SessionStatus::Completed));
    }

    #[test]
    fn observer_errors_propagate() {
        let mut observer: Box<dyn PathObserver> = Box::new(Counting {
            points: 0,
            limit: 1,
            finished: None,
        });
        assert!(observer.on_point(Point2D::default()).is_ok());
        assert!(matches!(
            observer.on_point(Point2D::default()),
            Err(WalkError::Injection(_))
        ));
    }

    #[test]
    fn pair_short_circuits_on_first_error() {
        let mut pair = (
            Counting { points: 0, limit: 0, finished: None },
            Counting { points: 0, limit: 5, finished: None },
        );
        assert!(pair.on_point(Point2D::default()).is_err());
        assert_eq!(pair.1.points, 0);
        pair.on_finish(SessionStatus::Cancelled).unwrap();
        assert_eq!(pair.0.finished, Some(SessionStatus::Cancelled));
        assert_eq!(pair.1.finished, Some(SessionStatus::Cancelled));
    }

    #[test]
    fn absent_observer_accepts_everything() {
        let mut none: Option<Counting> = None;
        assert!(none.on_point(Point2D::default()).is_ok());
        let mut some = Some(Counting { points: 0, limit: 0, finished: None });
        assert!(some.on_point(Point2D::default()).is_err());
    }

    #[test]
    fn status_terminality() {
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SessionStatus::Cancelled).unwrap(),
            serde_json::json!("cancelled")
        );
        assert_eq!(SessionStatus::Completed.to_string(), "completed");
    }
}
