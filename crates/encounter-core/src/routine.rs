//! Cooperative routine primitives.
//!
//! Every suspension point in the pipeline is a value that is resumed once
//! per simulation tick and answers [`Step::Pending`] until its resume
//! condition holds. Nothing blocks; "suspend" always means "return to the
//! scheduler and be resumed next tick".

/// One simulation step handed to every routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Monotonic tick counter of the driving scheduler.
    pub index: u64,
    /// Simulation seconds elapsed since the previous tick.
    pub delta: f32,
}

impl Tick {
    /// Creates a tick.
    #[must_use]
    pub fn new(index: u64, delta: f32) -> Self {
        Self {
            index,
            delta: delta.max(0.0),
        }
    }

    /// Returns the same tick with zero elapsed time.
    ///
    /// Used to resume a routine that was entered part-way through a tick, so
    /// that the time which already elapsed for the previous routine is not
    /// counted twice.
    #[must_use]
    pub fn settle(self) -> Self {
        Self {
            index: self.index,
            delta: 0.0,
        }
    }
}

/// Result of resuming a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T = ()> {
    /// Not finished; resume again next tick.
    Pending,
    /// Finished with a value.
    Ready(T),
}

impl<T> Step<T> {
    /// Returns `true` if the routine has finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Maps the finished value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Self::Pending => Step::Pending,
            Self::Ready(value) => Step::Ready(f(value)),
        }
    }
}

/// A fixed wait measured in simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wait {
    remaining: f32,
}

impl Wait {
    /// Creates a wait of `seconds`. Non-positive durations finish on the
    /// first resume.
    #[must_use]
    pub fn seconds(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// A wait that is already over.
    #[must_use]
    pub fn elapsed() -> Self {
        Self { remaining: 0.0 }
    }

    /// Seconds still to wait.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Consumes the tick's elapsed time.
    pub fn resume(&mut self, tick: Tick) -> Step {
        self.remaining = (self.remaining - tick.delta).max(0.0);
        if self.remaining <= 0.0 {
            Step::Ready(())
        } else {
            Step::Pending
        }
    }
}
