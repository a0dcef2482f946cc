//! Per-call deadline and cancellation.
//!
//! Every manager operation receives a [`CallContext`]. Store calls are routed
//! through [`CallContext::run`], which refuses to start once the context has
//! expired and abandons an in-flight store future when the deadline passes or
//! the caller cancels. An abandoned call never reaches a later write.

use std::future::{Future, pending};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use super::Error;

/// Message carried by the error returned after the deadline passes.
pub const DEADLINE_EXCEEDED_MESSAGE: &str = "deadline exceeded";
/// Message carried by the error returned after cancellation.
pub const CANCELLED_MESSAGE: &str = "operation cancelled";

/// Caller-side trigger for cancelling in-flight operations.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle with no cancellation requested yet.
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self { sender }
    }

    /// Signal to hand to a [`CallContext`].
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Request cancellation of every context holding a signal from this handle.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// A dropped handle can no longer cancel, so the future then stays pending.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            pending::<()>().await;
        }
    }
}

/// Deadline and cancellation scope for a single manager call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancelSignal>,
}

impl CallContext {
    /// Context with neither deadline nor cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context expiring at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Context expiring `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Context observing `signal`.
    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast when the context has already expired or been cancelled.
    ///
    /// # Errors
    ///
    /// Returns an internal error naming the reason.
    pub fn check(&self) -> Result<(), Error> {
        if self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
            return Err(Error::internal(CANCELLED_MESSAGE));
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(Error::internal(DEADLINE_EXCEEDED_MESSAGE));
        }
        Ok(())
    }

    /// Run a store call under this context, mapping its error with `map_err`.
    ///
    /// # Errors
    ///
    /// Returns the mapped store error, or an internal error when the context
    /// expires or is cancelled before the call completes.
    pub async fn run<F, T, E, M>(&self, future: F, map_err: M) -> Result<T, Error>
    where
        F: Future<Output = Result<T, E>>,
        M: FnOnce(E) -> Error,
    {
        self.guard(future).await?.map_err(map_err)
    }

    /// Race `future` against the deadline and the cancellation signal.
    ///
    /// The future's own output is returned untouched, so callers can inspect
    /// a store error before classifying it.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the context expires or is cancelled
    /// before the future completes.
    pub async fn guard<F, T>(&self, future: F) -> Result<T, Error>
    where
        F: Future<Output = T>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };
        let cancelled = async {
            match &self.cancel {
                Some(signal) => signal.cancelled().await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(Error::internal(CANCELLED_MESSAGE)),
            () = deadline => Err(Error::internal(DEADLINE_EXCEEDED_MESSAGE)),
            output = future => Ok(output),
        }
    }
}
