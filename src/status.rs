//! Cooperative cancellation polled by the detector between stages.
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Cancelled;

pub trait TaskStatus {
    fn is_cancelled(&self) -> bool;

    fn throw_if_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Status for callers that never cancel.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancelled;

impl TaskStatus for NeverCancelled {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Thread-safe flag that another thread may raise at any time.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl TaskStatus for CancelFlag {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl<T: TaskStatus + ?Sized> TaskStatus for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_raises_cancellation() {
        let flag = CancelFlag::new();
        assert!(flag.throw_if_cancelled().is_ok());
        flag.cancel();
        assert_eq!(flag.throw_if_cancelled(), Err(Cancelled));
        assert!(NeverCancelled.throw_if_cancelled().is_ok());
    }
}
