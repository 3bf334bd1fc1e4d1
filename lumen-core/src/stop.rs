//! External stop signal for the receive loop

use portable_atomic::{AtomicBool, Ordering};

/// Flag that asks a running receive loop to return
///
/// Shared by reference; raising it from the byte sink, another task or an
/// interrupt handler ends the loop at its next iteration.
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: AtomicBool,
}

impl StopSignal {
    /// Create a lowered signal
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Ask the loop to stop
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Check if a stop was requested
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the signal so the loop can be run again
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_reset() {
        let stop = StopSignal::new();
        assert!(!stop.is_raised());

        stop.raise();
        assert!(stop.is_raised());

        stop.reset();
        assert!(!stop.is_raised());
    }
}
