//! Cooperative cancellation.
//!
//! Long-running entry points check their token between per-region
//! iterations and return [`ScoringError::Cancelled`] once it fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::ScoringError;

/// A cancellation token.
pub trait Cancellation: Sync {
    /// Returns `true` once the computation should stop.
    fn is_cancelled(&self) -> bool;
}

/// A token that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// A token that fires at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(pub Instant);

impl Cancellation for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.0
    }
}

/// Returns [`ScoringError::Cancelled`] if `cancel` has fired.
///
/// # Errors
///
/// Returns [`ScoringError::Cancelled`] if the token has fired.
pub fn check(cancel: &dyn Cancellation) -> Result<(), ScoringError> {
    if cancel.is_cancelled() {
        log::debug!("Scoring cancelled by caller");
        Err(ScoringError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn never_cancel_passes() {
        assert!(check(&NeverCancel).is_ok());
    }

    #[test]
    fn atomic_flag_cancels_once_set() {
        let flag = AtomicBool::new(false);
        assert!(check(&flag).is_ok());
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(check(&flag), Err(ScoringError::Cancelled)));
    }

    #[test]
    fn deadline_in_the_past_cancels() {
        let past = Deadline(Instant::now());
        assert!(matches!(check(&past), Err(ScoringError::Cancelled)));

        let future = Deadline(Instant::now() + Duration::from_secs(3600));
        assert!(check(&future).is_ok());
    }
}
