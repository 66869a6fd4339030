//! Error policy: which failures the walk steps over and which end it.

use std::fmt;
use std::sync::Arc;

use crate::error::WalkError;

/// Caller override for error classification. `true` means expected.
pub type ErrorFilter = Arc<dyn Fn(&WalkError) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Skip the entry or subtree, report a warning, keep walking.
    Expected,
    /// Surface once to the consumer and stop.
    Fatal,
}

/// Default classification: not-found, permission-denied,
/// operation-not-permitted and ELOOP are expected, everything else is fatal.
pub fn classify_error(err: &WalkError) -> ErrorClass {
    if err.is_recoverable() {
        ErrorClass::Expected
    } else {
        ErrorClass::Fatal
    }
}

#[derive(Clone, Default)]
pub struct ErrorPolicy {
    filter: Option<ErrorFilter>,
}

impl ErrorPolicy {
    pub fn new(filter: Option<ErrorFilter>) -> Self {
        Self { filter }
    }

    pub fn classify(&self, err: &WalkError) -> ErrorClass {
        match err {
            // Circular symlinks are always skipped; not recursing into them is
            // what guarantees termination.
            WalkError::CircularSymlink { .. } => ErrorClass::Expected,
            // Filter and configuration failures are never downgraded.
            WalkError::Filter { .. } => ErrorClass::Fatal,
            e if e.is_config() => ErrorClass::Fatal,
            e => match &self.filter {
                Some(f) if f(e) => ErrorClass::Expected,
                Some(_) => ErrorClass::Fatal,
                None => classify_error(e),
            },
        }
    }
}

impl fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("custom_filter", &self.filter.is_some())
            .finish()
    }
}
