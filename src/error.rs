use std::cell::RefCell;
use std::io;

use tracing::error;

use crate::config::Options;

/// All recoverable error types for mesh load/save.
///
/// Broken internal invariants (an index past the end of an array, a missing
/// normal slot where one is required) are not represented here; they panic.
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    #[error("Unrecognized mesh format: {0}")]
    UnrecognizedFormat(String),
    #[error("File access error: {0}")]
    FileAccess(String),
    #[error("Malformed mesh data: {0}")]
    MalformedData(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeshError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Message of the most recent failure swallowed by [`Options::NO_THROW`] on
/// the calling thread.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Like [`last_error`], but also clears the slot.
pub fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// Applies the load/save failure policy selected by `options`.
///
/// Without `NO_THROW` the error is handed back to the caller unchanged. With
/// `NO_THROW` it is logged, remembered as the thread's last error and turned
/// into `Ok(None)`.
pub(crate) fn apply_policy<T>(options: Options, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if options.contains(Options::NO_THROW) => {
            error!(%e, "Mesh operation failed");
            LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(e.to_string()));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
