//! Per-thread suppression of log forwarding.
//!
//! While the hook hands an event to its transport, anything the transport
//! logs must not come back into the hook. Appenders check
//! [`is_suppressed`] and drop records emitted inside a suppressed scope.
use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static SUPPRESSED: Cell<bool> = const { Cell::new(false) };
}

/// Returns `true` if the current thread is inside a suppressed scope.
pub fn is_suppressed() -> bool {
    SUPPRESSED.try_with(Cell::get).unwrap_or(false)
}

/// Marks the current thread as suppressed until dropped.
///
/// Guards nest. Dropping one restores whatever state was active when it was
/// entered.
#[allow(missing_debug_implementations)]
pub struct SuppressionGuard {
    previous: bool,
    // ensure this type is !Send as it relies on thread locals
    _marker: PhantomData<*const ()>,
}

impl SuppressionGuard {
    /// Enters a suppressed scope on the current thread.
    pub fn enter() -> Self {
        let previous = SUPPRESSED.try_with(|s| s.replace(true)).unwrap_or(false);
        SuppressionGuard {
            previous,
            _marker: PhantomData,
        }
    }
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        let _ = SUPPRESSED.try_with(|s| s.set(self.previous));
    }
}
