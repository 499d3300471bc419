use std::sync::{Mutex, MutexGuard};

/// Locks the mutex, recovering the data if another thread panicked while
/// holding the lock. None of the guarded state can be left half updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
