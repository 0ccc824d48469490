//! UI-thread affinity checks.
//!
//! All widget mutation, timer firing and service dispatch happen on the
//! thread that owns the [`MainContext`](crate::MainContext). Service workers
//! only hand signals off through a [`UiSender`](crate::UiSender).
//!
//! Checks are on by default in debug builds and can be toggled at runtime
//! (see [`ApplicationConfig::ui_thread_checks`](crate::ApplicationConfig)).

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl ThreadAffinity {
    /// Affinity with the current thread.
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The owning thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the current thread is the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if checks are enabled and this is not the owning thread.
    #[track_caller]
    pub fn assert_same_thread(&self, operation: &str) {
        if are_thread_checks_enabled() && !self.is_same_thread() {
            let current = std::thread::current();
            panic!(
                "{operation} must run on the UI thread {:?}, but was called from {:?} ({})",
                self.thread_id,
                current.id(),
                current.name().unwrap_or("<unnamed>"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread("test");
    }

    #[test]
    fn test_other_thread() {
        let affinity = ThreadAffinity::current();
        let other = std::thread::spawn(move || affinity.is_same_thread())
            .join()
            .unwrap();
        assert!(!other);
    }
}
