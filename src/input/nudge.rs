//! The nudge primitive seam
//!
//! The worker only depends on this trait, so the pointer backend can be
//! swapped out (and mocked in tests). The fail-safe flag belongs to the
//! primitive: disarmed only while the worker is actively looping, re-armed
//! on every exit path via [`FailSafeGuard`].

use std::sync::Arc;

use crate::error::NudgeError;

/// One harmless input action plus the fail-safe switch that guards it
pub trait Nudger: Send + Sync {
    /// Perform one pointer nudge
    fn nudge(&self) -> Result<(), NudgeError>;

    /// Arm or disarm the protective fail-safe interrupt
    fn set_fail_safe(&self, armed: bool);
}

/// Re-arms the fail-safe when dropped.
///
/// Held by the worker for its whole lifetime so the fail-safe is restored on
/// every exit path, including a panicking primitive.
pub struct FailSafeGuard {
    nudger: Arc<dyn Nudger>,
}

impl FailSafeGuard {
    pub fn new(nudger: Arc<dyn Nudger>) -> Self {
        Self { nudger }
    }
}

impl Drop for FailSafeGuard {
    fn drop(&mut self) {
        self.nudger.set_fail_safe(true);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use super::Nudger;
    use crate::error::NudgeError;

    /// Test double that records calls and the fail-safe flag, and can be
    /// told to fail
    pub(crate) struct MockNudger {
        attempts: AtomicUsize,
        nudges: AtomicUsize,
        fail_safe: AtomicBool,
        fail_with: Mutex<Option<NudgeError>>,
        panic_on_nudge: AtomicBool,
    }

    impl MockNudger {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                attempts: AtomicUsize::new(0),
                nudges: AtomicUsize::new(0),
                fail_safe: AtomicBool::new(true),
                fail_with: Mutex::new(None),
                panic_on_nudge: AtomicBool::new(false),
            })
        }

        /// Total nudge attempts, including failed ones
        pub(crate) fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        /// Successful nudges only
        pub(crate) fn nudge_count(&self) -> usize {
            self.nudges.load(Ordering::SeqCst)
        }

        pub(crate) fn fail_safe_armed(&self) -> bool {
            self.fail_safe.load(Ordering::SeqCst)
        }

        /// Make the next nudge return the given error
        pub(crate) fn fail_next(&self, error: NudgeError) {
            *self.fail_with.lock().unwrap() = Some(error);
        }

        /// Make every nudge panic
        pub(crate) fn panic_on_nudge(&self) {
            self.panic_on_nudge.store(true, Ordering::SeqCst);
        }
    }

    impl Nudger for MockNudger {
        fn nudge(&self) -> Result<(), NudgeError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_nudge.load(Ordering::SeqCst) {
                panic!("mock nudge panic");
            }
            if let Some(error) = self.fail_with.lock().unwrap().take() {
                return Err(error);
            }
            self.nudges.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn set_fail_safe(&self, armed: bool) {
            self.fail_safe.store(armed, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_rearms_on_drop() {
        let mock = MockNudger::new();
        mock.set_fail_safe(false);
        {
            let nudger: Arc<dyn Nudger> = mock.clone();
            let _guard = super::FailSafeGuard::new(nudger);
            assert!(!mock.fail_safe_armed());
        }
        assert!(mock.fail_safe_armed());
    }
}
