//! Exclusive pointer capture for look-around.
//!
//! The lock is reconciled against an external "is navigating" flag owned by
//! the UI layer. Requests move the lock toward the flag; platform-driven
//! releases (the user pressing escape) flow back into the flag.

use std::time::{Duration, Instant};

use readingroom_common::constants::LOCK_SETTLE_DELAY;

/// Errors raised by a platform when pointer capture is requested.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("pointer capture is not supported on this platform")]
    Unsupported,
    #[error("pointer capture rejected: {0}")]
    Rejected(String),
}

/// Platform hook that actually grabs and releases the pointer.
pub trait PointerCapture {
    /// Grab the pointer. May fail, for example when the window is not focused.
    fn lock(&mut self) -> Result<(), CaptureError>;
    /// Release the pointer. Must be harmless when nothing is held.
    fn unlock(&mut self);
}

/// The UI-owned navigation flag the lock reconciles against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationFlag {
    navigating: bool,
}

impl NavigationFlag {
    /// Whether the user is in navigation (walk and look) mode.
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    /// Set the flag. Returns `true` if the value changed.
    pub fn set(&mut self, navigating: bool) -> bool {
        let changed = self.navigating != navigating;
        self.navigating = navigating;
        changed
    }
}

/// Where the look lock is in its lifecycle. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No capture held or scheduled.
    Unlocked,
    /// Capture will be attempted once `attempt_at` is reached.
    PendingLock { attempt_at: Instant },
    /// The platform granted capture; look deltas apply.
    Locked,
}

/// What a lock transition did, for logging and for the caller's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    /// Capture succeeded after the settle delay.
    Acquired,
    /// Capture failed; the navigation flag has been reset.
    Failed,
    /// A held capture ended, by request or by the platform.
    Released,
    /// A pending attempt was dropped before it fired.
    Cancelled,
}

/// Look-lock state machine: Unlocked → PendingLock → Locked and back.
#[derive(Debug)]
pub struct LookLock {
    state: LockState,
    settle_delay: Duration,
}

impl Default for LookLock {
    fn default() -> Self {
        Self::new(LOCK_SETTLE_DELAY)
    }
}

impl LookLock {
    /// Unlocked lock whose capture attempts wait `settle_delay` after a request.
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            state: LockState::Unlocked,
            settle_delay,
        }
    }

    /// Current state.
    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LockState::PendingLock { .. })
    }

    /// Schedule a capture attempt after the settle delay.
    ///
    /// Only valid from `Unlocked`; a second request while pending or locked
    /// is ignored so no concurrent attempts are issued.
    pub fn request_lock(&mut self, now: Instant) -> bool {
        if self.state != LockState::Unlocked {
            return false;
        }
        self.state = LockState::PendingLock {
            attempt_at: now + self.settle_delay,
        };
        tracing::debug!(delay_ms = self.settle_delay.as_millis() as u64, "look lock pending");
        true
    }

    /// Fire the pending capture attempt if its time has come.
    ///
    /// A failed attempt returns to `Unlocked` and resets `nav`; it is never
    /// retried from here.
    pub fn poll(
        &mut self,
        now: Instant,
        capture: &mut dyn PointerCapture,
        nav: &mut NavigationFlag,
    ) -> Option<LockEvent> {
        let LockState::PendingLock { attempt_at } = self.state else {
            return None;
        };
        if now < attempt_at {
            return None;
        }
        match capture.lock() {
            Ok(()) => {
                self.state = LockState::Locked;
                tracing::info!("look lock acquired");
                Some(LockEvent::Acquired)
            }
            Err(e) => {
                self.state = LockState::Unlocked;
                nav.set(false);
                tracing::warn!("failed to acquire pointer lock: {e}");
                Some(LockEvent::Failed)
            }
        }
    }

    /// Explicit release requested by the application.
    pub fn request_unlock(&mut self, capture: &mut dyn PointerCapture) -> Option<LockEvent> {
        match self.state {
            LockState::Locked => {
                capture.unlock();
                self.state = LockState::Unlocked;
                tracing::info!("look lock released");
                Some(LockEvent::Released)
            }
            LockState::PendingLock { .. } => self.cancel(),
            LockState::Unlocked => None,
        }
    }

    /// The platform dropped the capture on its own (escape key, focus loss).
    ///
    /// Syncs into `nav` at most once: if the flag is already false it is left
    /// alone so the UI does not see a second toggle.
    pub fn on_platform_unlock(&mut self, nav: &mut NavigationFlag) -> Option<LockEvent> {
        if self.state != LockState::Locked {
            return None;
        }
        self.state = LockState::Unlocked;
        if nav.is_navigating() {
            nav.set(false);
        }
        tracing::info!("look lock released by platform");
        Some(LockEvent::Released)
    }

    /// Drop a pending attempt. Used on teardown.
    pub fn cancel(&mut self) -> Option<LockEvent> {
        if self.is_pending() {
            self.state = LockState::Unlocked;
            tracing::debug!("pending look lock cancelled");
            Some(LockEvent::Cancelled)
        } else {
            None
        }
    }

    /// Move the lock toward the navigation flag, then fire any due attempt.
    pub fn reconcile(
        &mut self,
        now: Instant,
        capture: &mut dyn PointerCapture,
        nav: &mut NavigationFlag,
    ) -> Option<LockEvent> {
        if nav.is_navigating() {
            self.request_lock(now);
            self.poll(now, capture, nav)
        } else {
            self.request_unlock(capture)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeCapture {
        fail: bool,
        lock_calls: usize,
        unlock_calls: usize,
    }

    impl PointerCapture for FakeCapture {
        fn lock(&mut self) -> Result<(), CaptureError> {
            self.lock_calls += 1;
            if self.fail {
                Err(CaptureError::Rejected("document not focused".into()))
            } else {
                Ok(())
            }
        }

        fn unlock(&mut self) {
            self.unlock_calls += 1;
        }
    }

    const SETTLE: Duration = Duration::from_millis(100);

    fn navigating() -> NavigationFlag {
        let mut nav = NavigationFlag::default();
        nav.set(true);
        nav
    }

    #[test]
    fn waits_for_settle_delay_before_capture() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture::default();
        let mut nav = navigating();

        assert_eq!(lock.reconcile(t0, &mut cap, &mut nav), None);
        assert!(lock.is_pending());
        assert_eq!(cap.lock_calls, 0);

        let early = t0 + Duration::from_millis(50);
        assert_eq!(lock.reconcile(early, &mut cap, &mut nav), None);
        assert_eq!(cap.lock_calls, 0);

        let due = t0 + SETTLE;
        assert_eq!(lock.reconcile(due, &mut cap, &mut nav), Some(LockEvent::Acquired));
        assert!(lock.is_locked());
        assert_eq!(cap.lock_calls, 1);
    }

    #[test]
    fn failed_capture_resets_flag_without_retry() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture {
            fail: true,
            ..Default::default()
        };
        let mut nav = navigating();

        lock.reconcile(t0, &mut cap, &mut nav);
        let event = lock.reconcile(t0 + SETTLE, &mut cap, &mut nav);
        assert_eq!(event, Some(LockEvent::Failed));
        assert!(!nav.is_navigating());
        assert_eq!(lock.state(), LockState::Unlocked);

        // Later frames must not schedule another attempt.
        for ms in [200, 500, 1000] {
            lock.reconcile(t0 + Duration::from_millis(ms), &mut cap, &mut nav);
        }
        assert_eq!(cap.lock_calls, 1);
        assert!(!lock.is_pending());
    }

    #[test]
    fn explicit_unlock_releases_capture() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture::default();
        let mut nav = navigating();
        lock.reconcile(t0, &mut cap, &mut nav);
        lock.reconcile(t0 + SETTLE, &mut cap, &mut nav);

        nav.set(false);
        let event = lock.reconcile(t0 + SETTLE * 2, &mut cap, &mut nav);
        assert_eq!(event, Some(LockEvent::Released));
        assert_eq!(cap.unlock_calls, 1);
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[test]
    fn platform_unlock_syncs_flag_exactly_once() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture::default();
        let mut nav = navigating();
        lock.reconcile(t0, &mut cap, &mut nav);
        lock.reconcile(t0 + SETTLE, &mut cap, &mut nav);

        assert_eq!(lock.on_platform_unlock(&mut nav), Some(LockEvent::Released));
        assert!(!nav.is_navigating());
        // A duplicate platform event is a no-op.
        assert_eq!(lock.on_platform_unlock(&mut nav), None);
        assert!(!nav.is_navigating());
        // The platform already released; the app must not unlock again.
        assert_eq!(cap.unlock_calls, 0);
    }

    #[test]
    fn platform_unlock_leaves_false_flag_alone() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture::default();
        let mut nav = navigating();
        lock.reconcile(t0, &mut cap, &mut nav);
        lock.reconcile(t0 + SETTLE, &mut cap, &mut nav);

        // Flag flipped by the UI but the unlock has not been processed yet.
        nav.set(false);
        lock.on_platform_unlock(&mut nav);
        assert!(!nav.is_navigating());
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[test]
    fn leaving_navigation_while_pending_cancels_attempt() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        let mut cap = FakeCapture::default();
        let mut nav = navigating();
        lock.reconcile(t0, &mut cap, &mut nav);

        nav.set(false);
        let event = lock.reconcile(t0 + Duration::from_millis(20), &mut cap, &mut nav);
        assert_eq!(event, Some(LockEvent::Cancelled));
        lock.reconcile(t0 + SETTLE * 3, &mut cap, &mut nav);
        assert_eq!(cap.lock_calls, 0);
    }

    #[test]
    fn duplicate_requests_do_not_restart_timer() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        assert!(lock.request_lock(t0));
        assert!(!lock.request_lock(t0 + Duration::from_millis(90)));
        assert_eq!(
            lock.state(),
            LockState::PendingLock {
                attempt_at: t0 + SETTLE
            }
        );
    }

    #[test]
    fn cancel_on_teardown() {
        let t0 = Instant::now();
        let mut lock = LookLock::new(SETTLE);
        lock.request_lock(t0);
        assert_eq!(lock.cancel(), Some(LockEvent::Cancelled));
        assert_eq!(lock.cancel(), None);
    }
}
