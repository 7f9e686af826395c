//! Keep-awake worker background task

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{
    error::NudgeError,
    input::FailSafeGuard,
    state::{AppState, RunContext, SessionEvent},
};

/// Background task that performs one nudge per interval for the lifetime of
/// one run.
///
/// Cancellation is cooperative: every wait races the run token, so a stop
/// issued at any point wakes the worker immediately. The fail-safe is
/// disarmed only while this loop is alive and re-armed on every exit path by
/// the guard.
pub async fn keep_awake_task(state: Arc<AppState>, mut run: RunContext) {
    info!("Keep-awake worker started ({}s interval)", run.total_seconds);
    let nudger = state.nudger();
    let _fail_safe = FailSafeGuard::new(Arc::clone(&nudger));

    loop {
        if run.token.is_cancelled() {
            break;
        }

        // A draining predecessor's guard may have re-armed the fail-safe.
        nudger.set_fail_safe(false);

        state.begin_cycle();

        if !count_out_interval(&mut run).await {
            continue;
        }
        if run.token.is_cancelled() {
            continue;
        }
        // Do not act while paused, but keep the pending action for resume.
        if !wait_gate_open(&mut run).await {
            continue;
        }
        if !state.is_running() {
            debug!("Skipping nudge, session is not running");
            continue;
        }

        match catch_unwind(AssertUnwindSafe(|| nudger.nudge())) {
            Ok(Ok(())) => {
                debug!("Nudge performed");
                state.notify(SessionEvent::NudgePerformed);
            }
            Ok(Err(err @ NudgeError::FailSafeInterrupt { .. })) => {
                warn!("Nudge aborted by fail-safe: {}", err);
                state.notify(SessionEvent::NudgeFailed {
                    reason: err.to_string(),
                });
            }
            Ok(Err(err)) => {
                error!("Nudge failed: {}", err);
                state.notify(SessionEvent::NudgeFailed {
                    reason: err.to_string(),
                });
            }
            Err(_) => {
                error!("Nudge primitive panicked, terminating worker");
                break;
            }
        }
    }

    info!("Keep-awake worker exiting");
}

/// Count out the interval in whole-second ticks, re-checking the stop token
/// and the pause gate before each tick. Returns `false` if the run was
/// cancelled.
async fn count_out_interval(run: &mut RunContext) -> bool {
    for _ in 0..run.total_seconds {
        if run.token.is_cancelled() {
            return false;
        }
        if !wait_gate_open(run).await {
            return false;
        }
        tokio::select! {
            _ = run.token.cancelled() => return false,
            _ = sleep(Duration::from_secs(1)) => {}
        }
    }
    true
}

/// Block until the pause gate is open. Returns `false` if the run was
/// cancelled while waiting.
async fn wait_gate_open(run: &mut RunContext) -> bool {
    tokio::select! {
        _ = run.token.cancelled() => false,
        result = run.gate.wait_for(|open| *open) => result.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::error::NudgeError;
    use crate::input::{testing::MockNudger, Nudger};
    use crate::state::{AppState, SessionState};

    fn state_with_mock() -> (Arc<AppState>, Arc<MockNudger>) {
        let mock = MockNudger::new();
        let nudger: Arc<dyn Nudger> = mock.clone();
        let state = AppState::new(0, "127.0.0.1".to_string(), "30 sec".to_string(), nudger);
        (state, mock)
    }

    #[tokio::test(start_paused = true)]
    async fn nudges_once_per_interval_then_restarts_the_cycle() {
        let (state, mock) = state_with_mock();
        let mut events = state.subscribe_events();

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(31_500)).await;

        assert_eq!(mock.nudge_count(), 1, "exactly one nudge in the first 31s");
        let remaining = state.overview().unwrap().remaining_seconds.unwrap();
        assert!(
            remaining >= 25,
            "countdown should have reset for the second cycle, got {remaining}"
        );
        assert!(events.try_recv().is_ok(), "cycle events should be broadcast");

        sleep(Duration::from_secs(30)).await;
        assert_eq!(mock.nudge_count(), 2, "second cycle should nudge again");
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_the_nudge_until_resume() {
        let (state, mock) = state_with_mock();

        state.start("30 sec").unwrap();
        state.pause().unwrap();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(mock.attempts(), 0, "no nudges while paused");

        state.resume().unwrap();
        sleep(Duration::from_millis(2_500)).await;
        let remaining = state.overview().unwrap().remaining_seconds.unwrap();
        assert!(remaining < 30, "countdown should decrement after resume");

        sleep(Duration::from_secs(29)).await;
        assert_eq!(mock.nudge_count(), 1, "the held nudge fires after resume");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_the_nudge_skips_it_and_restores_the_fail_safe() {
        let (state, mock) = state_with_mock();

        state.start("30 sec").unwrap();
        sleep(Duration::from_secs(10)).await;
        assert!(state.worker_alive().unwrap());

        state.stop().unwrap();
        assert!(mock.fail_safe_armed());

        sleep(Duration::from_secs(1)).await;
        assert!(!state.worker_alive().unwrap(), "worker should exit promptly");
        assert_eq!(mock.attempts(), 0, "no nudge once stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_paused_unblocks_the_worker() {
        let (state, mock) = state_with_mock();

        state.start("30 sec").unwrap();
        sleep(Duration::from_secs(3)).await;
        state.pause().unwrap();
        sleep(Duration::from_secs(3)).await;

        state.stop().unwrap();
        sleep(Duration::from_secs(1)).await;

        assert!(!state.worker_alive().unwrap(), "stop must not wait for a resume");
        assert_eq!(mock.attempts(), 0);
        assert!(mock.fail_safe_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn fail_safe_interrupt_keeps_the_worker_alive() {
        let (state, mock) = state_with_mock();
        mock.fail_next(NudgeError::FailSafeInterrupt { x: 0.0, y: 0.0 });

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(31_500)).await;

        assert_eq!(mock.attempts(), 1);
        assert_eq!(mock.nudge_count(), 0, "the interrupted nudge did not land");
        assert!(state.worker_alive().unwrap(), "the loop continues");

        sleep(Duration::from_secs(30)).await;
        assert_eq!(mock.nudge_count(), 1, "the next cycle nudges normally");
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_primitive_terminates_the_loop_but_not_the_process() {
        let (state, mock) = state_with_mock();
        mock.panic_on_nudge();

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(31_500)).await;

        assert_eq!(mock.attempts(), 1);
        assert!(!state.worker_alive().unwrap(), "worker exits on a fault");
        assert!(mock.fail_safe_armed(), "guard re-arms the fail-safe on a fault");
    }

    #[tokio::test(start_paused = true)]
    async fn fail_safe_is_disarmed_only_while_looping() {
        let (state, mock) = state_with_mock();
        assert!(mock.fail_safe_armed());

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(10)).await;
        assert!(!mock.fail_safe_armed());

        state.stop().unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(mock.fail_safe_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_skips_the_nudge_when_paused_at_the_boundary() {
        let (state, mock) = state_with_mock();

        state.start("30 sec").unwrap();
        // Pause with one tick left, then resume: the nudge must wait for the
        // gate and still fire exactly once.
        sleep(Duration::from_millis(29_500)).await;
        state.pause().unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(mock.attempts(), 0);

        state.resume().unwrap();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(mock.nudge_count(), 1, "the held nudge fires on resume");

        state.stop().unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(
            state.session_state().unwrap(),
            SessionState::Idle,
            "session is idle after stop"
        );
    }
}
