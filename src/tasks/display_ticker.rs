//! Display refresher background tasks
//!
//! Two independent cancellable tickers per run: the countdown label
//! refresher (1 s cadence while running, 500 ms render-only cadence while
//! paused) and the elapsed-time label refresher (1 s cadence). Both exit
//! when the session returns to idle or the run token is cancelled.

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::state::{AppState, SessionState};

/// Countdown cadence while running
const RUNNING_REFRESH: Duration = Duration::from_millis(1000);
/// Countdown cadence while paused (render-only, no decrement)
const PAUSED_REFRESH: Duration = Duration::from_millis(500);

/// Countdown label refresher
pub async fn countdown_ticker_task(state: Arc<AppState>, token: CancellationToken) {
    debug!("Countdown refresher started");

    let mut cadence = RUNNING_REFRESH;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = sleep(cadence) => {}
        }
        cadence = match state.refresh_countdown() {
            Some(SessionState::Running) => RUNNING_REFRESH,
            Some(SessionState::Paused) => PAUSED_REFRESH,
            _ => break,
        };
    }

    debug!("Countdown refresher stopped");
}

/// Elapsed-time label refresher
pub async fn elapsed_ticker_task(state: Arc<AppState>, token: CancellationToken) {
    debug!("Elapsed-time refresher started");

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so refreshes land on
    // whole-second boundaries.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if state.refresh_elapsed().is_none() {
                    break;
                }
            }
        }
    }

    debug!("Elapsed-time refresher stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::input::{testing::MockNudger, Nudger};
    use crate::state::{AppState, DisplaySnapshot};

    fn state_with_mock() -> Arc<AppState> {
        let nudger: Arc<dyn Nudger> = MockNudger::new();
        AppState::new(0, "127.0.0.1".to_string(), "30 sec".to_string(), nudger)
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_decrements_once_per_second() {
        let state = state_with_mock();

        state.start("5 min").unwrap();
        sleep(Duration::from_millis(3_500)).await;

        let overview = state.overview().unwrap();
        assert_eq!(overview.remaining_seconds, Some(297));
        assert_eq!(state.display().countdown, "Next action in: 04:57");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_freezes_while_paused() {
        let state = state_with_mock();

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(5_500)).await;
        state.pause().unwrap();

        sleep(Duration::from_secs(5)).await;
        let overview = state.overview().unwrap();
        assert_eq!(overview.remaining_seconds, Some(25), "frozen while paused");
        assert_eq!(state.display().countdown, "Next action in: 25 sec");
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_renders_hh_mm_ss() {
        let state = state_with_mock();

        state.start("60 min").unwrap();
        sleep(Duration::from_millis(3_661_500)).await;

        assert_eq!(state.display().elapsed, "01:01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_counts_through_a_pause() {
        let state = state_with_mock();

        state.start("30 sec").unwrap();
        sleep(Duration::from_secs(3)).await;
        state.pause().unwrap();
        sleep(Duration::from_secs(4)).await;
        state.resume().unwrap();
        sleep(Duration::from_millis(3_500)).await;

        let elapsed = state.overview().unwrap().elapsed_seconds.unwrap();
        assert!(
            (9..=11).contains(&elapsed),
            "elapsed should count through the pause, got {elapsed}"
        );
        assert_eq!(state.display().elapsed, "00:00:10");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_updates_without_driving_any_timer() {
        let state = state_with_mock();
        let mut display_rx = state.subscribe_display();

        state.start("30 sec").unwrap();
        display_rx.changed().await.unwrap();
        assert_eq!(
            display_rx.borrow_and_update().countdown,
            "Next action in: 30 sec"
        );

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(
            display_rx.borrow_and_update().countdown,
            "Next action in: 29 sec"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refreshers_go_quiet_after_stop() {
        let state = state_with_mock();

        state.start("30 sec").unwrap();
        sleep(Duration::from_millis(2_500)).await;
        state.stop().unwrap();

        assert_eq!(state.display(), DisplaySnapshot::idle());
        sleep(Duration::from_secs(3)).await;
        assert_eq!(
            state.display(),
            DisplaySnapshot::idle(),
            "no refresher may write after stop"
        );
    }
}
