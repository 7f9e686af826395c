//! Session state machine and shared application state
//!
//! `AppState` owns all mutable session state behind a single lock; the
//! transition methods are the only mutation path, so concurrent commands
//! serialize and readers never observe a half-applied transition.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::SessionError,
    input::Nudger,
    interval::{self, IntervalConfig},
    tasks::{countdown_ticker_task, elapsed_ticker_task, keep_awake_task},
};

use super::{CountdownState, DisplaySnapshot, SessionEvent, SessionState};

/// Outcome of a control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The command took effect
    Applied {
        from: SessionState,
        to: SessionState,
    },
    /// The command was invalid in the current state and had no effect
    Ignored { current: SessionState },
}

/// Everything one worker run needs, captured under the lock at start time
#[derive(Debug)]
pub struct RunContext {
    pub(crate) token: CancellationToken,
    pub(crate) gate: watch::Receiver<bool>,
    pub(crate) total_seconds: u64,
}

/// Point-in-time view of the session for the status endpoint
#[derive(Debug, Clone)]
pub struct SessionOverview {
    pub state: SessionState,
    pub interval_label: Option<String>,
    pub interval_seconds: Option<u64>,
    pub remaining_seconds: Option<u64>,
    pub elapsed_seconds: Option<u64>,
    pub worker_alive: bool,
}

/// All mutable session state, guarded by one lock
#[derive(Debug)]
struct SessionCore {
    phase: SessionState,
    interval: Option<IntervalConfig>,
    countdown: Option<CountdownState>,
    started_at: Option<Instant>,
    /// Pause gate: open (true) means the worker may proceed
    gate_tx: watch::Sender<bool>,
    /// Stop signal for the current run
    cancel: Option<CancellationToken>,
    worker: Option<JoinHandle<()>>,
    last_command: Option<String>,
    last_command_at: Option<DateTime<Utc>>,
}

impl SessionCore {
    fn new() -> Self {
        let (gate_tx, _) = watch::channel(true);
        Self {
            phase: SessionState::Idle,
            interval: None,
            countdown: None,
            started_at: None,
            gate_tx,
            cancel: None,
            worker: None,
            last_command: None,
            last_command_at: None,
        }
    }

    fn countdown_text(&self) -> String {
        match &self.countdown {
            Some(countdown) => countdown.text(self.phase),
            None => String::new(),
        }
    }

    fn note_command(&mut self, command: &str) {
        self.last_command = Some(command.to_string());
        self.last_command_at = Some(Utc::now());
    }
}

/// Main application state: the session state machine plus the channels the
/// display layer subscribes to
pub struct AppState {
    /// Self-handle for spawning tasks that outlive the caller's borrow
    me: Weak<AppState>,
    core: Mutex<SessionCore>,
    nudger: Arc<dyn Nudger>,
    default_interval: String,
    /// Rendered display strings for subscribers
    display_tx: watch::Sender<DisplaySnapshot>,
    /// Cycle/action notifications
    event_tx: broadcast::Sender<SessionEvent>,
    /// Server metadata
    start_time: std::time::Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Create a new AppState with an idle session
    pub fn new(
        port: u16,
        host: String,
        default_interval: String,
        nudger: Arc<dyn Nudger>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(100);
        let (display_tx, _) = watch::channel(DisplaySnapshot::idle());

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            core: Mutex::new(SessionCore::new()),
            nudger,
            default_interval,
            display_tx,
            event_tx,
            start_time: std::time::Instant::now(),
            port,
            host,
        })
    }

    fn core(&self) -> Result<MutexGuard<'_, SessionCore>, SessionError> {
        self.core.lock().map_err(|_| SessionError::StatePoisoned)
    }

    fn shared(&self) -> Arc<AppState> {
        self.me.upgrade().expect("AppState is only built inside an Arc")
    }

    /// Start a session with the given interval label. Valid only from Idle;
    /// a no-op from any other state. Spawns the worker and both display
    /// refreshers.
    pub fn start(&self, label: &str) -> Result<Transition, SessionError> {
        let mut core = self.core()?;
        if core.phase != SessionState::Idle {
            debug!("Start ignored, session already {}", core.phase);
            return Ok(Transition::Ignored { current: core.phase });
        }

        // Parse before touching anything so a bad label leaves the state intact.
        let interval = IntervalConfig::from_label(label)?;
        let total_seconds = interval.total_seconds;

        let token = CancellationToken::new();
        core.phase = SessionState::Running;
        core.interval = Some(interval);
        core.countdown = Some(CountdownState::new(total_seconds));
        core.started_at = Some(Instant::now());
        core.gate_tx.send_replace(true);
        core.cancel = Some(token.clone());
        core.note_command("start");

        let run = RunContext {
            token: token.clone(),
            gate: core.gate_tx.subscribe(),
            total_seconds,
        };
        let shared = self.shared();
        core.worker = Some(tokio::spawn(keep_awake_task(Arc::clone(&shared), run)));
        tokio::spawn(countdown_ticker_task(Arc::clone(&shared), token.clone()));
        tokio::spawn(elapsed_ticker_task(shared, token));

        let countdown_text = core.countdown_text();
        drop(core);

        self.display_tx.send_replace(DisplaySnapshot {
            status: "Program started. Screen will be kept active.".to_string(),
            countdown: countdown_text,
            elapsed: "00:00:00".to_string(),
        });

        info!("Session started with {:?} interval ({}s)", label, total_seconds);
        Ok(Transition::Applied {
            from: SessionState::Idle,
            to: SessionState::Running,
        })
    }

    /// Pause the running session: close the gate and freeze the countdown.
    /// Valid only from Running.
    pub fn pause(&self) -> Result<Transition, SessionError> {
        let mut core = self.core()?;
        if core.phase != SessionState::Running {
            debug!("Pause ignored, session is {}", core.phase);
            return Ok(Transition::Ignored { current: core.phase });
        }

        core.gate_tx.send_replace(false);
        core.phase = SessionState::Paused;
        core.note_command("pause");
        let countdown_text = core.countdown_text();
        drop(core);

        self.display_tx.send_modify(|snapshot| {
            snapshot.status = format!("Status: Paused ({countdown_text})");
            snapshot.countdown = countdown_text.clone();
        });

        info!("Session paused");
        Ok(Transition::Applied {
            from: SessionState::Running,
            to: SessionState::Paused,
        })
    }

    /// Resume a paused session: reopen the gate so the worker and any
    /// pending action continue. Valid only from Paused.
    pub fn resume(&self) -> Result<Transition, SessionError> {
        let mut core = self.core()?;
        if core.phase != SessionState::Paused {
            debug!("Resume ignored, session is {}", core.phase);
            return Ok(Transition::Ignored { current: core.phase });
        }

        core.phase = SessionState::Running;
        core.gate_tx.send_replace(true);
        core.note_command("resume");
        let countdown_text = core.countdown_text();
        drop(core);

        self.display_tx.send_modify(|snapshot| {
            snapshot.status = "Program resumed. Screen will be kept active.".to_string();
            snapshot.countdown = countdown_text;
        });

        info!("Session resumed");
        Ok(Transition::Applied {
            from: SessionState::Paused,
            to: SessionState::Running,
        })
    }

    /// Stop the session: cancel the run, unblock the worker, re-arm the
    /// fail-safe, and reset the display. Valid from Running or Paused.
    pub fn stop(&self) -> Result<Transition, SessionError> {
        let mut core = self.core()?;
        if core.phase == SessionState::Idle {
            debug!("Stop ignored, session already idle");
            return Ok(Transition::Ignored {
                current: SessionState::Idle,
            });
        }

        let from = core.phase;
        if let Some(token) = core.cancel.take() {
            token.cancel();
        }
        // Reopen the gate so a worker parked on it observes the stop and exits.
        core.gate_tx.send_replace(true);
        core.phase = SessionState::Idle;
        core.interval = None;
        core.countdown = None;
        core.started_at = None;
        core.note_command("stop");
        drop(core);

        // The fail-safe must be armed again before Idle is observable.
        self.nudger.set_fail_safe(true);
        self.display_tx.send_replace(DisplaySnapshot::idle());

        info!("Session stopped");
        Ok(Transition::Applied {
            from,
            to: SessionState::Idle,
        })
    }

    /// Current session phase
    pub fn session_state(&self) -> Result<SessionState, SessionError> {
        Ok(self.core()?.phase)
    }

    /// Whether the session is currently Running (not Paused, not Idle)
    pub(crate) fn is_running(&self) -> bool {
        self.core
            .lock()
            .map(|core| core.phase == SessionState::Running)
            .unwrap_or(false)
    }

    /// Whether the pause gate is open
    pub fn gate_open(&self) -> Result<bool, SessionError> {
        Ok(*self.core()?.gate_tx.borrow())
    }

    /// Whether a worker task is alive for the current run
    pub fn worker_alive(&self) -> Result<bool, SessionError> {
        Ok(self
            .core()?
            .worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished()))
    }

    /// Point-in-time session view for the status endpoint
    pub fn overview(&self) -> Result<SessionOverview, SessionError> {
        let core = self.core()?;
        Ok(SessionOverview {
            state: core.phase,
            interval_label: core.interval.as_ref().map(|i| i.label.clone()),
            interval_seconds: core.interval.as_ref().map(|i| i.total_seconds),
            remaining_seconds: core.countdown.as_ref().map(|c| c.remaining_seconds),
            elapsed_seconds: core.started_at.map(|started| started.elapsed().as_secs()),
            worker_alive: core
                .worker
                .as_ref()
                .is_some_and(|handle| !handle.is_finished()),
        })
    }

    /// Current rendered display strings
    pub fn display(&self) -> DisplaySnapshot {
        self.display_tx.borrow().clone()
    }

    /// Subscribe to display updates without driving any timer
    pub fn subscribe_display(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_tx.subscribe()
    }

    /// Subscribe to cycle/action notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// The interval label used when a start request omits one
    pub fn default_interval(&self) -> &str {
        &self.default_interval
    }

    /// The action primitive this state machine drives
    pub fn nudger(&self) -> Arc<dyn Nudger> {
        Arc::clone(&self.nudger)
    }

    /// Broadcast a session event; having no subscribers is fine
    pub(crate) fn notify(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No session event subscribers");
        }
    }

    /// Fresh-cycle bookkeeping for the worker: reset the countdown while
    /// running, re-render the countdown text, and notify subscribers.
    pub(crate) fn begin_cycle(&self) {
        let Ok(mut core) = self.core.lock() else {
            warn!("Failed to lock session state for cycle start");
            return;
        };
        let running = core.phase == SessionState::Running;
        let mut total_seconds = 0;
        if running {
            if let Some(countdown) = core.countdown.as_mut() {
                countdown.reset();
                total_seconds = countdown.total_seconds;
            }
        }
        let countdown_text = core.countdown_text();
        drop(core);

        self.display_tx
            .send_modify(|snapshot| snapshot.countdown = countdown_text);
        if running {
            self.notify(SessionEvent::CycleStarted { total_seconds });
        }
    }

    /// One countdown display tick: decrement while running, render always.
    /// Returns the phase that should drive the next refresh cadence, or
    /// `None` when the refresher should exit.
    pub(crate) fn refresh_countdown(&self) -> Option<SessionState> {
        let Ok(mut core) = self.core.lock() else {
            warn!("Failed to lock session state for countdown refresh");
            return None;
        };
        let phase = core.phase;
        match phase {
            SessionState::Idle => return None,
            SessionState::Running => {
                if let Some(countdown) = core.countdown.as_mut() {
                    countdown.decrement();
                }
            }
            SessionState::Paused => {}
        }
        let countdown_text = core.countdown_text();
        drop(core);

        self.display_tx
            .send_modify(|snapshot| snapshot.countdown = countdown_text);
        Some(phase)
    }

    /// One elapsed-time display tick. Returns `None` when the refresher
    /// should exit.
    pub(crate) fn refresh_elapsed(&self) -> Option<SessionState> {
        let Ok(core) = self.core.lock() else {
            warn!("Failed to lock session state for elapsed refresh");
            return None;
        };
        if core.phase == SessionState::Idle {
            return None;
        }
        let phase = core.phase;
        let elapsed_seconds = core
            .started_at
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0);
        drop(core);

        self.display_tx
            .send_modify(|snapshot| snapshot.elapsed = interval::format_elapsed(elapsed_seconds));
        Some(phase)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information
    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.core.lock() {
            Ok(core) => (core.last_command.clone(), core.last_command_at),
            Err(_) => (None, None),
        }
    }
}
