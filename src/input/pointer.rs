//! Pointer-backed nudge implementation
//!
//! Tracks the live pointer position with a dedicated `rdev::listen` thread
//! and performs a small out-and-back pointer move via `rdev::simulate`.
//! While the fail-safe is armed, a nudge refuses to act if the pointer sits
//! inside a guarded screen corner.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use rdev::{listen, simulate, EventType};
use tracing::{debug, warn};

use crate::error::NudgeError;

use super::Nudger;

/// How far the pointer is moved out and back, in pixels
const NUDGE_DISTANCE_PX: f64 = 75.0;
/// Pause between the outward and the return move
const SETTLE_DELAY: Duration = Duration::from_millis(100);
/// Corner margin for the fail-safe check, in pixels
const GUARD_MARGIN_PX: f64 = 10.0;

/// Last known pointer position, fed by a background listener thread
#[derive(Clone)]
pub struct PointerTracker {
    position: Arc<Mutex<Option<(f64, f64)>>>,
}

impl PointerTracker {
    /// Spawn the listener thread and return the tracker.
    ///
    /// If the platform refuses the event hook (e.g. a headless session) the
    /// thread logs and exits; the nudger then falls back to the screen
    /// center.
    pub fn spawn() -> Self {
        let position = Arc::new(Mutex::new(None));
        let shared = Arc::clone(&position);

        thread::Builder::new()
            .name("pointer-tracker".to_string())
            .spawn(move || {
                let result = listen(move |event| {
                    if let EventType::MouseMove { x, y } = event.event_type {
                        if let Ok(mut last) = shared.lock() {
                            *last = Some((x, y));
                        }
                    }
                });
                if let Err(e) = result {
                    warn!("Pointer tracking unavailable: {:?}", e);
                }
            })
            .expect("Failed to spawn pointer tracker thread");

        Self { position }
    }

    /// Last observed pointer position, if any event has been seen yet
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position.lock().ok().and_then(|last| *last)
    }
}

/// Production [`Nudger`]: simulated pointer movement with a guarded-corner
/// fail-safe
pub struct PointerNudger {
    tracker: PointerTracker,
    fail_safe: AtomicBool,
}

impl PointerNudger {
    pub fn new(tracker: PointerTracker) -> Self {
        Self {
            tracker,
            fail_safe: AtomicBool::new(true),
        }
    }

    fn current_position(&self) -> Result<(f64, f64), NudgeError> {
        if let Some(position) = self.tracker.position() {
            return Ok(position);
        }
        // No pointer event seen yet; start from the screen center.
        let (width, height) = rdev::display_size()
            .map_err(|e| NudgeError::Simulation(format!("display size unavailable: {e:?}")))?;
        Ok((width as f64 / 2.0, height as f64 / 2.0))
    }
}

impl Nudger for PointerNudger {
    fn nudge(&self) -> Result<(), NudgeError> {
        let (x, y) = self.current_position()?;

        if self.fail_safe.load(Ordering::SeqCst) {
            let (width, height) = rdev::display_size()
                .map_err(|e| NudgeError::Simulation(format!("display size unavailable: {e:?}")))?;
            if in_guarded_corner(x, y, width as f64, height as f64, GUARD_MARGIN_PX) {
                return Err(NudgeError::FailSafeInterrupt { x, y });
            }
        }

        simulate(&EventType::MouseMove {
            x: x + NUDGE_DISTANCE_PX,
            y: y + NUDGE_DISTANCE_PX,
        })
        .map_err(|e| NudgeError::Simulation(format!("pointer move failed: {e:?}")))?;

        thread::sleep(SETTLE_DELAY);

        simulate(&EventType::MouseMove { x, y })
            .map_err(|e| NudgeError::Simulation(format!("pointer return failed: {e:?}")))?;

        debug!("Pointer nudged from ({:.0}, {:.0})", x, y);
        Ok(())
    }

    fn set_fail_safe(&self, armed: bool) {
        self.fail_safe.store(armed, Ordering::SeqCst);
    }
}

/// Whether a position sits within `margin` of any screen corner
fn in_guarded_corner(x: f64, y: f64, width: f64, height: f64, margin: f64) -> bool {
    let near_x_edge = x <= margin || x >= width - margin;
    let near_y_edge = y <= margin || y >= height - margin;
    near_x_edge && near_y_edge
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 1920.0;
    const H: f64 = 1080.0;

    #[test]
    fn corners_are_guarded() {
        assert!(in_guarded_corner(0.0, 0.0, W, H, 10.0));
        assert!(in_guarded_corner(W, 0.0, W, H, 10.0));
        assert!(in_guarded_corner(0.0, H, W, H, 10.0));
        assert!(in_guarded_corner(W - 5.0, H - 5.0, W, H, 10.0));
    }

    #[test]
    fn edges_alone_are_not_guarded() {
        assert!(!in_guarded_corner(W / 2.0, 0.0, W, H, 10.0));
        assert!(!in_guarded_corner(0.0, H / 2.0, W, H, 10.0));
    }

    #[test]
    fn interior_is_not_guarded() {
        assert!(!in_guarded_corner(W / 2.0, H / 2.0, W, H, 10.0));
        assert!(!in_guarded_corner(100.0, 100.0, W, H, 10.0));
    }
}
