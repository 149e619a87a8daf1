use glam::Vec2;

use crate::config::MovementCheck;

/// What a single pointer sample changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerUpdate {
    /// Displacement from the last recorded sample beat the threshold.
    pub moved: bool,
    /// Tracking just went live.
    pub activated: bool,
}

/// Latest laser position plus the sample used for movement detection.
///
/// Only the newest coordinate is kept; nothing is queued.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Vec2,
    last_sample: Vec2,
    active: bool,
    threshold: f32,
    check: MovementCheck,
}

impl PointerTracker {
    pub fn new(threshold: f32, check: MovementCheck) -> Self {
        Self {
            position: Vec2::ZERO,
            last_sample: Vec2::ZERO,
            active: false,
            threshold,
            check,
        }
    }

    /// Record a new pointer coordinate. Non-finite input is dropped.
    pub fn move_to(&mut self, point: Vec2) -> PointerUpdate {
        if !point.is_finite() {
            log::warn!("Ignoring non-finite pointer sample {point:?}");
            return PointerUpdate::default();
        }

        self.position = point;
        let activated = !self.active;
        self.active = true;

        // Tracking (re)starts here; the entry point is the baseline.
        if activated {
            self.last_sample = point;
            return PointerUpdate {
                moved: false,
                activated,
            };
        }

        let moved = self.check.exceeds(point - self.last_sample, self.threshold);
        if moved {
            self.last_sample = point;
        }

        PointerUpdate { moved, activated }
    }

    /// Pointer left the tracking surface.
    pub fn leave(&mut self) {
        self.active = false;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
