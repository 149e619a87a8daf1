/// Where the cat is in its chase/rest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatiguePhase {
    /// No laser movement seen yet (or just woke up).
    Idle,
    Chasing,
    Tired,
}

/// What a fatigue tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatigueOutcome {
    Unchanged,
    Accumulated,
    /// Budget spent. Caller freezes the cat and arms the rest timer.
    BecameTired,
}

/// Counts active chase time in fixed wall-clock ticks and forces a rest
/// once the budget is spent.
#[derive(Debug, Clone)]
pub struct FatigueController {
    phase: FatiguePhase,
    elapsed_chase_ms: f64,
    /// Laser moved since the previous tick.
    moved_since_tick: bool,
    /// Energy bar stays up while this is set.
    moving: bool,
    chase_budget_ms: f64,
    tick_ms: f64,
}

impl FatigueController {
    pub fn new(chase_budget_ms: f64, tick_ms: f64) -> Self {
        Self {
            phase: FatiguePhase::Idle,
            elapsed_chase_ms: 0.0,
            moved_since_tick: false,
            moving: false,
            chase_budget_ms,
            tick_ms,
        }
    }

    /// The laser moved past the threshold. Ignored while tired.
    pub fn note_target_moved(&mut self) {
        if self.phase == FatiguePhase::Tired {
            return;
        }
        self.moved_since_tick = true;
        self.moving = true;
        if self.phase == FatiguePhase::Idle {
            log::debug!("Cat starts chasing");
            self.phase = FatiguePhase::Chasing;
        }
    }

    /// One fixed fatigue tick.
    pub fn on_tick(&mut self) -> FatigueOutcome {
        let moved = std::mem::take(&mut self.moved_since_tick);
        if self.phase != FatiguePhase::Chasing || !moved {
            return FatigueOutcome::Unchanged;
        }

        self.elapsed_chase_ms += self.tick_ms;
        if self.elapsed_chase_ms >= self.chase_budget_ms {
            log::info!(
                "Cat is tired after {:.0}ms of chasing",
                self.elapsed_chase_ms
            );
            self.phase = FatiguePhase::Tired;
            self.moving = false;
            self.elapsed_chase_ms = 0.0;
            return FatigueOutcome::BecameTired;
        }
        FatigueOutcome::Accumulated
    }

    /// Rest timer fired.
    pub fn finish_rest(&mut self) {
        if self.phase != FatiguePhase::Tired {
            return;
        }
        log::info!("Cat is rested");
        self.phase = FatiguePhase::Idle;
        self.elapsed_chase_ms = 0.0;
    }

    pub fn phase(&self) -> FatiguePhase {
        self.phase
    }

    pub fn is_tired(&self) -> bool {
        self.phase == FatiguePhase::Tired
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn elapsed_chase_ms(&self) -> f64 {
        self.elapsed_chase_ms
    }

    /// 100 when fresh, 0 when the budget is spent.
    pub fn energy_percent(&self) -> f32 {
        (100.0 - (self.elapsed_chase_ms / self.chase_budget_ms) * 100.0).max(0.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> FatigueController {
        FatigueController::new(8000.0, 100.0)
    }

    /// Tick with fresh movement each time until the controller tires.
    fn chase_until_tired(c: &mut FatigueController) -> usize {
        for n in 1..=1000 {
            c.note_target_moved();
            if c.on_tick() == FatigueOutcome::BecameTired {
                return n;
            }
        }
        panic!("never got tired");
    }

    #[test]
    fn idle_without_movement() {
        let mut c = controller();
        for _ in 0..100 {
            assert_eq!(c.on_tick(), FatigueOutcome::Unchanged);
        }
        assert_eq!(c.phase(), FatiguePhase::Idle);
        assert_eq!(c.elapsed_chase_ms(), 0.0);
        assert!(!c.is_moving());
    }

    #[test]
    fn movement_starts_the_chase() {
        let mut c = controller();
        c.note_target_moved();
        assert_eq!(c.phase(), FatiguePhase::Chasing);
        assert_eq!(c.on_tick(), FatigueOutcome::Accumulated);
        assert_eq!(c.elapsed_chase_ms(), 100.0);
    }

    #[test]
    fn still_laser_pauses_accumulation() {
        let mut c = controller();
        c.note_target_moved();
        c.on_tick();
        assert_eq!(c.on_tick(), FatigueOutcome::Unchanged);
        assert_eq!(c.elapsed_chase_ms(), 100.0);
        assert_eq!(c.phase(), FatiguePhase::Chasing);
    }

    #[test]
    fn tires_exactly_at_the_budget_and_resets() {
        let mut c = controller();
        assert_eq!(chase_until_tired(&mut c), 80);
        assert!(c.is_tired());
        assert!(!c.is_moving());
        assert_eq!(c.elapsed_chase_ms(), 0.0);
    }

    #[test]
    fn movement_while_tired_is_ignored() {
        let mut c = controller();
        chase_until_tired(&mut c);
        for _ in 0..40 {
            c.note_target_moved();
            assert_eq!(c.on_tick(), FatigueOutcome::Unchanged);
        }
        assert!(c.is_tired());
        assert!(!c.is_moving());
        assert_eq!(c.elapsed_chase_ms(), 0.0);
    }

    #[test]
    fn rest_returns_to_idle_and_chase_can_resume() {
        let mut c = controller();
        chase_until_tired(&mut c);
        c.finish_rest();
        assert_eq!(c.phase(), FatiguePhase::Idle);
        assert_eq!(chase_until_tired(&mut c), 80);
    }

    #[test]
    fn finish_rest_outside_rest_is_a_no_op() {
        let mut c = controller();
        c.note_target_moved();
        c.on_tick();
        c.finish_rest();
        assert_eq!(c.phase(), FatiguePhase::Chasing);
        assert_eq!(c.elapsed_chase_ms(), 100.0);
    }

    #[test]
    fn energy_drains_linearly() {
        let mut c = controller();
        assert_relative_eq!(c.energy_percent(), 100.0);
        for _ in 0..20 {
            c.note_target_moved();
            c.on_tick();
        }
        assert_relative_eq!(c.energy_percent(), 75.0);
        for _ in 0..40 {
            c.note_target_moved();
            c.on_tick();
        }
        assert_relative_eq!(c.energy_percent(), 25.0);
    }

    #[test]
    fn elapsed_never_decreases_while_chasing() {
        let mut c = controller();
        let mut last = 0.0;
        for i in 0..79 {
            if i % 3 != 0 {
                c.note_target_moved();
            }
            c.on_tick();
            assert!(c.elapsed_chase_ms() >= last);
            last = c.elapsed_chase_ms();
        }
    }
}
