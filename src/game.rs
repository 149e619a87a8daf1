use glam::Vec2;

use crate::chase::fatigue::{FatigueController, FatigueOutcome, FatiguePhase};
use crate::chase::pursuit::{facing_degrees, PursuitParams};
use crate::chase::FollowerState;
use crate::config::ChaseConfig;
use crate::facts::{FactRotator, CAT_FACTS};
use crate::pointer::PointerTracker;
use crate::schedule::{Scheduler, TaskGuard};

/// Scheduled work. Session events carry the generation they belong to so a
/// stale event can never touch a newer cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Frame(u32),
    FatigueTick(u32),
    RestOver(u32),
    RotateFact,
}

/// Read-only snapshot for the presentation side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseView {
    pub position: Vec2,
    /// Position blended toward the next frame, for smooth drawing.
    pub interpolated: Vec2,
    pub target: Vec2,
    pub facing_degrees: f32,
    pub chasing: bool,
    pub tired: bool,
    pub moving: bool,
    pub energy_percent: f32,
    /// `None` for the easing cat, which never gets tired.
    pub phase: Option<FatiguePhase>,
    pub elapsed_chase_ms: f64,
}

/// One cat, alive from the first pointer movement until the pointer leaves.
/// Dropping it cancels the frame loop, fatigue tick and rest timer.
struct ChaseSession {
    generation: u32,
    follower: FollowerState,
    fatigue: Option<FatigueController>,
    last_frame_ms: f64,
    frame_task: Option<TaskGuard>,
    _fatigue_task: Option<TaskGuard>,
    rest_task: Option<TaskGuard>,
}

/// The whole toy minus the window: pointer in, cat state out.
pub struct LaserGame {
    config: ChaseConfig,
    params: PursuitParams,
    scheduler: Scheduler<GameEvent>,
    pointer: PointerTracker,
    facts: FactRotator,
    fact_task: Option<TaskGuard>,
    session: Option<ChaseSession>,
    next_generation: u32,
    torn_down: bool,
}

impl LaserGame {
    pub fn new(config: ChaseConfig, rng: fastrand::Rng) -> Self {
        let mut scheduler = Scheduler::new();
        let fact_task = scheduler.schedule_repeating(config.fact_interval_ms, GameEvent::RotateFact);

        Self {
            params: PursuitParams::from_config(&config),
            pointer: PointerTracker::new(config.movement_threshold, config.movement_check),
            facts: FactRotator::new(CAT_FACTS, rng),
            fact_task: Some(fact_task),
            scheduler,
            session: None,
            next_generation: 0,
            torn_down: false,
            config,
        }
    }

    /// Pointer moved over the surface. Mounts a cat on first activity.
    pub fn pointer_moved(&mut self, point: Vec2) {
        if self.torn_down {
            return;
        }
        let update = self.pointer.move_to(point);
        if !self.pointer.is_active() {
            return;
        }
        if update.activated {
            log::debug!("Pointer entered at {point:?}");
        }

        if self.session.is_none() {
            self.mount();
        }

        if update.moved {
            if let Some(fatigue) = self.session.as_mut().and_then(|s| s.fatigue.as_mut()) {
                fatigue.note_target_moved();
            }
        }
    }

    /// Pointer left the surface: the cat goes away with all its timers.
    pub fn pointer_left(&mut self) {
        self.pointer.leave();
        if let Some(session) = self.session.take() {
            log::info!("Pointer left, dismantling cat #{}", session.generation);
        }
    }

    fn mount(&mut self) {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let frame_task = self
            .scheduler
            .schedule_repeating(self.config.frame_interval_ms, GameEvent::Frame(generation));

        let (fatigue, fatigue_task) = if self.config.fatigue_enabled() {
            let controller =
                FatigueController::new(self.config.chase_budget_ms, self.config.fatigue_tick_ms);
            let task = self.scheduler.schedule_repeating(
                self.config.fatigue_tick_ms,
                GameEvent::FatigueTick(generation),
            );
            (Some(controller), Some(task))
        } else {
            (None, None)
        };

        log::info!(
            "Cat #{} mounted at {:?} ({} pursuit)",
            generation,
            self.config.initial_follower,
            self.config.variant.label()
        );

        self.session = Some(ChaseSession {
            generation,
            follower: FollowerState::new(self.config.initial_follower),
            fatigue,
            last_frame_ms: self.scheduler.now_ms(),
            frame_task: Some(frame_task),
            _fatigue_task: fatigue_task,
            rest_task: None,
        });
    }

    /// Move the wall clock forward and run everything that came due.
    pub fn advance(&mut self, dt_ms: f64) {
        if self.torn_down {
            return;
        }
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, self.config.max_frame_gap_ms)
        } else {
            0.0
        };
        let until = self.scheduler.now_ms() + dt;

        while let Some(event) = self.scheduler.poll(until) {
            self.handle(event);
        }
        self.scheduler.settle(until);
    }

    fn handle(&mut self, event: GameEvent) {
        let now = self.scheduler.now_ms();

        if event == GameEvent::RotateFact {
            let fact = self.facts.rotate();
            log::debug!("New fact: {fact}");
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            GameEvent::Frame(generation) if generation == session.generation => {
                session.follower.step(self.params, self.pointer.position());
                session.last_frame_ms = now;
            }
            GameEvent::FatigueTick(generation) if generation == session.generation => {
                let Some(fatigue) = session.fatigue.as_mut() else {
                    return;
                };
                if fatigue.on_tick() == FatigueOutcome::BecameTired {
                    session.follower.tired = true;
                    session.follower.prev_position = session.follower.position;
                    // Freeze the frame loop until the rest is over.
                    session.frame_task = None;
                    session.rest_task = Some(self.scheduler.schedule_once(
                        self.config.rest_duration_ms,
                        GameEvent::RestOver(generation),
                    ));
                }
            }
            GameEvent::RestOver(generation) if generation == session.generation => {
                if let Some(fatigue) = session.fatigue.as_mut() {
                    fatigue.finish_rest();
                }
                session.follower.tired = false;
                session.rest_task = None;
                session.last_frame_ms = now;
                session.frame_task = Some(self.scheduler.schedule_repeating(
                    self.config.frame_interval_ms,
                    GameEvent::Frame(generation),
                ));
            }
            stale => {
                log::debug!("Dropping stale event {stale:?}");
            }
        }
    }

    /// Snapshot of the current cat, if one is mounted.
    pub fn view(&self) -> Option<ChaseView> {
        let session = self.session.as_ref()?;
        let follower = &session.follower;
        let target = self.pointer.position();

        let alpha = ((self.scheduler.now_ms() - session.last_frame_ms)
            / self.config.frame_interval_ms) as f32;

        let (moving, energy_percent, phase, elapsed_chase_ms) = match &session.fatigue {
            Some(f) => (
                f.is_moving(),
                f.energy_percent(),
                Some(f.phase()),
                f.elapsed_chase_ms(),
            ),
            None => (false, 100.0, None, 0.0),
        };

        Some(ChaseView {
            position: follower.position,
            interpolated: follower.interpolated(alpha),
            target,
            facing_degrees: facing_degrees(follower.position, target),
            chasing: follower.chasing,
            tired: follower.tired,
            moving,
            energy_percent,
            phase,
            elapsed_chase_ms,
        })
    }

    /// Cancel every task and drop the cat. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.session = None;
        self.fact_task = None;
        self.scheduler.clear();
        self.torn_down = true;
        log::info!("Game torn down");
    }

    pub fn fact(&self) -> &'static str {
        self.facts.current()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }
}

impl Drop for LaserGame {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PursuitVariant;
    use rstest::rstest;

    fn game() -> LaserGame {
        LaserGame::new(ChaseConfig::default(), fastrand::Rng::with_seed(3))
    }

    fn easing_game() -> LaserGame {
        let config = ChaseConfig {
            variant: PursuitVariant::Easing,
            ..ChaseConfig::default()
        };
        LaserGame::new(config, fastrand::Rng::with_seed(3))
    }

    /// Laser jiggles 20px every 50ms, far from the cat.
    fn wiggle(t_ms: u64) -> Vec2 {
        Vec2::new(900.0 + ((t_ms / 50) % 2) as f32 * 20.0, 500.0)
    }

    /// Drive the game in `step_ms` chunks, wiggling the laser on every 50ms
    /// boundary, until `pred` holds. Returns the clock at that point.
    fn run_until(
        game: &mut LaserGame,
        start_ms: u64,
        step_ms: u64,
        limit_ms: u64,
        pred: impl Fn(&LaserGame) -> bool,
    ) -> Option<u64> {
        let mut t = start_ms;
        while t < limit_ms {
            if t % 50 == 0 {
                game.pointer_moved(wiggle(t));
            }
            game.advance(step_ms as f64);
            t += step_ms;
            if pred(game) {
                return Some(t);
            }
        }
        None
    }

    fn is_tired(game: &LaserGame) -> bool {
        game.view().is_some_and(|v| v.tired)
    }

    #[test]
    fn nothing_mounted_before_pointer_activity() {
        let mut g = game();
        g.advance(1000.0);
        assert!(g.view().is_none());
        assert!(!g.is_active());
        // Only the fact rotation is scheduled.
        assert_eq!(g.pending_tasks(), 1);
    }

    #[test]
    fn first_movement_mounts_cat_at_initial_position() {
        let mut g = game();
        g.pointer_moved(Vec2::new(400.0, 300.0));
        let v = g.view().unwrap();
        assert_eq!(v.position, Vec2::new(100.0, 100.0));
        assert_eq!(v.target, Vec2::new(400.0, 300.0));
        assert!(!v.tired);
        // Fact rotation + frame loop + fatigue tick.
        assert_eq!(g.pending_tasks(), 3);
    }

    #[test]
    fn cat_trails_behind_a_parked_laser() {
        let mut g = game();
        let laser = Vec2::new(700.0, 100.0);
        g.pointer_moved(laser);
        for _ in 0..200 {
            g.advance(16.0);
        }
        let v = g.view().unwrap();
        let d = v.position.distance(laser);
        assert!(d > 79.9 && d < 82.0, "expected to hang back ~80px, got {d}");
        assert!(v.facing_degrees.abs() < 1e-3);
    }

    #[rstest]
    #[case::fine(10)]
    #[case::quarter(25)]
    #[case::coarse(50)]
    fn tires_after_budget_regardless_of_step_size(#[case] step_ms: u64) {
        let mut g = game();
        let tired_at = run_until(&mut g, 0, step_ms, 20_000, is_tired);
        assert_eq!(tired_at, Some(8000));
        let v = g.view().unwrap();
        assert_eq!(v.elapsed_chase_ms, 0.0);
        assert_eq!(v.phase, Some(FatiguePhase::Tired));
        assert!(!v.moving);
    }

    #[test]
    fn tired_cat_is_frozen_for_the_rest_period() {
        let mut g = game();
        run_until(&mut g, 0, 50, 20_000, is_tired).unwrap();
        let frozen = g.view().unwrap().position;

        // Keep waving the laser right up to the end of the rest.
        let woke = run_until(&mut g, 8000, 50, 20_000, |g| !is_tired(g));
        assert_eq!(woke, Some(12_000));

        let v = g.view().unwrap();
        assert_eq!(v.position, frozen);
        assert_eq!(v.phase, Some(FatiguePhase::Idle));
        assert_eq!(v.elapsed_chase_ms, 0.0);
    }

    #[test]
    fn cat_moves_again_after_rest() {
        let mut g = game();
        run_until(&mut g, 0, 50, 20_000, is_tired).unwrap();
        run_until(&mut g, 8000, 50, 20_000, |g| !is_tired(g)).unwrap();
        let rested = g.view().unwrap().position;
        run_until(&mut g, 12_000, 50, 12_500, |_| false);
        let v = g.view().unwrap();
        assert_ne!(v.position, rested);
        assert_eq!(v.phase, Some(FatiguePhase::Chasing));
    }

    #[test]
    fn parked_laser_inside_standoff_never_drifts() {
        let mut g = game();
        let laser = Vec2::new(150.0, 100.0);
        g.pointer_moved(laser);
        for _ in 0..600 {
            g.advance(16.0);
        }
        let v = g.view().unwrap();
        assert_eq!(v.position, Vec2::new(100.0, 100.0));
        assert!(!v.chasing);
        assert!(!v.tired);
        // The mounting sample is the baseline, so nothing was ever charged.
        assert_eq!(v.phase, Some(FatiguePhase::Idle));
        assert!(!v.moving);
        assert_eq!(v.elapsed_chase_ms, 0.0);
    }

    #[test]
    fn reentering_elsewhere_is_not_movement() {
        let mut g = game();
        g.pointer_moved(Vec2::new(400.0, 300.0));
        g.advance(100.0);
        assert_eq!(g.view().unwrap().phase, Some(FatiguePhase::Idle));

        g.pointer_moved(Vec2::new(450.0, 300.0));
        g.advance(200.0);
        assert_eq!(g.view().unwrap().phase, Some(FatiguePhase::Chasing));
        g.pointer_left();

        // Far from where it left, then held still.
        g.pointer_moved(Vec2::new(10.0, 300.0));
        g.advance(500.0);
        let v = g.view().unwrap();
        assert_eq!(v.phase, Some(FatiguePhase::Idle));
        assert!(!v.moving);
        assert_eq!(v.elapsed_chase_ms, 0.0);
    }

    #[test]
    fn pointer_leave_mid_rest_cancels_all_session_tasks() {
        let mut g = game();
        run_until(&mut g, 0, 50, 20_000, is_tired).unwrap();
        g.pointer_left();
        assert!(g.view().is_none());
        assert_eq!(g.pending_tasks(), 1);

        // The rest timer would have fired here; nothing must happen.
        g.advance(250.0);
        for _ in 0..40 {
            g.advance(100.0);
        }
        assert!(g.view().is_none());

        // Coming back gives a fresh, rested cat.
        g.pointer_moved(Vec2::new(500.0, 500.0));
        let v = g.view().unwrap();
        assert!(!v.tired);
        assert_eq!(v.position, Vec2::new(100.0, 100.0));
        assert_eq!(v.elapsed_chase_ms, 0.0);
    }

    #[test]
    fn teardown_cancels_everything_and_stays_quiet() {
        let mut g = game();
        run_until(&mut g, 0, 50, 20_000, is_tired).unwrap();
        g.teardown();
        assert_eq!(g.pending_tasks(), 0);
        assert!(g.view().is_none());

        g.pointer_moved(Vec2::new(10.0, 10.0));
        g.advance(10_000.0);
        g.pointer_left();
        g.teardown();
        assert!(g.view().is_none());
        assert_eq!(g.pending_tasks(), 0);
    }

    #[test]
    fn easing_cat_never_tires() {
        let mut g = easing_game();
        g.pointer_moved(Vec2::new(600.0, 400.0));
        // Fact rotation + frame loop, no fatigue tick.
        assert_eq!(g.pending_tasks(), 2);
        let tired = run_until(&mut g, 0, 50, 20_000, is_tired);
        assert_eq!(tired, None);
        let v = g.view().unwrap();
        assert_eq!(v.energy_percent, 100.0);
        assert_eq!(v.phase, None);
    }

    #[test]
    fn easing_cat_converges_on_the_laser() {
        let mut g = easing_game();
        let laser = Vec2::new(600.0, 400.0);
        g.pointer_moved(laser);
        for _ in 0..600 {
            g.advance(16.0);
        }
        let v = g.view().unwrap();
        assert!(v.position.distance(laser) < 1.0);
        assert!(v.chasing, "easing cat flags chasing when close");
    }

    #[test]
    fn frames_follow_the_wall_clock_not_advance_calls() {
        let mut coarse = game();
        let mut fine = game();
        let laser = Vec2::new(800.0, 600.0);
        coarse.pointer_moved(laser);
        fine.pointer_moved(laser);
        for _ in 0..10 {
            coarse.advance(100.0);
        }
        for _ in 0..1000 {
            fine.advance(1.0);
        }
        let a = coarse.view().unwrap().position;
        let b = fine.view().unwrap().position;
        assert!(a.distance(b) < 1e-2, "{a:?} vs {b:?}");
    }

    #[test]
    fn huge_gaps_are_clamped() {
        let mut g = game();
        g.pointer_moved(Vec2::new(300.0, 300.0));
        g.advance(60_000.0);
        assert_eq!(g.now_ms(), 250.0);
        g.advance(f64::NAN);
        g.advance(-5.0);
        assert_eq!(g.now_ms(), 250.0);
    }

    #[test]
    fn facts_rotate_on_schedule() {
        let mut g = game();
        let first = g.fact();
        for _ in 0..20 {
            g.advance(250.0);
        }
        assert_ne!(g.fact(), first);
    }

    #[test]
    fn non_finite_pointer_does_not_mount() {
        let mut g = game();
        g.pointer_moved(Vec2::new(f32::NAN, f32::INFINITY));
        assert!(g.view().is_none());
    }
}
