pub mod fatigue;
pub mod pursuit;

use glam::Vec2;

use self::pursuit::{pursue, PursuitParams};

/// The cat. Only the frame loop moves it.
#[derive(Debug, Clone, Copy)]
pub struct FollowerState {
    pub position: Vec2,
    /// Position before the last frame step, for render interpolation.
    pub prev_position: Vec2,
    pub chasing: bool,
    pub tired: bool,
}

impl FollowerState {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            prev_position: position,
            chasing: false,
            tired: false,
        }
    }

    /// One frame of pursuit. A tired cat does not move.
    pub fn step(&mut self, params: PursuitParams, target: Vec2) {
        self.prev_position = self.position;
        if self.tired {
            return;
        }
        let step = pursue(params, self.position, target);
        self.position = step.position;
        self.chasing = step.chasing;
    }

    /// Position blended between the last two frames.
    pub fn interpolated(&self, alpha: f32) -> Vec2 {
        Vec2::lerp(self.prev_position, self.position, alpha.clamp(0.0, 1.0))
    }
}
