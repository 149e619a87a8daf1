use glam::Vec2;

use crate::config::{ChaseConfig, PursuitVariant};

/// Coefficients for one pursuit rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PursuitParams {
    Easing {
        close_distance: f32,
        close_ease: f32,
        far_ease: f32,
    },
    Trailing {
        trail_distance: f32,
        ease: f32,
    },
}

impl PursuitParams {
    pub fn from_config(config: &ChaseConfig) -> Self {
        match config.variant {
            PursuitVariant::Easing => PursuitParams::Easing {
                close_distance: config.close_distance,
                close_ease: config.close_ease,
                far_ease: config.far_ease,
            },
            PursuitVariant::Trailing => PursuitParams::Trailing {
                trail_distance: config.trail_distance,
                ease: config.trailing_ease,
            },
        }
    }
}

/// Result of one frame of pursuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitStep {
    pub position: Vec2,
    /// Easing: the cat is close and slowing down.
    /// Trailing: the cat is closing in on its trail point.
    pub chasing: bool,
}

/// Advance the cat one frame toward `target`.
pub fn pursue(params: PursuitParams, follower: Vec2, target: Vec2) -> PursuitStep {
    let delta = target - follower;
    let distance = delta.length();

    match params {
        PursuitParams::Easing {
            close_distance,
            close_ease,
            far_ease,
        } => {
            let close = distance < close_distance;
            let ease = if close { close_ease } else { far_ease };
            PursuitStep {
                position: follower + delta * ease,
                chasing: close,
            }
        }
        PursuitParams::Trailing {
            trail_distance,
            ease,
        } => {
            if distance > trail_distance {
                let aim = trail_point(follower, target, trail_distance);
                PursuitStep {
                    position: follower + (aim - follower) * ease,
                    chasing: true,
                }
            } else {
                PursuitStep {
                    position: follower,
                    chasing: false,
                }
            }
        }
    }
}

/// The point `trail_distance` short of `target` on the line from `follower`.
pub fn trail_point(follower: Vec2, target: Vec2, trail_distance: f32) -> Vec2 {
    let delta = target - follower;
    let angle = delta.y.atan2(delta.x);
    target - Vec2::new(angle.cos(), angle.sin()) * trail_distance
}

/// Heading from `follower` to `target` in degrees. 0 when they coincide.
pub fn facing_degrees(follower: Vec2, target: Vec2) -> f32 {
    let delta = target - follower;
    delta.y.atan2(delta.x).to_degrees()
}
