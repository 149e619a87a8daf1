pub mod animation;

use glam::Vec2;

use self::animation::{wiggle_degrees, Mood};
use crate::game::ChaseView;

/// Scale applied to a tired cat.
const TIRED_SCALE: f32 = 0.9;
/// How much color a tired cat loses.
const TIRED_DESATURATE: f32 = 0.3;

/// Everything the renderer and HUD need to draw the cat for one frame.
/// Derived from the game state only; nothing flows back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatPose {
    /// Top-left of the sprite box: position minus half the size.
    pub origin: Vec2,
    /// Sprite center including the mood offset.
    pub center: Vec2,
    pub half_size: f32,
    /// Facing plus 90, so the sprite's "up" points at the laser.
    pub rotation_degrees: f32,
    /// Wiggle on top of `rotation_degrees`.
    pub wiggle_degrees: f32,
    pub scale: f32,
    pub desaturate: f32,
    pub alpha: f32,
    pub mood: Mood,
    pub wiggle: bool,
    pub paw_prints: bool,
    pub sleep_indicator: bool,
    pub show_energy_bar: bool,
    pub energy_percent: f32,
}

impl CatPose {
    pub fn derive(view: &ChaseView, half_size: f32, time_s: f32) -> Self {
        let tired = view.tired;
        let active_chase = view.chasing && !tired;
        let mood = Mood::from_flags(tired, view.chasing);
        let position = view.interpolated;

        Self {
            origin: position - Vec2::splat(half_size),
            center: position + Vec2::new(0.0, mood.offset_y(time_s)),
            half_size,
            rotation_degrees: view.facing_degrees + 90.0,
            wiggle_degrees: if active_chase {
                wiggle_degrees(time_s)
            } else {
                0.0
            },
            scale: if tired { TIRED_SCALE } else { 1.0 },
            desaturate: if tired { TIRED_DESATURATE } else { 0.0 },
            alpha: mood.alpha(time_s),
            mood,
            wiggle: active_chase,
            paw_prints: active_chase,
            sleep_indicator: tired,
            show_energy_bar: !tired && view.moving,
            energy_percent: view.energy_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn view(chasing: bool, tired: bool, moving: bool) -> ChaseView {
        ChaseView {
            position: Vec2::new(200.0, 150.0),
            interpolated: Vec2::new(200.0, 150.0),
            target: Vec2::new(300.0, 150.0),
            facing_degrees: 0.0,
            chasing,
            tired,
            moving,
            energy_percent: 60.0,
            phase: None,
            elapsed_chase_ms: 3200.0,
        }
    }

    #[test]
    fn geometry_follows_position_and_facing() {
        let pose = CatPose::derive(&view(false, false, false), 32.0, 0.0);
        assert_eq!(pose.origin, Vec2::new(168.0, 118.0));
        assert_relative_eq!(pose.rotation_degrees, 90.0);
        assert_eq!(pose.scale, 1.0);
    }

    #[test]
    fn chasing_cat_bounces_and_leaves_paw_prints() {
        let pose = CatPose::derive(&view(true, false, true), 32.0, 0.1);
        assert_eq!(pose.mood, Mood::Bounce);
        assert!(pose.wiggle);
        assert!(pose.paw_prints);
        assert!(!pose.sleep_indicator);
        assert!(pose.show_energy_bar);
        assert_eq!(pose.energy_percent, 60.0);
    }

    #[test]
    fn tired_cat_shrinks_greys_and_sleeps() {
        let pose = CatPose::derive(&view(true, true, false), 32.0, 0.1);
        assert_eq!(pose.mood, Mood::Pulse);
        assert_eq!(pose.scale, 0.9);
        assert_eq!(pose.desaturate, 0.3);
        assert!(pose.sleep_indicator);
        assert!(!pose.wiggle);
        assert!(!pose.paw_prints);
        assert_eq!(pose.wiggle_degrees, 0.0);
        assert!(!pose.show_energy_bar);
    }

    #[test]
    fn energy_bar_needs_movement() {
        let pose = CatPose::derive(&view(false, false, false), 32.0, 0.0);
        assert_eq!(pose.mood, Mood::Float);
        assert!(!pose.show_energy_bar);
    }
}
