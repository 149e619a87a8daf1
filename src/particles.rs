use glam::Vec2;

use crate::cat::CatPose;
use crate::render::instance::{with_alpha, SpriteInstance, FRAME_PAW, FRAME_SLEEP};

/// Maximum concurrent particles.
const MAX_PARTICLES: usize = 256;
/// Paw prints per second while chasing.
const PAW_RATE: f32 = 6.0;
/// Sleep marks per second while tired.
const SLEEP_RATE: f32 = 1.2;

/// A paw print left behind or a sleep mark drifting up.
#[derive(Debug, Clone, Copy)]
struct Particle {
    pos: Vec2,
    vel: Vec2,
    lifetime: f32,
    max_lifetime: f32,
    color: u32,
    size: f32,
    rotation: f32,
    frame: u32,
}

/// Cosmetic particles around the cat.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Alternates left/right paw.
    left_paw: bool,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            left_paw: false,
        }
    }

    /// Spawn particles for the current pose.
    pub fn spawn_from_pose(&mut self, pose: &CatPose, rng: &mut fastrand::Rng, dt: f32) {
        let facing = (pose.rotation_degrees - 90.0).to_radians();
        let forward = Vec2::new(facing.cos(), facing.sin());

        if pose.paw_prints && rng.f32() < PAW_RATE * dt {
            self.left_paw = !self.left_paw;
            let side = if self.left_paw { 1.0 } else { -1.0 };
            let lateral = forward.perp() * side * pose.half_size * 0.25;
            self.push(Particle {
                pos: pose.center - forward * pose.half_size * 0.9 + lateral,
                vel: Vec2::ZERO,
                lifetime: 1.0,
                max_lifetime: 1.0,
                color: 0xF08C28CC, // orange, semi-transparent
                size: 7.0 + rng.f32() * 2.0,
                rotation: facing + std::f32::consts::FRAC_PI_2,
                frame: FRAME_PAW,
            });
        }

        if pose.sleep_indicator && rng.f32() < SLEEP_RATE * dt {
            let lifetime = 1.5 + rng.f32() * 1.0;
            self.push(Particle {
                pos: pose.center
                    + Vec2::new(rng.f32() * 10.0 - 5.0, -pose.half_size - 8.0),
                vel: Vec2::new(rng.f32() * 20.0 - 10.0, -30.0 - rng.f32() * 20.0),
                lifetime,
                max_lifetime: lifetime,
                color: 0x6688CCCC, // soft blue
                size: 12.0 + rng.f32() * 6.0,
                rotation: 0.0,
                frame: FRAME_SLEEP,
            });
        }
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() < MAX_PARTICLES {
            self.particles.push(particle);
        }
    }

    /// Update all particles: move, age, remove dead.
    pub fn update(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.pos += p.vel * dt;
            p.vel *= 1.0 - 2.0 * dt; // drag
            p.lifetime -= dt;

            if p.lifetime <= 0.0 {
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Drop everything (the cat went away).
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Append particle instances to the render buffer.
    pub fn build_instances(&self, buf: &mut Vec<SpriteInstance>) {
        for p in &self.particles {
            // Ease out: fade faster near death
            let frac = (p.lifetime / p.max_lifetime).clamp(0.0, 1.0);
            buf.push(SpriteInstance {
                position: p.pos.into(),
                size: [p.size, p.size],
                color: with_alpha(p.color, frac * frac),
                frame: p.frame,
                rotation: p.rotation,
            });
        }
    }

    /// Number of active particles.
    pub fn count(&self) -> usize {
        self.particles.len()
    }
}
