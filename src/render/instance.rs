use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::cat::CatPose;

/// Shape selectors understood by `sprite.wgsl`.
pub const FRAME_CAT: u32 = 0;
pub const FRAME_LASER_DOT: u32 = 1;
pub const FRAME_LASER_GLOW: u32 = 2;
pub const FRAME_PAW: u32 = 3;
pub const FRAME_SLEEP: u32 = 4;

/// Orange tabby.
pub const CAT_COLOR: u32 = 0xFFA532FF;
pub const LASER_COLOR: u32 = 0xFF2A2AFF;

/// Laser dot diameter (px).
const LASER_DOT_SIZE: f32 = 8.0;
/// Inner glow diameter (px).
const LASER_GLOW_SIZE: f32 = 16.0;
/// Outer glow diameter (px).
const LASER_HALO_SIZE: f32 = 32.0;
/// Laser pulse period (s).
const LASER_PULSE_PERIOD: f32 = 1.0;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Sprite center in screen pixels.
    pub position: [f32; 2],
    /// Width and height in pixels.
    pub size: [f32; 2],
    /// RGBA packed as u32.
    pub color: u32,
    /// Shape index (see `FRAME_*`).
    pub frame: u32,
    /// Rotation in radians, clockwise on screen.
    pub rotation: f32,
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // size
        2 => Uint32,    // color
        3 => Uint32,    // frame
        4 => Float32,   // rotation
    ];

    /// Per-instance buffer layout matching `InstanceIn` in `sprite.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    /// The cat sprite for this frame's pose.
    pub fn cat(pose: &CatPose) -> Self {
        let side = pose.half_size * 2.0 * pose.scale;
        let color = with_alpha(desaturate(CAT_COLOR, pose.desaturate), pose.alpha);
        Self {
            position: pose.center.into(),
            size: [side, side],
            color,
            frame: FRAME_CAT,
            rotation: (pose.rotation_degrees + pose.wiggle_degrees).to_radians(),
        }
    }

    /// Laser marker: halo, glow, then the dot on top.
    pub fn laser(target: Vec2, time_s: f32) -> [Self; 3] {
        let pulse = 0.5 + 0.5 * (time_s * std::f32::consts::TAU / LASER_PULSE_PERIOD).sin();
        let make = |size: f32, alpha: f32, frame: u32| Self {
            position: target.into(),
            size: [size, size],
            color: with_alpha(LASER_COLOR, alpha),
            frame,
            rotation: 0.0,
        };
        [
            make(LASER_HALO_SIZE, 0.2 * (0.6 + 0.4 * pulse), FRAME_LASER_GLOW),
            make(LASER_GLOW_SIZE, 0.6, FRAME_LASER_GLOW),
            make(LASER_DOT_SIZE * (0.9 + 0.2 * pulse), 1.0, FRAME_LASER_DOT),
        ]
    }
}

/// Scale the alpha channel of a packed RGBA color.
pub fn with_alpha(color: u32, alpha: f32) -> u32 {
    let a = (color & 0xFF) as f32 * alpha.clamp(0.0, 1.0);
    (color & 0xFFFFFF00) | a.round() as u32
}

/// Blend a packed RGBA color toward its luminance by `amount` in [0, 1].
pub fn desaturate(color: u32, amount: f32) -> u32 {
    let amount = amount.clamp(0.0, 1.0);
    let r = ((color >> 24) & 0xFF) as f32;
    let g = ((color >> 16) & 0xFF) as f32;
    let b = ((color >> 8) & 0xFF) as f32;
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let mix = |c: f32| (c + (luma - c) * amount).round().clamp(0.0, 255.0) as u32;
    mix(r) << 24 | mix(g) << 16 | mix(b) << 8 | (color & 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ChaseView;

    #[test]
    fn instance_is_28_bytes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 28);
    }

    #[test]
    fn layout_offsets_match_fields() {
        let layout = SpriteInstance::layout();
        assert_eq!(layout.array_stride, 28);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 8, 16, 20, 24]);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn alpha_scaling_keeps_rgb() {
        assert_eq!(with_alpha(0x11223380, 0.5), 0x11223340);
        assert_eq!(with_alpha(0x112233FF, 2.0), 0x112233FF);
        assert_eq!(with_alpha(0x112233FF, 0.0), 0x11223300);
    }

    #[test]
    fn desaturate_extremes() {
        assert_eq!(desaturate(CAT_COLOR, 0.0), CAT_COLOR);
        let grey = desaturate(0xFF0000FF, 1.0);
        let (r, g, b) = ((grey >> 24) & 0xFF, (grey >> 16) & 0xFF, (grey >> 8) & 0xFF);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(grey & 0xFF, 0xFF);
    }

    #[test]
    fn cat_instance_uses_pose() {
        // Tired cat at (100, 100) facing west.
        let view = ChaseView {
            position: Vec2::new(100.0, 100.0),
            interpolated: Vec2::new(100.0, 100.0),
            target: Vec2::new(20.0, 100.0),
            facing_degrees: 180.0,
            chasing: false,
            tired: true,
            moving: false,
            energy_percent: 100.0,
            phase: None,
            elapsed_chase_ms: 0.0,
        };
        let pose = CatPose::derive(&view, 32.0, 0.0);
        assert_eq!(pose.origin, Vec2::new(68.0, 68.0));

        let inst = SpriteInstance::cat(&pose);
        assert_eq!(inst.position, [100.0, 100.0]);
        assert!((inst.size[0] - 57.6).abs() < 1e-4);
        assert!((inst.rotation - 270f32.to_radians()).abs() < 1e-5);
        assert_eq!(inst.frame, FRAME_CAT);
        assert_ne!(inst.color, CAT_COLOR);
    }

    #[test]
    fn laser_dot_is_drawn_last() {
        let parts = SpriteInstance::laser(Vec2::new(5.0, 6.0), 0.25);
        assert_eq!(parts[2].frame, FRAME_LASER_DOT);
        assert!(parts.iter().all(|p| p.position == [5.0, 6.0]));
    }
}
