use winit::window::Window;

use crate::cat::CatPose;
use crate::chase::fatigue::FatiguePhase;
use crate::render::{overlay_pass, GpuState, OverlayTarget};

/// Per-frame data the overlay draws from. Built by the app, read-only here.
pub struct HudSnapshot {
    pub active: bool,
    pub pose: Option<CatPose>,
    pub fact: &'static str,
    pub variant: &'static str,
    pub phase: Option<FatiguePhase>,
    pub elapsed_chase_ms: f64,
    pub pending_tasks: usize,
    pub particles: usize,
    pub fps: f64,
    pub time_s: f32,
}

/// Text panels drawn with egui on top of the sprites.
pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    /// F12 stats panel.
    pub stats_visible: bool,
}

impl HudOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            stats_visible: false,
        }
    }

    pub fn toggle_stats(&mut self) {
        self.stats_visible = !self.stats_visible;
        log::debug!("Stats panel visible: {}", self.stats_visible);
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// Run the egui frame and produce paint output.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        snapshot: &HudSnapshot,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let stats_visible = self.stats_visible;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, snapshot, stats_visible);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers, then record the overlay pass.
    /// Returns egui's own command buffers, which must be submitted first.
    pub fn paint(
        &mut self,
        target: OverlayTarget<'_>,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(target.device, target.queue, *id, image_delta);
        }

        let cmd_bufs = self.egui_renderer.update_buffers(
            target.device,
            target.queue,
            target.encoder,
            primitives,
            screen_descriptor,
        );

        let mut pass = overlay_pass(target.encoder, target.view);
        self.egui_renderer
            .render(&mut pass, primitives, screen_descriptor);

        cmd_bufs
    }

    /// Free textures the last frame released.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

fn panel_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(28, 30, 40, 205))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(70)))
        .corner_radius(8.0)
        .inner_margin(12.0)
}

fn draw_ui(ctx: &egui::Context, s: &HudSnapshot, stats_visible: bool) {
    let text = egui::Color32::from_gray(230);
    let muted = egui::Color32::from_gray(150);

    // --- Title ---
    egui::Area::new(egui::Id::new("title"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 32.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Laser Chase").size(36.0).strong().color(text));
                ui.label(
                    egui::RichText::new("Move your mouse to control the laser pointer!")
                        .color(muted),
                );
            });
        });

    // --- Instructions until the cat shows up ---
    if !s.active {
        let pulse = 0.6 + 0.4 * (s.time_s * std::f32::consts::PI).sin().abs();
        egui::Area::new(egui::Id::new("instructions"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -32.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Start moving your mouse to begin!")
                        .size(18.0)
                        .color(egui::Color32::from_rgba_unmultiplied(
                            255,
                            120,
                            90,
                            (pulse * 255.0) as u8,
                        )),
                );
            });
    }

    // --- Energy bar ---
    if let Some(pose) = s.pose.filter(|p| p.show_energy_bar) {
        egui::Area::new(egui::Id::new("energy"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(32.0, 80.0))
            .interactable(false)
            .show(ctx, |ui| {
                panel_frame().show(ui, |ui| {
                    ui.label(egui::RichText::new("Cat Energy").small().color(muted));
                    ui.add(
                        egui::ProgressBar::new(pose.energy_percent / 100.0)
                            .desired_width(96.0)
                            .fill(egui::Color32::from_rgb(255, 120, 60)),
                    );
                });
            });
    }

    // --- Fact panel ---
    egui::Area::new(egui::Id::new("fact"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-32.0, -32.0))
        .interactable(false)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_max_width(300.0);
                ui.label(egui::RichText::new("Did you know?").strong().color(text));
                ui.label(egui::RichText::new(s.fact).color(muted));
            });
        });

    if !stats_visible {
        return;
    }

    // --- Stats (F12) ---
    egui::Window::new("Stats")
        .default_pos([10.0, 200.0])
        .default_width(240.0)
        .resizable(false)
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(text);
            ui.label(format!("FPS: {:.1}", s.fps));
            ui.label(format!("Pursuit: {}", s.variant));
            let phase = match s.phase {
                Some(p) => format!("{p:?}"),
                None if s.active => "No fatigue".to_owned(),
                None => "Waiting".to_owned(),
            };
            ui.label(format!("Phase: {phase}"));
            ui.label(format!("Chase time: {:.0}ms", s.elapsed_chase_ms));
            if let Some(pose) = &s.pose {
                ui.label(format!("Mood: {:?}", pose.mood));
                ui.label(format!("Cat box: ({:.0}, {:.0})", pose.origin.x, pose.origin.y));
                ui.label(format!("Heading: {:.0}°", pose.rotation_degrees - 90.0));
            }
            ui.label(format!("Scheduled tasks: {}", s.pending_tasks));
            ui.label(format!("Particles: {}", s.particles));
            ui.add_space(4.0);
            ui.label("F12: Toggle | ESC: Quit");
        });
}
