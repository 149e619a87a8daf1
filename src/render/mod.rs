pub mod instance;
pub mod pipeline;

use std::sync::Arc;
use winit::window::Window;

use self::instance::SpriteInstance;
use self::pipeline::{ScreenUniform, SpriteRenderer};
use crate::error::RenderError;

/// Window background (dark slate), in linear RGB.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.012,
    g: 0.014,
    b: 0.022,
    a: 1.0,
};

/// What an overlay gets to draw with after the sprites are recorded.
pub struct OverlayTarget<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
}

/// Device, queue, surface and the sprite renderer.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    screen: ScreenUniform,
    sprites: SpriteRenderer,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {:?} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("laserchase_device"),
            ..Default::default()
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats).ok_or(RenderError::NoSurfaceFormat)?;
        let present_mode = pick_present_mode(&caps.present_modes);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface: format={format:?}, present_mode={present_mode:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let screen = ScreenUniform::new(&device, surface_config.width, surface_config.height);
        let sprites = SpriteRenderer::new(&device, format, &screen.layout);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            screen,
            sprites,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.screen.write(&self.queue, width, height);
    }

    /// Draw one frame: clear, sprites in slice order, then whatever the
    /// overlay records on top. The overlay may return extra command buffers
    /// that must be submitted before the frame's own.
    ///
    /// Skips the frame silently if the surface can't hand out a texture.
    pub fn render<F>(&mut self, sprites: &[SpriteInstance], overlay: F)
    where
        F: FnOnce(OverlayTarget<'_>) -> Vec<wgpu::CommandBuffer>,
    {
        let Some(output) = self.acquire() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sprites.upload(&self.device, &self.queue, sprites);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = begin_pass(&mut encoder, &view, "sprite_pass", wgpu::LoadOp::Clear(CLEAR_COLOR));
            pass.set_bind_group(0, &self.screen.bind_group, &[]);
            self.sprites.draw(&mut pass);
        }

        let extra = overlay(OverlayTarget {
            device: &self.device,
            queue: &self.queue,
            encoder: &mut encoder,
            view: &view,
        });

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
    }

    fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::Timeout) => None,
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                None
            }
        }
    }
}

/// Pass over the whole frame that keeps what is already drawn. The lifetime
/// is detached so egui-wgpu can take it.
pub fn overlay_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
) -> wgpu::RenderPass<'static> {
    begin_pass(encoder, view, "overlay_pass", wgpu::LoadOp::Load).forget_lifetime()
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    label: &str,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

/// sRGB if offered (colors are authored in sRGB), else the first format.
fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Mailbox doesn't block on a missed vblank; Fifo is always available.
fn pick_present_mode(modes: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if modes.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else {
        wgpu::PresentMode::Fifo
    }
}
