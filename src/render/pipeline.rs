use wgpu::util::DeviceExt;

use super::instance::SpriteInstance;

/// Vertices per sprite; the quad corners come from `vertex_index`.
const VERTS_PER_SPRITE: u32 = 6;
/// Starting instance capacity. The buffer doubles when a frame needs more.
const INITIAL_CAPACITY: usize = 64;

/// Instanced sprite renderer: one pipeline, one growable instance buffer.
pub struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    capacity: usize,
    len: u32,
}

impl SpriteRenderer {
    /// `screen_layout` is the bind group layout of the screen-size uniform
    /// owned by the caller (group 0).
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        screen_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[screen_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    // The shader outputs premultiplied color.
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Rotated 2D quads: winding varies, so no culling.
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            instances: instance_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            len: 0,
        }
    }

    /// Upload this frame's sprites, growing the buffer when it is too small.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, sprites: &[SpriteInstance]) {
        let needed = grown_capacity(self.capacity, sprites.len());
        if needed != self.capacity {
            log::debug!("Sprite buffer grows {} -> {}", self.capacity, needed);
            self.instances = instance_buffer(device, needed);
            self.capacity = needed;
        }

        self.len = sprites.len() as u32;
        if !sprites.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(sprites));
        }
    }

    /// Record the draw. The screen bind group must already be set at group 0.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.len == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..VERTS_PER_SPRITE, 0..self.len);
    }
}

fn instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite_instances"),
        size: (capacity * std::mem::size_of::<SpriteInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Capacity after fitting `len` sprites: unchanged if they fit, else doubled
/// until they do.
fn grown_capacity(capacity: usize, len: usize) -> usize {
    let mut cap = capacity.max(1);
    while cap < len {
        cap *= 2;
    }
    cap
}

/// Screen size in pixels, read by the vertex shader to map to clip space.
pub struct ScreenUniform {
    buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl ScreenUniform {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen_size"),
            contents: bytemuck::cast_slice(&[width as f32, height as f32]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("screen_size_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("screen_size_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[width as f32, height as f32]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fits(64, 10, 64)]
    #[case::exact(64, 64, 64)]
    #[case::one_over(64, 65, 128)]
    #[case::far_over(64, 300, 512)]
    #[case::empty(64, 0, 64)]
    fn capacity_doubles_only_when_needed(
        #[case] capacity: usize,
        #[case] len: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(grown_capacity(capacity, len), expected);
    }
}
