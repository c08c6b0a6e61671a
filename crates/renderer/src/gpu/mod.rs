//! GPU side of the canvas.
//!
//! - `context` owns the wgpu instance, surface and device, and reconfigures
//!   the swapchain on resize.
//! - `channels` uploads decoded channel images as sampled textures.
//! - `pipeline` compiles the assembled GLSL into a render pipeline.
//!
//! `GpuState` glues them together for the window loop. Everything it draws
//! comes from the [`Canvas`](crate::Canvas): the program, the bound images
//! and a fresh uniform block per frame.

mod channels;
mod context;
mod pipeline;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::canvas::Canvas;
use crate::error::CanvasError;
use crate::uniforms::ShadertoyUniforms;

use context::GpuContext;
use pipeline::{ShaderPipeline, QUAD_VERTICES};

pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: ShaderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl GpuState {
    /// Builds the surface and compiles the canvas program; fails with
    /// [`CanvasError::Compile`] when the GPU layer rejects the shader.
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        canvas: &Canvas,
    ) -> Result<Self, CanvasError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let program = canvas.program().ok_or(CanvasError::InvalidState {
            expected: "initialized",
            actual: "uninitialized",
        })?;
        let context = GpuContext::new(target, size)?;
        let device = &context.device;

        let uniforms = canvas.uniforms();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shadertoy uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ShadertoyUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut resources = Vec::new();
        for (channel, kind) in program.channels.iter().enumerate() {
            if kind.is_none() {
                continue;
            }
            let image = canvas.channel_image(channel).ok_or_else(|| CanvasError::Texture {
                channel,
                message: "no image was bound".to_string(),
            })?;
            resources.push(channels::upload_texture(
                device,
                &context.queue,
                channel,
                image,
            ));
        }

        let pipeline = ShaderPipeline::new(
            device,
            &uniform_layout,
            context.surface_format,
            program,
            resources,
        )?;

        Ok(Self {
            context,
            pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Uploads `uniforms` and draws the quad into the next swapchain image.
    pub(crate) fn render(&mut self, uniforms: &ShadertoyUniforms) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.pipeline.channel_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
