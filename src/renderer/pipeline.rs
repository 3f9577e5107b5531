//! WebGPU surface, pipeline and per-frame vertex upload
//!
//! The scene is rebuilt every frame in play-field pixels. Vertices are
//! mapped to NDC here and written into a reusable buffer that only grows.

use thiserror::Error;

use super::vertex::{Vertex, colors};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

/// Smallest vertex buffer ever allocated
const MIN_VERTEX_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// GPU state for drawing the play field
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    /// Vertices the current buffer can hold
    vertex_capacity: usize,
    /// Scratch space for NDC vertices, kept across frames
    staging: Vec<Vertex>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("duel-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let caps = surface.get_capabilities(adapter);
        let format = preferred_format(&caps.formats).ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = surface_config(format, alpha_mode, width, height);
        surface.configure(&device, &config);
        log::info!("Surface configured: {format:?} {width}x{height}");

        let pipeline = field_pipeline(&device, format);
        let vertex_capacity = vertex_capacity(0);
        let vertex_buffer = vertex_buffer(&device, vertex_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_capacity,
            staging: Vec::with_capacity(vertex_capacity),
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Convert play-field pixels to normalized device coordinates.
    /// The field keeps its aspect ratio and is letterboxed into the viewport.
    pub fn game_to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        field_to_ndc(self.size, x, y)
    }

    /// Map `vertices` to NDC and copy them into the vertex buffer,
    /// growing it first if the frame does not fit
    fn upload(&mut self, vertices: &[Vertex]) {
        let size = self.size;
        self.staging.clear();
        self.staging.extend(vertices.iter().map(|v| {
            let (x, y) = field_to_ndc(size, v.position[0], v.position[1]);
            Vertex::new(x, y, v.color)
        }));

        if self.staging.len() > self.vertex_capacity {
            self.vertex_capacity = vertex_capacity(self.staging.len());
            log::debug!("Growing vertex buffer to {} vertices", self.vertex_capacity);
            self.vertex_buffer = vertex_buffer(&self.device, self.vertex_capacity);
        }
        if !self.staging.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.staging));
        }
    }

    /// Draw one frame of field-space vertices over the background
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        self.upload(vertices);
        let count = self.staging.len() as u32;
        let bytes = (self.staging.len() * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("field_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(colors::BACKGROUND)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..bytes));
                pass.draw(0..count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// First sRGB format, else whatever the surface lists first
fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

fn surface_config(
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

/// Alpha-blended triangle list pipeline; the shader passes NDC through
fn field_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("field_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("field_layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("field_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("field_vertices"),
        size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Buffer capacity for a frame of `len` vertices
fn vertex_capacity(len: usize) -> usize {
    len.next_power_of_two().max(MIN_VERTEX_CAPACITY)
}

fn clear_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: 1.0,
    }
}

/// Field origin is top-left with y down; NDC is centered with y up
fn field_to_ndc((w, h): (u32, u32), x: f32, y: f32) -> (f32, f32) {
    let nx = x / FIELD_WIDTH * 2.0 - 1.0;
    let ny = 1.0 - y / FIELD_HEIGHT * 2.0;

    let viewport_aspect = w.max(1) as f32 / h.max(1) as f32;
    let field_aspect = FIELD_WIDTH / FIELD_HEIGHT;
    if viewport_aspect > field_aspect {
        // Wider than the field: pillarbox
        (nx * field_aspect / viewport_aspect, ny)
    } else {
        // Taller than the field: letterbox
        (nx, ny * viewport_aspect / field_aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn test_vertex_capacity_grows_in_powers_of_two() {
        assert_eq!(vertex_capacity(0), MIN_VERTEX_CAPACITY);
        assert_eq!(vertex_capacity(1024), 1024);
        assert_eq!(vertex_capacity(1025), 2048);
        assert_eq!(vertex_capacity(5000), 8192);
        for len in [1, 700, 3000, 70_000] {
            assert!(vertex_capacity(len) >= len);
        }
    }

    #[test]
    fn test_prefers_srgb_format() {
        use wgpu::TextureFormat as F;
        assert_eq!(
            preferred_format(&[F::Bgra8Unorm, F::Bgra8UnormSrgb]),
            Some(F::Bgra8UnormSrgb)
        );
        assert_eq!(preferred_format(&[F::Rgba8Unorm]), Some(F::Rgba8Unorm));
        assert_eq!(preferred_format(&[]), None);
    }

    #[test]
    fn test_clear_color_is_opaque() {
        let c = clear_color(colors::with_alpha(colors::BACKGROUND, 0.2));
        assert_eq!(c.a, 1.0);
        assert!((c.r - colors::BACKGROUND[0] as f64).abs() < 1e-9);
    }

    #[test]
    fn test_matching_aspect_fills_viewport() {
        assert!(approx(field_to_ndc((800, 600), 0.0, 0.0), (-1.0, 1.0)));
        assert!(approx(
            field_to_ndc((1600, 1200), FIELD_WIDTH, FIELD_HEIGHT),
            (1.0, -1.0)
        ));
        assert!(approx(field_to_ndc((800, 600), 400.0, 300.0), (0.0, 0.0)));
    }

    #[test]
    fn test_wide_viewport_pillarboxes() {
        // 16:9 viewport, 4:3 field
        let (x, y) = field_to_ndc((1600, 900), FIELD_WIDTH, 0.0);
        assert!((x - 0.75).abs() < 1e-5);
        assert!((y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tall_viewport_letterboxes() {
        let (x, y) = field_to_ndc((600, 800), 0.0, FIELD_HEIGHT);
        assert!((x + 1.0).abs() < 1e-5);
        assert!((y + 0.5625).abs() < 1e-5);
    }
}
