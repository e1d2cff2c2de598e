//! wgpu rendering backend.
//!
//! [`GpuState`] owns the device, the pipelines and the per-particle instance
//! buffers. Particles are drawn with two instanced calls over one buffer: the
//! leading AI slots with the cube mesh, the rest with the octahedron.

pub mod camera;
pub mod mesh;
pub mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use camera::Camera;
use mesh::{LineBatch, LineVertex, MeshAtlas, MeshRange, MeshVertex};

use crate::error::{EngineError, GpuError};
use crate::instance::{ColorRow, InstanceBuffer, MatrixRow};
use crate::scene::{SceneFrame, MASK_ALPHA};
use crate::surface::RenderSurface;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const MATRIX_ATTRIBUTES: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![6 => Float32x4];
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

/// Fixture instances: the emblem core, then the mask plane.
const FIXTURE_COUNT: u64 = 2;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light: [f32; 4],
    light_color: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Uniforms {
    fn from_scene(scene: &SceneFrame, aspect: f32) -> Self {
        let camera = scene.camera.position();
        let light_color = Vec3::from(scene.emblem.light_color);
        let fog_color = Vec3::from(scene.fog.color);
        Self {
            view_proj: scene.camera.view_proj(aspect).to_cols_array_2d(),
            camera_pos: camera.extend(1.0).to_array(),
            light: scene.light_position.extend(scene.light_intensity).to_array(),
            light_color: light_color.extend(scene.ambient).to_array(),
            fog_color: fog_color.extend(1.0).to_array(),
            fog_range: [scene.fog.near, scene.fog.far, 0.0, 0.0],
        }
    }
}

/// GPU copies of the two instance channels. Exists only between
/// `allocate` and `release`.
struct ParticleBuffers {
    matrices: wgpu::Buffer,
    colors: wgpu::Buffer,
    capacity: u32,
    ai_count: u32,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    mesh_vertices: wgpu::Buffer,
    mesh_indices: wgpu::Buffer,
    cube: MeshRange,
    octahedron: MeshRange,
    icosahedron: MeshRange,
    quad: MeshRange,
    fixture_matrices: wgpu::Buffer,
    fixture_colors: wgpu::Buffer,
    lines: LineBatch,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,
    particles: Option<ParticleBuffers>,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            PipelineKind::Mesh,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            PipelineKind::Line,
        );

        let atlas = MeshAtlas::new();
        let mesh_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&atlas.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let mesh_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&atlas.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let fixture_matrices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fixture Matrix Buffer"),
            size: FIXTURE_COUNT * std::mem::size_of::<MatrixRow>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let fixture_colors = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fixture Color Buffer"),
            size: FIXTURE_COUNT * std::mem::size_of::<ColorRow>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_capacity = 1024;
        let line_buffer = create_line_buffer(&device, line_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            mesh_vertices,
            mesh_indices,
            cube: atlas.cube,
            octahedron: atlas.octahedron,
            icosahedron: atlas.icosahedron,
            quad: atlas.quad,
            fixture_matrices,
            fixture_colors,
            lines: LineBatch::new(),
            line_buffer,
            line_capacity,
            particles: None,
        })
    }

    #[inline]
    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn write_fixtures(&self, scene: &SceneFrame) {
        let matrices: [MatrixRow; 2] = [
            scene.core.to_cols_array_2d(),
            scene.mask.to_cols_array_2d(),
        ];
        let colors: [ColorRow; 2] = [
            Vec3::from(scene.emblem.core_color).extend(1.0).to_array(),
            Vec3::from(scene.fog.color).extend(MASK_ALPHA).to_array(),
        ];
        self.queue
            .write_buffer(&self.fixture_matrices, 0, bytemuck::cast_slice(&matrices));
        self.queue
            .write_buffer(&self.fixture_colors, 0, bytemuck::cast_slice(&colors));
    }

    /// Rebuild and upload the line list, growing the buffer if needed.
    fn write_lines(&mut self, scene: &SceneFrame) -> u32 {
        let count = self.lines.rebuild(scene).len();
        if count > self.line_capacity {
            self.line_capacity = count.next_power_of_two();
            self.line_buffer = create_line_buffer(&self.device, self.line_capacity);
            log::debug!("line buffer grown to {} vertices", self.line_capacity);
        }
        self.queue.write_buffer(
            &self.line_buffer,
            0,
            bytemuck::cast_slice(self.lines.vertices()),
        );
        count as u32
    }
}

impl RenderSurface for GpuState {
    fn allocate(&mut self, capacity: usize, ai_count: usize) {
        let matrices = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Matrix Buffer"),
            size: (capacity * std::mem::size_of::<MatrixRow>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let colors = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Color Buffer"),
            size: (capacity * std::mem::size_of::<ColorRow>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.particles = Some(ParticleBuffers {
            matrices,
            colors,
            capacity: capacity as u32,
            ai_count: ai_count.min(capacity) as u32,
        });
    }

    fn upload(&mut self, instances: &InstanceBuffer) {
        let Some(particles) = &self.particles else {
            return;
        };
        if instances.len() != particles.capacity as usize {
            log::warn!(
                "instance buffer holds {} slots, gpu buffers hold {}; skipping upload",
                instances.len(),
                particles.capacity
            );
            return;
        }

        if instances.is_matrix_dirty() {
            self.queue
                .write_buffer(&particles.matrices, 0, instances.matrix_bytes());
        }
        if instances.is_color_dirty() {
            self.queue
                .write_buffer(&particles.colors, 0, instances.color_bytes());
        }
    }

    fn present(&mut self, scene: &SceneFrame) -> Result<(), EngineError> {
        let uniforms = Uniforms::from_scene(scene, self.aspect());
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.write_fixtures(scene);
        let line_count = self.write_lines(scene);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = scene.fog.color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            // Particles and fixtures share the mesh pipeline
            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_vertex_buffer(0, self.mesh_vertices.slice(..));
            render_pass.set_index_buffer(self.mesh_indices.slice(..), wgpu::IndexFormat::Uint16);

            if let Some(particles) = &self.particles {
                render_pass.set_vertex_buffer(1, particles.matrices.slice(..));
                render_pass.set_vertex_buffer(2, particles.colors.slice(..));
                if particles.ai_count > 0 {
                    render_pass.draw_indexed(
                        self.cube.indices(),
                        self.cube.base_vertex,
                        0..particles.ai_count,
                    );
                }
                if particles.capacity > particles.ai_count {
                    render_pass.draw_indexed(
                        self.octahedron.indices(),
                        self.octahedron.base_vertex,
                        particles.ai_count..particles.capacity,
                    );
                }
            }

            render_pass.set_vertex_buffer(1, self.fixture_matrices.slice(..));
            render_pass.set_vertex_buffer(2, self.fixture_colors.slice(..));
            render_pass.draw_indexed(self.icosahedron.indices(), self.icosahedron.base_vertex, 0..1);

            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
            render_pass.draw(0..line_count, 0..1);

            // The mask goes last so it blends over the grid's far edge
            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_vertex_buffer(0, self.mesh_vertices.slice(..));
            render_pass.draw_indexed(self.quad.indices(), self.quad.base_vertex, 1..2);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    fn release(&mut self) {
        if let Some(particles) = self.particles.take() {
            particles.matrices.destroy();
            particles.colors.destroy();
        }
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    Mesh,
    Line,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let mesh_buffers = [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MatrixRow>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &MATRIX_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorRow>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR_ATTRIBUTES,
        },
    ];
    let line_buffers = [wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LINE_ATTRIBUTES,
    }];

    let buffers: &[wgpu::VertexBufferLayout] = match kind {
        PipelineKind::Mesh => &mesh_buffers,
        PipelineKind::Line => &line_buffers,
    };
    let (label, vs, fs, topology, depth_write) = match kind {
        PipelineKind::Mesh => (
            "Mesh Pipeline",
            "vs_main",
            "fs_main",
            wgpu::PrimitiveTopology::TriangleList,
            true,
        ),
        PipelineKind::Line => (
            "Line Pipeline",
            "vs_line",
            "fs_line",
            wgpu::PrimitiveTopology::LineList,
            false,
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_line_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Line Vertex Buffer"),
        size: (vertices * std::mem::size_of::<LineVertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
