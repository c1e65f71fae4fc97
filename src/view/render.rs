use wgpu::util::DeviceExt;
use wgpu::*;

use crate::controller::{FrameUniform, ObjectUniform};
use crate::math;
use crate::model::{MeshData, Scene, SceneObject};
use crate::view::GpuContext;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const CLEAR_COLOR: Color = Color { r: 0.06, g: 0.06, b: 0.08, a: 1.0 };

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: VertexFormat::Float32x3,
    }];

    fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Edge list of a mesh on the GPU, drawn as `LineList`.
pub struct GpuMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, mesh: &MeshData) -> Self {
        let vertices: Vec<Vertex> = mesh.positions.iter().map(|&pos| Vertex { pos }).collect();

        let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Mesh Edge Buffer"),
            contents: bytemuck::cast_slice(&mesh.edges),
            usage: BufferUsages::INDEX,
        });

        GpuMesh { vertex_buffer, index_buffer, index_count: mesh.edges.len() as u32 }
    }
}

/// Per-object uniform buffer and its group 1 bind group.
pub struct ObjectBinding {
    pub buffer: Buffer,
    pub bind_group: BindGroup,
}

/// What a filled scene slot holds.
pub struct GpuObject {
    pub mesh: GpuMesh,
    pub binding: ObjectBinding,
}

/// egui output for one frame, ready to paint.
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_layout(device: &Device, label: &str, visibility: ShaderStages) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_line_pipeline(
    device: &Device,
    label: &str,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    fragment_entry: &str,
    format: TextureFormat,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::LineList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Pipelines, shared uniforms, depth target and the egui renderer.
pub struct RenderState {
    depth_view: TextureView,
    frame_buffer: Buffer,
    frame_bind_group: BindGroup,
    object_layout: BindGroupLayout,
    wireframe_pipeline: RenderPipeline,
    flat_pipeline: RenderPipeline,
    grid: GpuObject,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(gpu: &GpuContext, grid: &MeshData, grid_color: [f32; 3]) -> Self {
        let device = gpu.device.as_ref();
        let (width, height) = gpu.size();
        let (_, depth_view) = create_depth_texture(device, width, height);

        let frame_layout = uniform_layout(device, "frame_bind_group_layout", ShaderStages::VERTEX);
        let object_layout = uniform_layout(
            device,
            "object_bind_group_layout",
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        );

        let frame_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("frame_buffer"),
            size: std::mem::size_of::<FrameUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        });

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("lines_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/lines.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("lines_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let wireframe_pipeline = create_line_pipeline(
            device,
            "wireframe_pipeline",
            &pipeline_layout,
            &shader,
            "fs_depth_fade",
            gpu.format,
        );
        let flat_pipeline =
            create_line_pipeline(device, "flat_pipeline", &pipeline_layout, &shader, "fs_flat", gpu.format);

        let grid = GpuObject {
            mesh: GpuMesh::upload(device, grid),
            binding: create_object_binding(
                device,
                &object_layout,
                &ObjectUniform::new(math::identity(), grid_color),
            ),
        };

        let egui_renderer =
            egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            depth_view,
            frame_buffer,
            frame_bind_group,
            object_layout,
            wireframe_pipeline,
            flat_pipeline,
            grid,
            egui_renderer,
        }
    }

    /// GPU resources for a freshly loaded mesh placed as `object`.
    pub fn upload_object(&self, device: &Device, mesh: &MeshData, object: &SceneObject) -> GpuObject {
        GpuObject {
            mesh: GpuMesh::upload(device, mesh),
            binding: create_object_binding(device, &self.object_layout, &ObjectUniform::from_object(object)),
        }
    }

    pub fn write_frame_uniform(&self, queue: &Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(uniform));
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (_, view) = create_depth_texture(device, width, height);
        self.depth_view = view;
    }

    /// Grid, every loaded object, then the egui overlay. Empty slots are skipped.
    pub fn draw_frame(
        &mut self,
        gpu: &GpuContext,
        scene: &Scene<GpuObject>,
        ui: UiFrame,
    ) -> Result<(), SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();
        let frame = gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Clear(CLEAR_COLOR), store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.frame_bind_group, &[]);

            rp.set_pipeline(&self.flat_pipeline);
            draw_object(&mut rp, &self.grid);

            rp.set_pipeline(&self.wireframe_pipeline);
            for (_, _, object) in scene.drawables() {
                draw_object(&mut rp, object);
            }
        }

        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &ui.primitives, &ui.screen);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &ui.screen);
        }

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_object_binding(device: &Device, layout: &BindGroupLayout, uniform: &ObjectUniform) -> ObjectBinding {
    let buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("object_uniform"),
        contents: bytemuck::bytes_of(uniform),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });
    ObjectBinding { buffer, bind_group }
}

fn draw_object(rp: &mut RenderPass<'_>, object: &GpuObject) {
    if object.mesh.index_count == 0 {
        return;
    }
    rp.set_bind_group(1, &object.binding.bind_group, &[]);
    rp.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
    rp.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint32);
    rp.draw_indexed(0..object.mesh.index_count, 0, 0..1);
}
