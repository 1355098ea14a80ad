use crate::camera::OrbitCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use headspace_assets::{HeadPart, TriangleSoup};
use headspace_scene::{LoadedScene, PointerUniform, placement};
use headspace_surface::{DecoratedGeometry, Falloff, ShadingParams};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct HeadVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SurfaceVertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
    displacement: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct SurfaceUniforms {
    model: [[f32; 4]; 4],
    light_position: [f32; 3],
    time: f32,
    pointer: [f32; 2],
    metalness: f32,
    roughness: f32,
    threshold: f32,
    push: f32,
    tint_faces: u32,
    _pad: u32,
}

impl SurfaceUniforms {
    fn new(model: Mat4, params: &ShadingParams, falloff: Falloff) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.model = model.to_cols_array_2d();
        uniforms.apply_shading(params);
        uniforms.apply_falloff(falloff);
        uniforms
    }

    fn apply_shading(&mut self, params: &ShadingParams) {
        self.light_position = params.light_position.to_array();
        self.time = params.time;
        self.metalness = params.metalness;
        self.roughness = params.roughness;
        self.tint_faces = u32::from(params.tint_faces);
    }

    fn apply_falloff(&mut self, falloff: Falloff) {
        self.threshold = falloff.threshold;
        self.push = falloff.push;
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct HeadUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    material: [f32; 4],
}

fn surface_vertices(geometry: &DecoratedGeometry) -> Vec<SurfaceVertex> {
    geometry
        .positions()
        .iter()
        .zip(geometry.normals())
        .zip(geometry.colors())
        .zip(geometry.displacements())
        .map(|(((&position, &normal), &color), &displacement)| SurfaceVertex {
            position,
            normal,
            color,
            displacement,
        })
        .collect()
}

fn head_vertices(geometry: &TriangleSoup) -> Vec<HeadVertex> {
    geometry
        .positions
        .iter()
        .zip(&geometry.normals)
        .map(|(&position, &normal)| HeadVertex { position, normal })
        .collect()
}

/// The uploaded reactive surface and its uniform state.
///
/// Uniforms are staged on the CPU and written to the GPU once per frame.
pub struct SurfaceProgram {
    uniforms: SurfaceUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl SurfaceProgram {
    pub fn set_shading(&mut self, params: &ShadingParams) {
        self.uniforms.apply_shading(params);
    }

    pub fn set_falloff(&mut self, falloff: Falloff) {
        self.uniforms.apply_falloff(falloff);
    }
}

impl PointerUniform for SurfaceProgram {
    fn set_pointer(&mut self, pointer: Vec2) {
        self.uniforms.pointer = pointer.to_array();
    }
}

struct HeadDraw {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    _uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu-based scene renderer.
pub struct SceneRenderer {
    surface_pipeline: wgpu::RenderPipeline,
    head_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    surface: Option<SurfaceProgram>,
    head_parts: Vec<HeadDraw>,
    depth_texture: wgpu::TextureView,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout =
            uniform_layout(device, "camera_bind_group_layout", wgpu::ShaderStages::VERTEX);
        let object_layout = uniform_layout(
            device,
            "object_bind_group_layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let surface_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("surface_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SURFACE_SHADER.into()),
        });
        let surface_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &surface_shader,
            PipelineSpec {
                label: "surface_pipeline",
                vertex_entry: "vs_surface",
                fragment_entry: "fs_surface",
                vertex_layout: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SurfaceVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x3,
                        3 => Float32x3,
                    ],
                },
                format: surface_format,
            },
        );

        let head_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("head_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::HEAD_SHADER.into()),
        });
        let head_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &head_shader,
            PipelineSpec {
                label: "head_pipeline",
                vertex_entry: "vs_head",
                fragment_entry: "fs_head",
                vertex_layout: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<HeadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                format: surface_format,
            },
        );

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            surface_pipeline,
            head_pipeline,
            camera_buffer,
            camera_bind_group,
            object_layout,
            surface: None,
            head_parts: Vec::new(),
            depth_texture,
        }
    }

    /// Upload loaded scene assets. Replaces anything uploaded before.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        scene: &LoadedScene,
        params: &ShadingParams,
        falloff: Falloff,
    ) {
        self.head_parts = scene
            .head
            .parts()
            .into_iter()
            .filter_map(|part| self.upload_head_part(device, part))
            .collect();

        self.surface = self.upload_surface(device, &scene.surface, params, falloff);

        tracing::info!(
            head_parts = self.head_parts.len(),
            surface_vertices = self.surface.as_ref().map_or(0, |s| s.vertex_count),
            "scene uploaded"
        );
    }

    fn upload_head_part(&self, device: &wgpu::Device, part: &HeadPart) -> Option<HeadDraw> {
        let vertices = head_vertices(&part.geometry);
        if vertices.is_empty() {
            tracing::warn!(node = %part.node, "head part has no geometry, skipping");
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("head_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let material = &part.material;
        let uniforms = HeadUniforms {
            model: placement::head_part_matrix().to_cols_array_2d(),
            base_color: material.base_color,
            material: [material.metallic, material.roughness, 0.0, 0.0],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("head_uniform_buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = self.object_bind_group(device, "head_bind_group", &uniform_buffer);

        Some(HeadDraw {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            _uniform_buffer: uniform_buffer,
            bind_group,
        })
    }

    fn upload_surface(
        &self,
        device: &wgpu::Device,
        geometry: &DecoratedGeometry,
        params: &ShadingParams,
        falloff: Falloff,
    ) -> Option<SurfaceProgram> {
        let vertices = surface_vertices(geometry);
        if vertices.is_empty() {
            tracing::warn!("surface has no geometry, skipping");
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = SurfaceUniforms::new(placement::surface().matrix(), params, falloff);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface_uniform_buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.object_bind_group(device, "surface_bind_group", &uniform_buffer);

        Some(SurfaceProgram {
            uniforms,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    fn object_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    /// The live surface program, once the scene has been uploaded.
    pub fn surface_program_mut(&mut self) -> Option<&mut SurfaceProgram> {
        self.surface.as_mut()
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame. With `reveal` false only the placeholder background
    /// is drawn.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        reveal: bool,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );
        if let Some(surface) = &self.surface {
            queue.write_buffer(&surface.uniform_buffer, 0, bytemuck::bytes_of(&surface.uniforms));
        }

        let clear = if reveal {
            // Warm backdrop standing in for the sunset environment.
            wgpu::Color {
                r: 0.55,
                g: 0.32,
                b: 0.22,
                a: 1.0,
            }
        } else {
            wgpu::Color {
                r: 0.05,
                g: 0.04,
                b: 0.05,
                a: 1.0,
            }
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
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
                ..Default::default()
            });

            if reveal {
                pass.set_bind_group(0, &self.camera_bind_group, &[]);

                pass.set_pipeline(&self.head_pipeline);
                for part in &self.head_parts {
                    pass.set_bind_group(1, &part.bind_group, &[]);
                    pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
                    pass.draw(0..part.vertex_count, 0..1);
                }

                if let Some(surface) = &self.surface {
                    pass.set_pipeline(&self.surface_pipeline);
                    pass.set_bind_group(1, &surface.bind_group, &[]);
                    pass.set_vertex_buffer(0, surface.vertex_buffer.slice(..));
                    pass.draw(0..surface.vertex_count, 0..1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

struct PipelineSpec<'a> {
    label: &'a str,
    vertex_entry: &'a str,
    fragment_entry: &'a str,
    vertex_layout: wgpu::VertexBufferLayout<'a>,
    format: wgpu::TextureFormat,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    pipeline: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(pipeline.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(pipeline.vertex_entry),
            compilation_options: Default::default(),
            buffers: &[pipeline.vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(pipeline.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: pipeline.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use headspace_assets::TriangleSoup;
    use headspace_surface::decorate;
    use rand::SeedableRng;

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<SurfaceUniforms>(), 112);
        assert_eq!(std::mem::size_of::<SurfaceUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<HeadUniforms>(), 96);
        assert_eq!(std::mem::size_of::<SurfaceVertex>(), 48);
    }

    #[test]
    fn surface_uniforms_track_params() {
        let params = ShadingParams {
            metalness: 0.8,
            tint_faces: true,
            ..ShadingParams::default()
        };
        let mut uniforms = SurfaceUniforms::new(Mat4::IDENTITY, &params, Falloff::DRAMATIC);
        assert_eq!(uniforms.light_position, [1.0, 1.0, 2.0]);
        assert_eq!(uniforms.metalness, 0.8);
        assert_eq!(uniforms.tint_faces, 1);
        assert_eq!(uniforms.threshold, 0.09);
        assert_eq!(uniforms.pointer, [0.0, 0.0]);

        uniforms.apply_falloff(Falloff::SUBTLE);
        assert_eq!(uniforms.push, 0.2);
    }

    #[test]
    fn surface_vertices_interleave_attributes() {
        let mut soup = TriangleSoup::new();
        soup.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        soup.normals = vec![Vec3::Z.to_array(); 3];
        let geometry = decorate(&soup, &mut rand::rngs::StdRng::seed_from_u64(2)).unwrap();

        let vertices = surface_vertices(&geometry);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[2].color, geometry.colors()[0]);
        assert_eq!(vertices[2].displacement, geometry.displacements()[0]);
    }
}
