//! wgpu render backend for the orrery

use std::collections::HashMap;

use common::{
    create_index_buffer, create_uniform_buffer, create_vertex_buffer, Camera3D, GraphicsContext,
    LoadedTexture, MeshVertex, SphereMesh, TextureLoader, TextureRef,
};
use winit::{dpi::PhysicalSize, event::WindowEvent, window::Window};

use crate::backend::RenderBackend;
use crate::config::AssetConfig;
use crate::overlay::Overlay;
use crate::scene::{Light, SceneNode, SceneRoot};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shown until a body's own texture has been uploaded, or if it failed to load
const DEFAULT_TEXEL: [u8; 4] = [200, 200, 200, 255];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to acquire the next frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Per-frame uniform: camera and lights
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
}

impl FrameUniform {
    pub fn new(scene: &SceneRoot, camera: &Camera3D) -> Self {
        let ambient = scene.ambient();
        let light = scene.directional();
        let direction = light.and_then(Light::direction).unwrap_or(glam::Vec3::NEG_Y);
        let color = match light {
            Some(Light::Directional { color, intensity, .. }) => *color * *intensity,
            _ => glam::Vec3::ZERO,
        };

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            ambient: [ambient.x, ambient.y, ambient.z, 1.0],
            light_direction: [direction.x, direction.y, direction.z, 0.0],
            light_color: [color.x, color.y, color.z, 1.0],
        }
    }
}

/// Per-node uniform: placement and material flags
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl NodeUniform {
    pub fn from_node(node: &SceneNode) -> Self {
        Self {
            model: node.model_matrix().to_cols_array_2d(),
            params: [if node.sphere.lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

struct NodeResources {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: TextureRef,
    /// Bound to the real texture rather than the default one
    resolved: bool,
}

/// Draws a [`SceneRoot`]: one shared sphere mesh, one bind group per node
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,

    depth_texture: wgpu::TextureView,
    default_texture: wgpu::TextureView,
    textures: HashMap<TextureRef, wgpu::TextureView>,
    nodes: Vec<NodeResources>,
}

impl SceneRenderer {
    pub fn new(ctx: &GraphicsContext, sphere_segments: u32) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Planet Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/planet.wgsl").into()),
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let node_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Node Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Planet Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &node_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Planet Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_sphere",
                buffers: &[MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_sphere",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let mesh = SphereMesh::uv_sphere(sphere_segments, sphere_segments);
        let vertex_buffer = create_vertex_buffer(device, &mesh.vertices);
        let index_buffer = create_index_buffer(device, &mesh.indices);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Planet Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let default_texture =
            Self::create_rgba_texture(ctx, "Default Texture", 1, 1, &DEFAULT_TEXEL);
        let depth_texture = Self::create_depth_texture(device, ctx.size.width, ctx.size.height);

        Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            node_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            depth_texture,
            default_texture,
            textures: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
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

    fn create_rgba_texture(
        ctx: &GraphicsContext,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Upload a decoded image; nodes using it switch over on the next frame
    pub fn upload_texture(&mut self, ctx: &GraphicsContext, texture: TextureRef, image: &image::RgbaImage) {
        let (width, height) = image.dimensions();
        let view = Self::create_rgba_texture(ctx, "Body Texture", width, height, image.as_raw());
        self.textures.insert(texture, view);
        for node in self.nodes.iter_mut().filter(|node| node.texture == texture) {
            node.resolved = false;
        }
    }

    fn node_bind_group(&self, device: &wgpu::Device, uniform: &wgpu::Buffer, texture: TextureRef) -> (wgpu::BindGroup, bool) {
        let (view, resolved) = match self.textures.get(&texture) {
            Some(view) => (view, true),
            None => (&self.default_texture, false),
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Node Bind Group"),
            layout: &self.node_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        (bind_group, resolved)
    }

    /// Write uniforms for this frame and create GPU state for new nodes
    pub fn update(&mut self, ctx: &GraphicsContext, scene: &SceneRoot, camera: &Camera3D) {
        let frame = FrameUniform::new(scene, camera);
        ctx.queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        for (index, node) in scene.nodes().iter().enumerate() {
            let data = NodeUniform::from_node(node);

            if index >= self.nodes.len() {
                let uniform = create_uniform_buffer(&ctx.device, &data);
                let (bind_group, resolved) = self.node_bind_group(&ctx.device, &uniform, node.sphere.texture);
                self.nodes.push(NodeResources {
                    uniform,
                    bind_group,
                    texture: node.sphere.texture,
                    resolved,
                });
                continue;
            }

            if !self.nodes[index].resolved && self.textures.contains_key(&self.nodes[index].texture) {
                let (bind_group, resolved) =
                    self.node_bind_group(&ctx.device, &self.nodes[index].uniform, self.nodes[index].texture);
                self.nodes[index].bind_group = bind_group;
                self.nodes[index].resolved = resolved;
            }
            ctx.queue.write_buffer(&self.nodes[index].uniform, 0, bytemuck::cast_slice(&[data]));
        }
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for node in &self.nodes {
            pass.set_bind_group(1, &node.bind_group, &[]);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }
}

/// Whether a `width` x `height` image can be uploaded as one 2D texture
fn fits_texture_limit(width: u32, height: u32, max_side: u32) -> bool {
    width > 0 && height > 0 && width <= max_side && height <= max_side
}

/// The production [`RenderBackend`]: window surface, scene renderer, egui overlay
pub struct WgpuBackend {
    ctx: GraphicsContext,
    scene: SceneRenderer,
    overlay: Overlay,
}

impl WgpuBackend {
    pub fn new(ctx: GraphicsContext, assets: &AssetConfig) -> Self {
        let scene = SceneRenderer::new(&ctx, assets.sphere_segments);
        let overlay = Overlay::new(&ctx);
        Self { ctx, scene, overlay }
    }

    pub fn window(&self) -> &Window {
        &self.ctx.window
    }

    /// Reconfigure the surface at its current size, after it was lost
    pub fn reconfigure(&mut self) {
        let size = self.ctx.size;
        self.ctx.resize(size);
        self.scene.resize(&self.ctx.device, size.width, size.height);
    }

    /// Decode at most one queued texture and upload it.
    pub fn load_next_texture(&mut self, loader: &mut TextureLoader) {
        let Some(LoadedTexture { texture, result }) = loader.poll() else {
            return;
        };
        let max_side = self.ctx.device.limits().max_texture_dimension_2d;
        match result {
            Ok(image) if !fits_texture_limit(image.width(), image.height(), max_side) => {
                log::warn!(
                    "Texture {:?} is {}x{}, larger than the GPU limit of {}; keeping default appearance",
                    loader.path(texture),
                    image.width(),
                    image.height(),
                    max_side
                );
            }
            Ok(image) => {
                log::debug!("Uploaded texture {:?} ({}x{})", texture, image.width(), image.height());
                self.scene.upload_texture(&self.ctx, texture, &image);
            }
            Err(err) => log::warn!("{}; keeping default appearance", err),
        }
    }

    /// Offer a window event to the overlay. Returns true if egui consumed it.
    pub fn handle_overlay_event(&mut self, event: &WindowEvent) -> bool {
        self.overlay.handle_event(&self.ctx.window, event)
    }

    /// Lay out the overlay UI for the next frame
    pub fn prepare_overlay(&mut self, run_ui: impl FnMut(&egui::Context)) {
        self.overlay.prepare(&self.ctx.window, run_ui);
    }
}

impl RenderBackend for WgpuBackend {
    type Error = RenderError;

    fn set_output_size(&mut self, width: u32, height: u32) {
        self.ctx.resize(PhysicalSize::new(width, height));
        self.scene.resize(&self.ctx.device, width, height);
    }

    fn render(&mut self, scene: &SceneRoot, camera: &Camera3D) -> Result<(), RenderError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.scene.update(&self.ctx, scene, camera);

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        self.scene.render(&mut encoder, &view);
        let overlay_commands = self.overlay.paint(&self.ctx, &mut encoder, &view);

        self.ctx
            .queue
            .submit(overlay_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_or_empty_images_are_rejected() {
        assert!(fits_texture_limit(2048, 1024, 8192));
        assert!(fits_texture_limit(8192, 8192, 8192));
        assert!(!fits_texture_limit(8193, 512, 8192));
        assert!(!fits_texture_limit(512, 16384, 8192));
        assert!(!fits_texture_limit(0, 512, 8192));
    }
}
