//! A wgpu-backed implementation of the host's paint context.
//!
//! The effect speaks fixed-function-style immediate mode; this backend
//! records every call into retained draw commands (CPU matrix stack, state
//! snapshots) and replays them as wgpu render passes at the end of the
//! frame. `clear_depth` becomes a pass boundary with a depth-only clear,
//! matching the backdrop pass's contract.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use terra_geom::SphereVertex;
use terra_host::{
    BlendMode, Capability, ContextError, DrawListId, LightParams, PaintContext, ProgramId,
    StateMask, TextureId,
};
use wgpu::util::DeviceExt;

use crate::pipelines::{DrawUniforms, PipelineKind, Pipelines};

/// A texture with its ready-to-bind group.
struct GpuTexture {
    bind_group: wgpu::BindGroup,
}

/// A retained mesh (one per draw list).
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Capability toggles mirrored from the fixed-function model.
#[derive(Clone, Copy, Default)]
struct CapFlags {
    lighting: bool,
    aux_light: bool,
}

impl CapFlags {
    fn set(&mut self, capability: Capability, on: bool) {
        match capability {
            Capability::Lighting => self.lighting = on,
            Capability::AuxLight => self.aux_light = on,
            // Depth test, blending, and color material are folded into the
            // pipelines; the toggles are accepted and ignored.
            Capability::DepthTest | Capability::Blend | Capability::ColorMaterial => {}
        }
    }
}

/// The light configuration captured when `set_light` ran.
#[derive(Clone, Copy)]
struct LightSnapshot {
    direction: Vec3,
    ambient: [f32; 4],
    diffuse: [f32; 4],
}

impl Default for LightSnapshot {
    fn default() -> Self {
        Self {
            direction: Vec3::Y,
            ambient: [0.2; 4],
            diffuse: [1.0; 4],
        }
    }
}

/// Mutable drawing state between commands.
#[derive(Clone)]
struct DrawState {
    blend: BlendMode,
    caps: CapFlags,
    bound: [Option<TextureId>; 2],
    program: Option<ProgramId>,
    light: LightSnapshot,
    material: LightParams,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            blend: BlendMode::Replace,
            caps: CapFlags::default(),
            bound: [None; 2],
            program: None,
            light: LightSnapshot::default(),
            material: LightParams::default(),
        }
    }
}

/// One recorded frame command.
enum FrameCmd {
    Draw {
        list: DrawListId,
        kind: PipelineKind,
        textures: [Option<TextureId>; 2],
        uniforms: DrawUniforms,
    },
    ClearDepth,
}

/// Recording paint context that replays onto wgpu at frame end.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,

    textures: HashMap<TextureId, GpuTexture>,
    meshes: HashMap<DrawListId, GpuMesh>,
    next_texture: u64,
    next_list: u64,
    next_program: u64,
    programs: Vec<ProgramId>,

    matrix_stack: Vec<Mat4>,
    state: DrawState,
    state_stack: Vec<(StateMask, DrawState)>,
    commands: Vec<FrameCmd>,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let pipelines = Pipelines::new(&device, surface_format, depth_format);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            device,
            queue,
            pipelines,
            sampler,
            textures: HashMap::new(),
            meshes: HashMap::new(),
            next_texture: 1,
            next_list: 1,
            next_program: 1,
            programs: Vec::new(),
            matrix_stack: vec![Mat4::IDENTITY],
            state: DrawState::default(),
            state_stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Reset per-frame recording state. Call before dispatching the hooks.
    pub fn begin_frame(&mut self) {
        self.matrix_stack.clear();
        self.matrix_stack.push(Mat4::IDENTITY);
        self.state = DrawState::default();
        self.state_stack.clear();
        self.commands.clear();
    }

    fn current_matrix(&mut self) -> &mut Mat4 {
        self.matrix_stack
            .last_mut()
            .expect("matrix stack never empty")
    }

    fn record_draw(&mut self, list: DrawListId) {
        let model = *self.current_matrix();
        let state = &self.state;

        let kind = if state.program.is_some() && state.bound[0].is_some() && state.bound[1].is_some()
        {
            PipelineKind::DayNight
        } else if state.bound[0].is_some() {
            match state.blend {
                BlendMode::Replace => PipelineKind::TexturedReplace,
                BlendMode::Alpha => PipelineKind::TexturedAlpha,
            }
        } else {
            PipelineKind::Solid
        };

        let lit = state.caps.lighting && state.caps.aux_light;
        let light_dir = state.light.direction;
        let uniforms = DrawUniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(), // patched in flush
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            light_dir: [
                light_dir.x,
                light_dir.y,
                light_dir.z,
                if lit { 1.0 } else { 0.0 },
            ],
            light_ambient: state.light.ambient,
            light_diffuse: state.light.diffuse,
            material_ambient: state.material.ambient,
            material_diffuse: state.material.diffuse,
        };

        self.commands.push(FrameCmd::Draw {
            list,
            kind,
            textures: state.bound,
            uniforms,
        });
    }

    /// Replay the recorded frame into render passes.
    ///
    /// `ClearDepth` commands split the frame into passes; each new pass
    /// clears depth only, so backdrop geometry never occludes the scene.
    pub fn flush(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        view_proj: Mat4,
        clear_color: wgpu::Color,
    ) {
        struct Prepared {
            bind_group: wgpu::BindGroup,
            list: DrawListId,
            kind: PipelineKind,
            textures: [Option<TextureId>; 2],
        }

        // Segment the command list on depth-clear boundaries and build the
        // per-draw uniform resources up front.
        let mut segments: Vec<Vec<Prepared>> = vec![Vec::new()];
        for command in self.commands.drain(..) {
            match command {
                FrameCmd::ClearDepth => segments.push(Vec::new()),
                FrameCmd::Draw {
                    list,
                    kind,
                    textures,
                    mut uniforms,
                } => {
                    uniforms.view_proj = view_proj.to_cols_array_2d();
                    let buffer =
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("draw-uniforms"),
                                contents: bytemuck::bytes_of(&uniforms),
                                usage: wgpu::BufferUsages::UNIFORM,
                            });
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("draw-uniforms-bg"),
                        layout: &self.pipelines.uniform_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        }],
                    });
                    segments.last_mut().expect("segments never empty").push(Prepared {
                        bind_group,
                        list,
                        kind,
                        textures,
                    });
                }
            }
        }

        for (index, segment) in segments.iter().enumerate() {
            let color_load = if index == 0 {
                wgpu::LoadOp::Clear(clear_color)
            } else {
                wgpu::LoadOp::Load
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("globe-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in segment {
                let Some(mesh) = self.meshes.get(&draw.list) else {
                    continue;
                };

                pass.set_pipeline(self.pipelines.get(draw.kind));
                pass.set_bind_group(0, &draw.bind_group, &[]);

                match draw.kind {
                    PipelineKind::Solid => {}
                    PipelineKind::TexturedReplace | PipelineKind::TexturedAlpha => {
                        let Some(base) =
                            draw.textures[0].and_then(|id| self.textures.get(&id))
                        else {
                            continue;
                        };
                        pass.set_bind_group(1, &base.bind_group, &[]);
                    }
                    PipelineKind::DayNight => {
                        let (Some(day), Some(night)) = (
                            draw.textures[0].and_then(|id| self.textures.get(&id)),
                            draw.textures[1].and_then(|id| self.textures.get(&id)),
                        ) else {
                            continue;
                        };
                        pass.set_bind_group(1, &day.bind_group, &[]);
                        pass.set_bind_group(2, &night.bind_group, &[]);
                    }
                }

                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }
}

impl PaintContext for WgpuBackend {
    fn shading_supported(&self) -> bool {
        true
    }

    fn push_state(&mut self, mask: StateMask) {
        // This backend snapshots the full draw state; the mask is kept for
        // symmetry with hosts that restore selectively.
        self.state_stack.push((mask, self.state.clone()));
    }

    fn pop_state(&mut self) {
        if let Some((_, saved)) = self.state_stack.pop() {
            self.state = saved;
        } else {
            tracing::warn!("pop_state without matching push_state");
        }
    }

    fn push_matrix(&mut self) {
        let top = *self.current_matrix();
        self.matrix_stack.push(top);
    }

    fn pop_matrix(&mut self) {
        if self.matrix_stack.len() > 1 {
            self.matrix_stack.pop();
        } else {
            tracing::warn!("pop_matrix would empty the stack");
        }
    }

    fn load_matrix(&mut self, matrix: Mat4) {
        *self.current_matrix() = matrix;
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        let top = self.current_matrix();
        *top *= Mat4::from_translation(Vec3::new(x, y, z));
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        let top = self.current_matrix();
        *top *= Mat4::from_scale(Vec3::new(x, y, z));
    }

    fn rotate(&mut self, angle_deg: f32, x: f32, y: f32, z: f32) {
        let axis = Vec3::new(x, y, z);
        if axis.length_squared() < f32::EPSILON {
            return;
        }
        let rotation = Mat4::from_axis_angle(axis.normalize(), angle_deg.to_radians());
        let top = self.current_matrix();
        *top *= rotation;
    }

    fn enable(&mut self, capability: Capability) {
        self.state.caps.set(capability, true);
    }

    fn disable(&mut self, capability: Capability) {
        self.state.caps.set(capability, false);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_light(&mut self, params: &LightParams) {
        // Fixed-function semantics: the position is transformed by the
        // matrix in effect at set time. w = 0 keeps it directional.
        let transformed = *self.current_matrix() * Vec4::from_array(params.position);
        let direction = transformed.truncate();
        self.state.light = LightSnapshot {
            direction: direction.normalize_or(Vec3::Y),
            ambient: params.ambient,
            diffuse: params.diffuse,
        };
    }

    fn set_material(&mut self, params: &LightParams) {
        self.state.material = *params;
    }

    fn upload_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureId, ContextError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ContextError::Texture(format!(
                "bad texture data: {len} bytes for {width}x{height}",
                len = pixels.len()
            )));
        }

        // Pixels arrive as packed native-endian words: B,G,R,A bytes on
        // little-endian targets, A,R,G,B on big-endian ones.
        let (format, converted);
        if cfg!(target_endian = "big") {
            let mut rgba = vec![0u8; pixels.len()];
            for (dst, src) in rgba.chunks_exact_mut(4).zip(pixels.chunks_exact(4)) {
                dst.copy_from_slice(&[src[1], src[2], src[3], src[0]]);
            }
            format = wgpu::TextureFormat::Rgba8UnormSrgb;
            converted = Some(rgba);
        } else {
            format = wgpu::TextureFormat::Bgra8UnormSrgb;
            converted = None;
        }
        let data = converted.as_deref().unwrap_or(pixels);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("globe-texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-texture-bg"),
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, GpuTexture { bind_group });
        tracing::debug!("Uploaded texture {id:?} ({width}x{height})");
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        if let Some(slot) = self.state.bound.get_mut(unit as usize) {
            *slot = Some(texture);
        }
    }

    fn unbind_texture(&mut self, unit: u32) {
        if let Some(slot) = self.state.bound.get_mut(unit as usize) {
            *slot = None;
        }
    }

    fn create_draw_list(&mut self, vertices: &[SphereVertex], indices: &[u32]) -> DrawListId {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("globe-vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("globe-indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let id = DrawListId(self.next_list);
        self.next_list += 1;
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            },
        );
        id
    }

    fn destroy_draw_list(&mut self, list: DrawListId) {
        self.meshes.remove(&list);
    }

    fn call_list(&mut self, list: DrawListId) {
        self.record_draw(list);
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, ContextError> {
        // This host implements the day/night mix with its own internal
        // pipeline; the sources only gate availability.
        if vertex_src.trim().is_empty() || fragment_src.trim().is_empty() {
            return Err(ContextError::Shader("empty shader source".to_string()));
        }
        let id = ProgramId(self.next_program);
        self.next_program += 1;
        self.programs.push(id);
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.retain(|candidate| *candidate != program);
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.state.program = program;
    }

    fn clear_depth(&mut self) {
        self.commands.push(FrameCmd::ClearDepth);
    }
}
