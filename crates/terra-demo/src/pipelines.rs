//! Render pipelines translating the recorded draw commands to the GPU.
//!
//! Three pipeline families cover the effect's draw paths: solid (the sun
//! marker), textured-lit in replace and alpha-blend variants (earth day-only,
//! sky dome, cloud shell), and the dual-texture day/night blend. All share
//! one per-draw uniform block at group 0 and texture+sampler bind groups at
//! groups 1 and 2.

use bytemuck::{Pod, Zeroable};
use terra_geom::SphereVertex;

/// Per-draw uniform block shared by every pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// Light direction in view space; `w` is the lighting enable flag.
    pub light_dir: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub material_ambient: [f32; 4],
    pub material_diffuse: [f32; 4],
}

/// WGSL for the textured-lit pipeline (one texture).
const TEXTURED_SHADER: &str = r#"
struct DrawUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    material_ambient: vec4<f32>,
    material_diffuse: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var t_base: texture_2d<f32>;
@group(1) @binding(1)
var s_base: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.view_proj * draw.model * vec4<f32>(in.position, 1.0);
    out.normal = (draw.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let tex = textureSample(t_base, s_base, in.uv);
    let n_dot_l = max(dot(normalize(in.normal), normalize(draw.light_dir.xyz)), 0.0);
    let lit = draw.material_ambient.rgb * draw.light_ambient.rgb
            + draw.material_diffuse.rgb * draw.light_diffuse.rgb * n_dot_l;
    // light_dir.w = 0 renders unlit (backdrop geometry).
    let shade = mix(vec3<f32>(1.0), lit, draw.light_dir.w);
    return vec4<f32>(tex.rgb * shade, tex.a);
}
"#;

/// WGSL for the day/night blend pipeline (two textures).
const DAY_NIGHT_SHADER: &str = r#"
struct DrawUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    material_ambient: vec4<f32>,
    material_diffuse: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var t_day: texture_2d<f32>;
@group(1) @binding(1)
var s_day: sampler;

@group(2) @binding(0)
var t_night: texture_2d<f32>;
@group(2) @binding(1)
var s_night: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.view_proj * draw.model * vec4<f32>(in.position, 1.0);
    out.normal = (draw.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let day = textureSample(t_day, s_day, in.uv);
    let night = textureSample(t_night, s_night, in.uv);

    // Mix by light incidence with a sharpened terminator band.
    let incidence = dot(normalize(in.normal), normalize(draw.light_dir.xyz));
    let mixer = clamp(incidence * 4.0, -1.0, 1.0) * 0.5 + 0.5;
    return vec4<f32>(mix(night.rgb, day.rgb, mixer), 1.0);
}
"#;

/// WGSL for the solid pipeline (no texture; the sun marker).
const SOLID_SHADER: &str = r#"
struct DrawUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    material_ambient: vec4<f32>,
    material_diffuse: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.view_proj * draw.model * vec4<f32>(in.position, 1.0);
    out.normal = (draw.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n_dot_l = max(dot(normalize(in.normal), normalize(draw.light_dir.xyz)), 0.0);
    let lit = draw.material_ambient.rgb * draw.light_ambient.rgb
            + draw.material_diffuse.rgb * draw.light_diffuse.rgb * n_dot_l;
    let color = mix(vec3<f32>(1.0), lit, draw.light_dir.w);
    return vec4<f32>(color, 1.0);
}
"#;

fn sphere_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    use wgpu::{VertexAttribute, VertexFormat};

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x3,
            },
            VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: VertexFormat::Float32x3,
            },
            VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: VertexFormat::Float32x2,
            },
        ],
    }
}

/// Which pipeline a draw command resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineKind {
    Solid,
    TexturedReplace,
    TexturedAlpha,
    DayNight,
}

/// All pipelines plus the shared bind group layouts.
pub struct Pipelines {
    pub solid: wgpu::RenderPipeline,
    pub textured_replace: wgpu::RenderPipeline,
    pub textured_alpha: wgpu::RenderPipeline,
    pub day_night: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<DrawUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("solid-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout],
            immediate_size: 0,
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("textured-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });
        let day_night_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("day-night-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout, &texture_layout],
            immediate_size: 0,
        });

        let solid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("solid-shader"),
            source: wgpu::ShaderSource::Wgsl(SOLID_SHADER.into()),
        });
        let textured_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("textured-shader"),
            source: wgpu::ShaderSource::Wgsl(TEXTURED_SHADER.into()),
        });
        let day_night_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("day-night-shader"),
            source: wgpu::ShaderSource::Wgsl(DAY_NIGHT_SHADER.into()),
        });

        let build = |label: &str,
                     layout: &wgpu::PipelineLayout,
                     shader: &wgpu::ShaderModule,
                     blend: Option<wgpu::BlendState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[sphere_vertex_layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None, // inward and outward windings share pipelines
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        Self {
            solid: build("solid-pipeline", &solid_layout, &solid_shader, None),
            textured_replace: build(
                "textured-replace-pipeline",
                &textured_layout,
                &textured_shader,
                None,
            ),
            textured_alpha: build(
                "textured-alpha-pipeline",
                &textured_layout,
                &textured_shader,
                Some(wgpu::BlendState::ALPHA_BLENDING),
            ),
            day_night: build(
                "day-night-pipeline",
                &day_night_layout,
                &day_night_shader,
                None,
            ),
            uniform_layout,
            texture_layout,
        }
    }

    /// The pipeline for a given kind.
    pub fn get(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        match kind {
            PipelineKind::Solid => &self.solid,
            PipelineKind::TexturedReplace => &self.textured_replace,
            PipelineKind::TexturedAlpha => &self.textured_alpha,
            PipelineKind::DayNight => &self.day_night,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_uniforms_are_gpu_aligned() {
        let size = std::mem::size_of::<DrawUniforms>();
        assert_eq!(size % 16, 0, "DrawUniforms size ({size}) must be 16-byte aligned");
        assert_eq!(size, 272);
    }

    #[test]
    fn test_vertex_layout_matches_sphere_vertex() {
        let layout = sphere_vertex_layout();
        assert_eq!(
            layout.array_stride,
            std::mem::size_of::<SphereVertex>() as u64
        );
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[2].offset, 24);
    }
}
