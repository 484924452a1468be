//! The drawing primitives a host exposes to the effect.

use glam::Mat4;
use terra_geom::SphereVertex;

/// Handle to a host-owned texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a host-owned retained draw list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawListId(pub u64);

/// Handle to a host-owned shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Fixed-function capabilities the passes toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    Lighting,
    /// The auxiliary light channel carrying the sun.
    AuxLight,
    Blend,
    ColorMaterial,
}

/// Blend function selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Opaque replace (source overwrites destination).
    Replace,
    /// Standard source-alpha blending.
    Alpha,
}

/// Bitmask naming the state groups a pass saves before mutating them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateMask(pub u32);

impl StateMask {
    pub const COLOR: StateMask = StateMask(1 << 0);
    pub const TEXTURE: StateMask = StateMask(1 << 1);
    pub const DEPTH: StateMask = StateMask(1 << 2);
    pub const LIGHTING: StateMask = StateMask(1 << 3);
    pub const ENABLE: StateMask = StateMask(1 << 4);

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: StateMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for StateMask {
    type Output = StateMask;

    fn bitor(self, rhs: StateMask) -> StateMask {
        StateMask(self.0 | rhs.0)
    }
}

/// Light or material parameters, in the fixed-function layout.
///
/// The same shape serves both uses: lights consume position plus the color
/// terms, materials consume the color terms plus shininess.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Homogeneous position; `w = 0` makes the light directional.
    pub position: [f32; 4],
    pub shininess: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            ambient: [0.0; 4],
            diffuse: [0.0; 4],
            specular: [0.0; 4],
            position: [0.0; 4],
            shininess: 0.0,
        }
    }
}

/// Errors a host may raise from resource-creating primitives.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Texture allocation or upload failed.
    #[error("texture upload failed: {0}")]
    Texture(String),

    /// Shader compilation or linking failed.
    #[error("shader program rejected: {0}")]
    Shader(String),
}

/// Immediate-mode drawing primitives provided by the host.
///
/// All methods must be called from the render thread only; the effect's
/// background workers never receive a context. Matrix semantics follow the
/// classic fixed-function model: `load_matrix` replaces the top of the stack,
/// and `translate`/`scale`/`rotate` post-multiply it. `set_light` captures
/// the current matrix, so light positions rotate with the transform in
/// effect when they are set.
pub trait PaintContext {
    /// Whether the runtime supports programmable day/night blending.
    fn shading_supported(&self) -> bool;

    /// Save the named state groups; restored by the matching `pop_state`.
    fn push_state(&mut self, mask: StateMask);
    fn pop_state(&mut self);

    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn load_matrix(&mut self, matrix: Mat4);
    fn translate(&mut self, x: f32, y: f32, z: f32);
    fn scale(&mut self, x: f32, y: f32, z: f32);
    /// Rotate by `angle_deg` degrees around the given axis.
    fn rotate(&mut self, angle_deg: f32, x: f32, y: f32, z: f32);

    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Configure the auxiliary light from `params`, transformed by the
    /// current matrix.
    fn set_light(&mut self, params: &LightParams);
    /// Set the material used by subsequent draw-list calls.
    fn set_material(&mut self, params: &LightParams);

    /// Upload a texture from packed native-endian 32-bit pixels.
    fn upload_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureId, ContextError>;
    fn destroy_texture(&mut self, texture: TextureId);
    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    fn unbind_texture(&mut self, unit: u32);

    /// Retain a triangle-list mesh for repeated drawing.
    fn create_draw_list(&mut self, vertices: &[SphereVertex], indices: &[u32]) -> DrawListId;
    fn destroy_draw_list(&mut self, list: DrawListId);
    /// Draw a retained list under the current transform and state.
    fn call_list(&mut self, list: DrawListId);

    /// Compile and link a vertex+fragment program pair.
    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, ContextError>;
    fn destroy_program(&mut self, program: ProgramId);
    /// Activate a program, or return to fixed-function with `None`.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Clear the depth buffer without touching color.
    fn clear_depth(&mut self);
}

/// Run `body` between `push_state` and a guaranteed `pop_state`.
///
/// Every exit path of `body` (including early returns) flows back through
/// this function, so the host never observes residual state.
pub fn with_saved_state<C, R>(context: &mut C, mask: StateMask, body: impl FnOnce(&mut C) -> R) -> R
where
    C: PaintContext + ?Sized,
{
    context.push_state(mask);
    let result = body(context);
    context.pop_state();
    result
}

/// Run `body` between `push_matrix` and a guaranteed `pop_matrix`.
pub fn with_matrix<C, R>(context: &mut C, body: impl FnOnce(&mut C) -> R) -> R
where
    C: PaintContext + ?Sized,
{
    context.push_matrix();
    let result = body(context);
    context.pop_matrix();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mask_union_and_contains() {
        let mask = StateMask::COLOR | StateMask::DEPTH | StateMask::ENABLE;
        assert!(mask.contains(StateMask::COLOR));
        assert!(mask.contains(StateMask::DEPTH | StateMask::ENABLE));
        assert!(!mask.contains(StateMask::LIGHTING));
    }

    #[test]
    fn test_directional_light_convention() {
        let mut light = LightParams::default();
        light.position = [0.0, 1.0, 0.0, 0.0];
        assert_eq!(light.position[3], 0.0, "w = 0 marks a directional light");
    }
}
