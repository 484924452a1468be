//! A reference host that records every primitive call.
//!
//! Used by the effect's test suites to assert pass behavior without a GPU,
//! and useful as a starting point when writing a real host backend.

use glam::Mat4;
use terra_geom::SphereVertex;

use crate::context::{
    BlendMode, Capability, ContextError, DrawListId, LightParams, PaintContext, ProgramId,
    StateMask, TextureId,
};

/// One recorded primitive call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    PushState(StateMask),
    PopState,
    PushMatrix,
    PopMatrix,
    LoadMatrix,
    Translate([f32; 3]),
    Scale([f32; 3]),
    Rotate { angle_deg: f32, axis: [f32; 3] },
    Enable(Capability),
    Disable(Capability),
    SetBlendMode(BlendMode),
    SetLight(LightParams),
    SetMaterial(LightParams),
    UploadTexture(TextureId),
    DestroyTexture(TextureId),
    BindTexture { unit: u32, texture: TextureId },
    UnbindTexture(u32),
    CreateDrawList(DrawListId),
    DestroyDrawList(DrawListId),
    CallList(DrawListId),
    CompileProgram(ProgramId),
    DestroyProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    ClearDepth,
}

/// Recording implementation of [`PaintContext`].
pub struct RecordingContext {
    /// Every call, in order.
    pub calls: Vec<Call>,
    shading: bool,
    reject_programs: bool,
    next_texture: u64,
    next_list: u64,
    next_program: u64,
}

impl RecordingContext {
    /// A context that supports programmable shading.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            shading: true,
            reject_programs: false,
            next_texture: 1,
            next_list: 1,
            next_program: 1,
        }
    }

    /// A context whose runtime lacks programmable shading.
    pub fn without_shading() -> Self {
        Self {
            shading: false,
            ..Self::new()
        }
    }

    /// A context that fails every program compilation.
    pub fn rejecting_programs() -> Self {
        Self {
            reject_programs: true,
            ..Self::new()
        }
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Whether any recorded call matches `predicate`.
    pub fn contains(&self, predicate: impl Fn(&Call) -> bool) -> bool {
        self.calls.iter().any(predicate)
    }

    /// Whether state and matrix pushes are balanced by pops, never
    /// underflowing.
    pub fn balanced(&self) -> bool {
        let mut state_depth: i32 = 0;
        let mut matrix_depth: i32 = 0;
        for call in &self.calls {
            match call {
                Call::PushState(_) => state_depth += 1,
                Call::PopState => state_depth -= 1,
                Call::PushMatrix => matrix_depth += 1,
                Call::PopMatrix => matrix_depth -= 1,
                _ => {}
            }
            if state_depth < 0 || matrix_depth < 0 {
                return false;
            }
        }
        state_depth == 0 && matrix_depth == 0
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintContext for RecordingContext {
    fn shading_supported(&self) -> bool {
        self.shading
    }

    fn push_state(&mut self, mask: StateMask) {
        self.calls.push(Call::PushState(mask));
    }

    fn pop_state(&mut self) {
        self.calls.push(Call::PopState);
    }

    fn push_matrix(&mut self) {
        self.calls.push(Call::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.calls.push(Call::PopMatrix);
    }

    fn load_matrix(&mut self, _matrix: Mat4) {
        self.calls.push(Call::LoadMatrix);
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.calls.push(Call::Translate([x, y, z]));
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.calls.push(Call::Scale([x, y, z]));
    }

    fn rotate(&mut self, angle_deg: f32, x: f32, y: f32, z: f32) {
        self.calls.push(Call::Rotate {
            angle_deg,
            axis: [x, y, z],
        });
    }

    fn enable(&mut self, capability: Capability) {
        self.calls.push(Call::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.calls.push(Call::Disable(capability));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.calls.push(Call::SetBlendMode(mode));
    }

    fn set_light(&mut self, params: &LightParams) {
        self.calls.push(Call::SetLight(*params));
    }

    fn set_material(&mut self, params: &LightParams) {
        self.calls.push(Call::SetMaterial(*params));
    }

    fn upload_texture(
        &mut self,
        _width: u32,
        _height: u32,
        _pixels: &[u8],
    ) -> Result<TextureId, ContextError> {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.calls.push(Call::UploadTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::DestroyTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(Call::BindTexture { unit, texture });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.calls.push(Call::UnbindTexture(unit));
    }

    fn create_draw_list(&mut self, _vertices: &[SphereVertex], _indices: &[u32]) -> DrawListId {
        let id = DrawListId(self.next_list);
        self.next_list += 1;
        self.calls.push(Call::CreateDrawList(id));
        id
    }

    fn destroy_draw_list(&mut self, list: DrawListId) {
        self.calls.push(Call::DestroyDrawList(list));
    }

    fn call_list(&mut self, list: DrawListId) {
        self.calls.push(Call::CallList(list));
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, ContextError> {
        if self.reject_programs {
            return Err(ContextError::Shader("rejected by host".to_string()));
        }
        if vertex_src.is_empty() || fragment_src.is_empty() {
            return Err(ContextError::Shader("empty shader source".to_string()));
        }
        let id = ProgramId(self.next_program);
        self.next_program += 1;
        self.calls.push(Call::CompileProgram(id));
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.calls.push(Call::DestroyProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(Call::UseProgram(program));
    }

    fn clear_depth(&mut self) {
        self.calls.push(Call::ClearDepth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_saved_state;

    #[test]
    fn test_recording_preserves_call_order() {
        let mut context = RecordingContext::new();
        context.push_matrix();
        context.rotate(90.0, 0.0, 0.0, 1.0);
        context.pop_matrix();

        assert_eq!(context.calls.len(), 3);
        assert_eq!(context.calls[0], Call::PushMatrix);
        assert!(matches!(context.calls[1], Call::Rotate { .. }));
        assert_eq!(context.calls[2], Call::PopMatrix);
    }

    #[test]
    fn test_balanced_detects_missing_pop() {
        let mut context = RecordingContext::new();
        context.push_state(StateMask::ENABLE);
        assert!(!context.balanced());
        context.pop_state();
        assert!(context.balanced());
    }

    #[test]
    fn test_balanced_detects_underflow() {
        let mut context = RecordingContext::new();
        context.pop_matrix();
        context.push_matrix();
        assert!(!context.balanced());
    }

    #[test]
    fn test_saved_state_scope_restores_on_early_return() {
        let mut context = RecordingContext::new();
        let value: Option<u32> = with_saved_state(&mut context, StateMask::ENABLE, |context| {
            context.enable(Capability::Blend);
            None
        });
        assert!(value.is_none());
        assert!(context.balanced(), "Early exit must still pop");
    }

    #[test]
    fn test_resource_ids_are_unique() {
        let mut context = RecordingContext::new();
        let a = context.upload_texture(1, 1, &[0, 0, 0, 0]).unwrap();
        let b = context.upload_texture(1, 1, &[0, 0, 0, 0]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_sources_fail_compilation() {
        let mut context = RecordingContext::new();
        assert!(context.compile_program("", "void main(){}").is_err());
        assert!(context.compile_program("void main(){}", "x").is_ok());
    }
}
