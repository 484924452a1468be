//! The four texture slots consumed by the passes.

use terra_host::{ContextError, PaintContext, TextureId};

/// One of the effect's texture slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    Day,
    Night,
    Clouds,
    Sky,
}

impl TextureSlot {
    /// All slots, in upload order.
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Day,
        TextureSlot::Night,
        TextureSlot::Clouds,
        TextureSlot::Sky,
    ];

    fn index(self) -> usize {
        match self {
            TextureSlot::Day => 0,
            TextureSlot::Night => 1,
            TextureSlot::Clouds => 2,
            TextureSlot::Sky => 3,
        }
    }
}

/// Holds the steady textures (day, night, sky) plus the mutable cloud slot.
///
/// Day, night, and sky are uploaded once at initialization and never change.
/// The cloud slot is replaced wholesale when a refresh completes. An empty
/// slot simply renders nothing.
#[derive(Default)]
pub struct TextureSet {
    slots: [Option<TextureId>; 4],
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The texture in a slot, if any.
    pub fn get(&self, slot: TextureSlot) -> Option<TextureId> {
        self.slots[slot.index()]
    }

    /// Fill a slot at initialization time.
    pub fn set(&mut self, slot: TextureSlot, texture: TextureId) {
        self.slots[slot.index()] = Some(texture);
    }

    /// Upload freshly processed cloud pixels and swap them into the cloud
    /// slot, destroying the previous texture.
    pub fn replace_clouds(
        &mut self,
        context: &mut dyn PaintContext,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), ContextError> {
        let fresh = context.upload_texture(width, height, pixels)?;
        if let Some(previous) = self.slots[TextureSlot::Clouds.index()].replace(fresh) {
            context.destroy_texture(previous);
        }
        Ok(())
    }

    /// Destroy every held texture. Called at screen detach.
    pub fn destroy_all(&mut self, context: &mut dyn PaintContext) {
        for slot in &mut self.slots {
            if let Some(texture) = slot.take() {
                context.destroy_texture(texture);
            }
        }
    }
}
