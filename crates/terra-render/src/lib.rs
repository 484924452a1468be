//! Per-frame drawing orchestration for the globe effect.
//!
//! Two passes run against the host's [`terra_host::PaintContext`]: the inset
//! globe pass ([`paint_inside`]) draws the lit earth and cloud shell inside
//! the cube, and the backdrop pass ([`clear_backdrop`]) replaces the host's
//! default face clear with the starfield dome and sun marker. Both passes
//! save and restore exactly the state they mutate via scoped guards.

mod backdrop;
mod lights;
mod lists;
mod pass;
mod shader;
mod textures;
mod view;

pub use backdrop::clear_backdrop;
pub use lights::LightRig;
pub use lists::BodyLists;
pub use pass::{PASS_STATE, paint_inside};
pub use shader::{
    BlendProgram, DEFAULT_FRAGMENT_SOURCE, DEFAULT_VERTEX_SOURCE, ensure_default_sources,
};
pub use textures::{TextureSet, TextureSlot};
pub use view::GlobeView;
