//! The read-only inputs both passes consume.

use terra_astro::SolarPosition;
use terra_host::{MultiOutputMode, ScreenGeometry};

use crate::lights::LightRig;
use crate::lists::BodyLists;
use crate::shader::BlendProgram;
use crate::textures::TextureSet;

/// Everything a pass needs from the per-screen context, borrowed for the
/// duration of one hook invocation.
pub struct GlobeView<'a> {
    /// This frame's sun position.
    pub solar: SolarPosition,
    /// Configured viewer latitude in degrees.
    pub latitude: f32,
    /// Configured viewer longitude in degrees.
    pub longitude: f32,
    /// Display the southern hemisphere on top.
    pub south_on_top: bool,
    /// Inset globe scale factor.
    pub earth_size: f32,
    /// The user wants day/night blending (honored only when the program
    /// compiled).
    pub shaders_preferred: bool,
    pub lights: &'a LightRig,
    pub textures: &'a TextureSet,
    pub lists: &'a BodyLists,
    pub program: &'a BlendProgram,
    /// Host multi-output mode; selects the aspect-ratio source.
    pub mode: MultiOutputMode,
    pub screen: &'a ScreenGeometry,
}
