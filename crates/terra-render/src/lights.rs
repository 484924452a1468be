//! Light and material parameters for the sun, earth, and cloud shell.

use terra_host::LightParams;

/// The three parameter blocks used by the passes.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    /// The directional sun light.
    pub sun: LightParams,
    /// The earth surface material.
    pub earth: LightParams,
    /// The cloud shell material (only its specular term is applied).
    pub clouds: LightParams,
}

impl LightRig {
    /// Initial values. The earth gains a specular term only when the blend
    /// program is in use; without it the highlight reads as a glossy smear
    /// over the day texture.
    pub fn new(shaders_enabled: bool) -> Self {
        let mut rig = Self {
            sun: LightParams {
                ambient: [0.2; 4],
                diffuse: [1.0; 4],
                specular: [1.0; 4],
                position: [0.0, 1.0, 0.0, 0.0],
                shininess: 0.0,
            },
            earth: LightParams {
                ambient: [0.1; 4],
                diffuse: [1.0; 4],
                specular: [0.0; 4],
                position: [0.0; 4],
                shininess: 50.0,
            },
            clouds: LightParams {
                specular: [0.0; 4],
                ..LightParams::default()
            },
        };
        rig.set_shader_specular(shaders_enabled);
        rig
    }

    /// Applied when the shader preference changes.
    pub fn set_shader_specular(&mut self, enabled: bool) {
        self.earth.specular = if enabled {
            [0.5, 0.5, 0.4, 1.0]
        } else {
            [0.0; 4]
        };
    }
}
