//! Output geometry and per-frame host inputs.

use glam::Mat4;

/// How the host maps cube faces to physical outputs.
///
/// Affects which dimensions feed the inset and backdrop aspect ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiOutputMode {
    /// The host decides per output; aspect comes from the whole screen.
    Automatic,
    /// One cube per output; aspect comes from the individual output.
    MultipleCubes,
    /// A single cube spans all outputs; aspect comes from the whole screen.
    OneBigCube,
}

/// One physical output of the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputGeometry {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

impl OutputGeometry {
    /// Height over width.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

/// The whole screen plus its outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub outputs: Vec<OutputGeometry>,
}

impl ScreenGeometry {
    /// A single-output screen, the common case for embedded hosts.
    pub fn single(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            outputs: vec![OutputGeometry {
                id: 0,
                width,
                height,
            }],
        }
    }

    /// Height over width of the whole screen.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    /// The output with the given id, falling back to the first.
    pub fn output(&self, id: usize) -> &OutputGeometry {
        self.outputs.get(id).unwrap_or(&self.outputs[0])
    }

    /// The output following `id` in the host's paint rotation.
    pub fn output_after(&self, id: usize) -> &OutputGeometry {
        &self.outputs[(id + 1) % self.outputs.len()]
    }
}

/// Per-frame inputs for the inset paint hook.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// The host's camera/screen transform for this face, fully composed.
    pub transform: Mat4,
    /// Which output is being painted.
    pub output: usize,
    /// Output placement offset within the screen transform.
    pub output_offset: (f32, f32),
    /// Output placement scale within the screen transform.
    pub output_scale: (f32, f32),
    /// The viewer is inside the cube; the inset must not be drawn.
    pub viewer_inside: bool,
}

/// Per-face inputs for the backdrop clear hook.
#[derive(Clone, Copy, Debug)]
pub struct BackdropView {
    /// Horizontal cube rotation from the pointer, in degrees.
    pub x_rotate: f32,
    /// Vertical cube rotation from the pointer, in degrees.
    pub v_rotate: f32,
    /// The viewer is inside the cube; the host's default backdrop applies.
    pub viewer_inside: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_outputs() -> ScreenGeometry {
        ScreenGeometry {
            width: 3200,
            height: 1200,
            outputs: vec![
                OutputGeometry {
                    id: 0,
                    width: 1920,
                    height: 1200,
                },
                OutputGeometry {
                    id: 1,
                    width: 1280,
                    height: 1024,
                },
            ],
        }
    }

    #[test]
    fn test_output_after_wraps_around() {
        let screen = two_outputs();
        assert_eq!(screen.output_after(0).id, 1);
        assert_eq!(screen.output_after(1).id, 0);
    }

    #[test]
    fn test_aspect_ratios() {
        let screen = two_outputs();
        assert!((screen.aspect() - 0.375).abs() < 1e-6);
        assert!((screen.output(0).aspect() - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_output_falls_back_to_first() {
        let screen = two_outputs();
        assert_eq!(screen.output(99).id, 0);
    }

    #[test]
    fn test_single_screen_helper() {
        let screen = ScreenGeometry::single(1920, 1080);
        assert_eq!(screen.outputs.len(), 1);
        assert_eq!(screen.output_after(0).id, 0);
    }
}
