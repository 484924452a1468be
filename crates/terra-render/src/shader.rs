//! Day/night blend program lifecycle.
//!
//! The program is optional: if the runtime lacks programmable shading, a
//! source file is missing, or compilation fails, the effect silently falls
//! back to day-texture-only rendering. Default sources are bundled and
//! written to the data directory on first run so a fresh install can blend.

use std::path::Path;

use terra_host::{PaintContext, ProgramId};

/// Bundled vertex shader: forwards texture coordinates and computes the
/// incidence of the auxiliary light on the surface.
pub const DEFAULT_VERTEX_SOURCE: &str = "\
varying float incidence;

void main()
{
    vec3 normal = normalize(gl_NormalMatrix * gl_Normal);
    vec3 lightdir = normalize(vec3(gl_LightSource[1].position));
    incidence = dot(normal, lightdir);

    gl_TexCoord[0] = gl_MultiTexCoord0;
    gl_Position = ftransform();
}
";

/// Bundled fragment shader: mixes the night and day maps by light incidence,
/// with a sharpened transition band around the terminator.
pub const DEFAULT_FRAGMENT_SOURCE: &str = "\
uniform sampler2D daytex;
uniform sampler2D nighttex;
varying float incidence;

void main()
{
    vec4 day = texture2D(daytex, gl_TexCoord[0].st);
    vec4 night = texture2D(nighttex, gl_TexCoord[0].st);

    float mixer = clamp(incidence * 4.0, -1.0, 1.0) * 0.5 + 0.5;
    gl_FragColor = mix(night, day, mixer);
}
";

/// Write the bundled sources into the data directory if they are absent.
pub fn ensure_default_sources(vertex_path: &Path, fragment_path: &Path) -> std::io::Result<()> {
    if !vertex_path.exists() {
        std::fs::write(vertex_path, DEFAULT_VERTEX_SOURCE)?;
        log::info!("Wrote default vertex shader to {}", vertex_path.display());
    }
    if !fragment_path.exists() {
        std::fs::write(fragment_path, DEFAULT_FRAGMENT_SOURCE)?;
        log::info!(
            "Wrote default fragment shader to {}",
            fragment_path.display()
        );
    }
    Ok(())
}

/// The blend program's lifecycle states.
pub enum BlendProgram {
    /// No program: the runtime lacks shading, sources were missing, or
    /// compilation failed. Rendering degrades to the day texture.
    Unsupported,
    /// A linked program ready to activate.
    Compiled(ProgramId),
}

impl BlendProgram {
    /// Probe the runtime and try to compile the program from the two source
    /// files. Every failure path degrades to [`BlendProgram::Unsupported`];
    /// nothing here is fatal to the effect.
    pub fn initialize(
        context: &mut dyn PaintContext,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Self {
        if !context.shading_supported() {
            log::info!("Host lacks programmable shading; day/night blend disabled");
            return BlendProgram::Unsupported;
        }

        let vertex_src = match std::fs::read_to_string(vertex_path) {
            Ok(src) => src,
            Err(e) => {
                log::warn!(
                    "Vertex shader unavailable at {}: {e}; day/night blend disabled",
                    vertex_path.display()
                );
                return BlendProgram::Unsupported;
            }
        };
        let fragment_src = match std::fs::read_to_string(fragment_path) {
            Ok(src) => src,
            Err(e) => {
                log::warn!(
                    "Fragment shader unavailable at {}: {e}; day/night blend disabled",
                    fragment_path.display()
                );
                return BlendProgram::Unsupported;
            }
        };

        match context.compile_program(&vertex_src, &fragment_src) {
            Ok(program) => {
                log::info!("Day/night blend program compiled");
                BlendProgram::Compiled(program)
            }
            Err(e) => {
                log::warn!("Day/night blend program rejected: {e}");
                BlendProgram::Unsupported
            }
        }
    }

    /// The program handle, when compiled.
    pub fn id(&self) -> Option<ProgramId> {
        match self {
            BlendProgram::Compiled(program) => Some(*program),
            BlendProgram::Unsupported => None,
        }
    }

    /// Destroy the program if one was compiled.
    pub fn teardown(&mut self, context: &mut dyn PaintContext) {
        if let BlendProgram::Compiled(program) = self {
            context.destroy_program(*program);
        }
        *self = BlendProgram::Unsupported;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_host::RecordingContext;
    use terra_host::recording::Call;

    fn written_sources() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let vert = dir.path().join("earth.vert");
        let frag = dir.path().join("earth.frag");
        ensure_default_sources(&vert, &frag).unwrap();
        (dir, vert, frag)
    }

    #[test]
    fn test_default_sources_are_written_once() {
        let (_dir, vert, frag) = written_sources();
        assert!(vert.exists() && frag.exists());

        // A second call must not overwrite user edits.
        std::fs::write(&vert, "custom").unwrap();
        ensure_default_sources(&vert, &frag).unwrap();
        assert_eq!(std::fs::read_to_string(&vert).unwrap(), "custom");
    }

    #[test]
    fn test_initialize_compiles_when_supported() {
        let (_dir, vert, frag) = written_sources();
        let mut context = RecordingContext::new();
        let program = BlendProgram::initialize(&mut context, &vert, &frag);
        assert!(program.id().is_some());
    }

    #[test]
    fn test_unsupported_runtime_skips_compilation() {
        let (_dir, vert, frag) = written_sources();
        let mut context = RecordingContext::without_shading();
        let program = BlendProgram::initialize(&mut context, &vert, &frag);
        assert!(program.id().is_none());
        assert!(
            !context.contains(|call| matches!(call, Call::CompileProgram(_))),
            "No compile attempt without runtime support"
        );
    }

    #[test]
    fn test_missing_source_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = RecordingContext::new();
        let program = BlendProgram::initialize(
            &mut context,
            &dir.path().join("absent.vert"),
            &dir.path().join("absent.frag"),
        );
        assert!(program.id().is_none());
    }

    #[test]
    fn test_compile_failure_degrades_silently() {
        let (_dir, vert, frag) = written_sources();
        let mut context = RecordingContext::rejecting_programs();
        let program = BlendProgram::initialize(&mut context, &vert, &frag);
        assert!(program.id().is_none());
    }

    #[test]
    fn test_teardown_destroys_only_compiled_programs() {
        let (_dir, vert, frag) = written_sources();
        let mut context = RecordingContext::new();

        let mut compiled = BlendProgram::initialize(&mut context, &vert, &frag);
        compiled.teardown(&mut context);
        assert!(context.contains(|call| matches!(call, Call::DestroyProgram(_))));
        assert!(compiled.id().is_none());

        let mut context = RecordingContext::without_shading();
        let mut unsupported = BlendProgram::initialize(&mut context, &vert, &frag);
        unsupported.teardown(&mut context);
        assert!(!context.contains(|call| matches!(call, Call::DestroyProgram(_))));
    }

    #[test]
    fn test_fragment_source_mixes_by_incidence() {
        assert!(DEFAULT_FRAGMENT_SOURCE.contains("daytex"));
        assert!(DEFAULT_FRAGMENT_SOURCE.contains("nighttex"));
        assert!(DEFAULT_FRAGMENT_SOURCE.contains("mix("));
    }
}
