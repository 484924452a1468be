//! Per-screen effect state and the host hook implementations.

use terra_astro::{LocalInstant, SolarPosition, solar_position};
use terra_clouds::{CloudRefresher, process_raw_clouds};
use terra_config::{DataLayout, SettingChange, Settings};
use terra_geom::GeometryCache;
use terra_host::{
    BackdropView, ChainAction, EffectHandler, FrameInput, HostScreen, MultiOutputMode,
    PaintContext, ScreenGeometry,
};
use terra_render::{
    BlendProgram, BodyLists, GlobeView, LightRig, TextureSet, ensure_default_sources,
};

use crate::loader;

/// Errors that fail attachment for one screen. Other screens are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The per-user data directories could not be created.
    #[error("could not prepare data directories: {0}")]
    DataDirs(#[source] std::io::Error),
}

/// All per-screen state of the globe effect.
///
/// Constructed at attach time, destroyed at detach time; there are no
/// process-wide globals. Every field is owned by the render thread — the
/// only cross-thread traffic is the cloud refresher's completion channel.
pub struct ScreenContext {
    settings: Settings,
    layout: DataLayout,
    screen: ScreenGeometry,
    mode: MultiOutputMode,
    solar: SolarPosition,
    lights: LightRig,
    lists: BodyLists,
    textures: TextureSet,
    program: BlendProgram,
    clouds: CloudRefresher,
    damage: bool,
    previous_output: usize,
}

impl ScreenContext {
    /// Attach the effect to a screen: prepare directories, load the steady
    /// textures on four parallel worker threads, build geometry lists, and
    /// probe the blend program. Missing assets degrade to empty slots.
    pub fn attach(
        context: &mut dyn PaintContext,
        settings: Settings,
        layout: DataLayout,
        screen: ScreenGeometry,
        mode: MultiOutputMode,
    ) -> Result<Self, InitError> {
        layout.ensure_dirs().map_err(InitError::DataDirs)?;
        if let Err(e) = ensure_default_sources(&layout.vertex_shader(), &layout.fragment_shader()) {
            log::warn!("Could not write default shader sources: {e}");
        }

        let mut textures = TextureSet::new();
        for (slot, pixels) in loader::load_steady_textures(&layout) {
            match pixels {
                Some(pixels) => {
                    match context.upload_texture(pixels.width, pixels.height, &pixels.data) {
                        Ok(id) => textures.set(slot, id),
                        Err(e) => log::warn!("Could not upload {slot:?} texture: {e}"),
                    }
                }
                None => log::info!("No {slot:?} texture; slot renders blank"),
            }
        }

        let geometry = GeometryCache::build();
        let lists = BodyLists::build(context, &geometry);
        let program =
            BlendProgram::initialize(context, &layout.vertex_shader(), &layout.fragment_shader());
        let lights = LightRig::new(settings.shaders);
        let clouds = CloudRefresher::new(settings.clouds_url.clone(), layout.clouds_raw());
        let solar = solar_position(&LocalInstant::now(), settings.timezone_offset_hours);

        log::info!(
            "Globe effect attached ({} outputs, blend program: {})",
            screen.outputs.len(),
            if program.id().is_some() { "on" } else { "off" },
        );

        Ok(Self {
            settings,
            layout,
            screen,
            mode,
            solar,
            lights,
            lists,
            textures,
            program,
            clouds,
            damage: false,
            previous_output: 0,
        })
    }

    /// Release every host resource. Called at detach time.
    pub fn detach(&mut self, context: &mut dyn PaintContext) {
        self.lists.destroy(context);
        self.textures.destroy_all(context);
        self.program.teardown(context);
        log::info!("Globe effect detached");
    }

    /// The host's screen layout changed (outputs added/removed/resized).
    pub fn set_screen_geometry(&mut self, screen: ScreenGeometry) {
        self.previous_output = 0;
        self.screen = screen;
    }

    /// The host's multi-output mode changed.
    pub fn set_output_mode(&mut self, mode: MultiOutputMode) {
        self.mode = mode;
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a new settings snapshot, reacting to each changed field.
    pub fn apply_settings(&mut self, next: Settings) {
        let changes = self.settings.diff(&next);
        self.settings = next;

        for change in changes {
            match change {
                SettingChange::Shaders => {
                    self.lights.set_shader_specular(self.settings.shaders);
                }
                SettingChange::CloudsUrl => {
                    self.clouds.set_url(self.settings.clouds_url.clone());
                }
                // The remaining settings are read fresh each frame.
                _ => {}
            }
        }
    }

    fn globe_view(&self) -> GlobeView<'_> {
        GlobeView {
            solar: self.solar,
            latitude: self.settings.latitude,
            longitude: self.settings.longitude,
            south_on_top: self.settings.south_on_top,
            earth_size: self.settings.earth_size,
            shaders_preferred: self.settings.shaders,
            lights: &self.lights,
            textures: &self.textures,
            lists: &self.lists,
            program: &self.program,
            mode: self.mode,
            screen: &self.screen,
        }
    }
}

impl EffectHandler for ScreenContext {
    fn prepare_paint(&mut self, context: &mut dyn PaintContext, _elapsed_ms: u32) {
        // Time-varying: recomputed every frame, never cached.
        self.solar = solar_position(
            &LocalInstant::now(),
            self.settings.timezone_offset_hours,
        );

        self.clouds
            .maybe_launch(self.settings.clouds, self.settings.cloud_refresh_interval());

        if let Some(outcome) = self.clouds.poll_finished() {
            match outcome {
                Ok(_) => {
                    let raw = self.layout.clouds_raw();
                    let processed = self.layout.clouds_processed();
                    match process_raw_clouds(&raw, &processed) {
                        Ok(pixels) => {
                            let uploaded = self.textures.replace_clouds(
                                context,
                                pixels.width,
                                pixels.height,
                                &pixels.data,
                            );
                            match uploaded {
                                Ok(()) => log::info!("Cloud overlay refreshed"),
                                Err(e) => log::warn!("Cloud texture upload failed: {e}"),
                            }
                        }
                        Err(e) => log::warn!("Cloud transform failed: {e}"),
                    }
                }
                Err(e) => log::warn!("Cloud fetch failed; keeping previous overlay: {e}"),
            }
        }
    }

    fn done_paint(&mut self, host: &mut dyn HostScreen) {
        if self.damage {
            host.damage();
            self.damage = false;
        }
    }

    fn paint_inside(&mut self, context: &mut dyn PaintContext, frame: &FrameInput) -> ChainAction {
        let action = {
            let view = self.globe_view();
            terra_render::paint_inside(context, frame, &view)
        };

        if !frame.viewer_inside {
            self.previous_output = frame.output;
            self.damage = true;
        }
        action
    }

    fn clear_backdrop(
        &mut self,
        context: &mut dyn PaintContext,
        view: &BackdropView,
    ) -> ChainAction {
        let globe = self.globe_view();
        terra_render::clear_backdrop(context, view, &globe, self.previous_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use image::RgbaImage;
    use std::time::Duration;
    use terra_host::RecordingContext;
    use terra_host::recording::Call;
    use terra_render::TextureSlot;

    struct CountingHost {
        damages: u32,
    }

    impl HostScreen for CountingHost {
        fn damage(&mut self) {
            self.damages += 1;
        }
    }

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.clouds = false; // keep tests off the network
        settings
    }

    fn temp_layout() -> (tempfile::TempDir, DataLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::with_root(dir.path().join("terra"));
        (dir, layout)
    }

    fn attach(context: &mut RecordingContext) -> (tempfile::TempDir, ScreenContext) {
        let (dir, layout) = temp_layout();
        let screen = ScreenContext::attach(
            context,
            quiet_settings(),
            layout,
            ScreenGeometry::single(1280, 720),
            MultiOutputMode::Automatic,
        )
        .unwrap();
        (dir, screen)
    }

    fn frame() -> FrameInput {
        FrameInput {
            transform: Mat4::IDENTITY,
            output: 0,
            output_offset: (0.0, 0.0),
            output_scale: (1.0, 1.0),
            viewer_inside: false,
        }
    }

    #[test]
    fn test_attach_builds_lists_and_compiles_the_program() {
        let mut context = RecordingContext::new();
        let (_dir, screen) = attach(&mut context);

        assert_eq!(
            context.count(|call| matches!(call, Call::CreateDrawList(_))),
            4
        );
        // Default shader sources were written, so the probe succeeds.
        assert!(screen.program.id().is_some());
    }

    #[test]
    fn test_attach_without_assets_leaves_texture_slots_blank() {
        let mut context = RecordingContext::new();
        let (_dir, screen) = attach(&mut context);
        for slot in TextureSlot::ALL {
            assert!(screen.textures.get(slot).is_none());
        }
    }

    #[test]
    fn test_detach_releases_everything() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);
        context.calls.clear();

        screen.detach(&mut context);

        assert_eq!(
            context.count(|call| matches!(call, Call::DestroyDrawList(_))),
            4
        );
        assert!(context.contains(|call| matches!(call, Call::DestroyProgram(_))));
    }

    #[test]
    fn test_paint_marks_damage_and_done_paint_reports_it_once() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);
        let mut host = CountingHost { damages: 0 };

        screen.paint_inside(&mut context, &frame());
        screen.done_paint(&mut host);
        assert_eq!(host.damages, 1);

        // No paint since the last report: no further damage.
        screen.done_paint(&mut host);
        assert_eq!(host.damages, 1);
    }

    #[test]
    fn test_viewer_inside_paint_does_not_damage() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);
        let mut host = CountingHost { damages: 0 };

        let mut inside = frame();
        inside.viewer_inside = true;
        screen.paint_inside(&mut context, &inside);
        screen.done_paint(&mut host);
        assert_eq!(host.damages, 0);
    }

    #[test]
    fn test_shader_toggle_rewrites_earth_specular() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);
        assert_eq!(screen.lights.earth.specular, [0.5, 0.5, 0.4, 1.0]);

        let mut next = screen.settings().clone();
        next.shaders = false;
        screen.apply_settings(next);
        assert_eq!(screen.lights.earth.specular, [0.0; 4]);
    }

    #[test]
    fn test_prepare_paint_recomputes_solar_state() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);

        let mut next = screen.settings().clone();
        next.timezone_offset_hours = 6.0;
        screen.apply_settings(next);
        let before = screen.solar;

        screen.prepare_paint(&mut context, 16);
        let after = screen.solar;

        // A six-hour timezone change must move the hour angle by six hours
        // (modulo the at-most-one-minute drift between the two samples).
        let shift = before.hour_angle_hours - after.hour_angle_hours;
        assert!(
            (shift - 6.0).abs() < 0.1,
            "Expected ~6 h hour-angle shift, got {shift}"
        );
    }

    #[test]
    fn test_completed_cloud_cycle_uploads_the_overlay() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);

        // Simulate a successful download landing in the raw cache path.
        let raw = screen.layout.clouds_raw();
        let gradient = RgbaImage::from_fn(16, 8, |_, y| {
            let v = (y * 30) as u8;
            image::Rgba([v, v, v, 255])
        });
        image::DynamicImage::ImageRgba8(gradient)
            .to_rgb8()
            .save_with_format(&raw, image::ImageFormat::Jpeg)
            .unwrap();
        assert!(screen.clouds.launch_with(|| Ok(1024)));

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while screen.textures.get(TextureSlot::Clouds).is_none()
            && std::time::Instant::now() < deadline
        {
            screen.prepare_paint(&mut context, 16);
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(
            screen.textures.get(TextureSlot::Clouds).is_some(),
            "A finished fetch must end with a new cloud texture"
        );
        assert!(
            screen.layout.clouds_processed().exists(),
            "The processed image is cached for the next startup"
        );
        assert!(!screen.clouds.is_running(), "The job state must reset");
    }

    #[test]
    fn test_failed_cloud_cycle_keeps_the_previous_texture() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);

        // Seed a previous overlay.
        screen
            .textures
            .replace_clouds(&mut context, 1, 1, &[0u8; 4])
            .unwrap();
        let previous = screen.textures.get(TextureSlot::Clouds);

        assert!(
            screen
                .clouds
                .launch_with(|| Err(terra_clouds::FetchError::Io(std::io::Error::other(
                    "simulated"
                ))))
        );

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while screen.clouds.is_running() && std::time::Instant::now() < deadline {
            screen.prepare_paint(&mut context, 16);
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(screen.textures.get(TextureSlot::Clouds), previous);
        assert!(!screen.clouds.is_running(), "A failure must unblock retries");
    }

    #[test]
    fn test_backdrop_uses_the_output_after_the_last_painted_one() {
        let mut context = RecordingContext::new();
        let (_dir, mut screen) = attach(&mut context);
        screen.set_screen_geometry(ScreenGeometry {
            width: 2560,
            height: 1024,
            outputs: vec![
                terra_host::OutputGeometry {
                    id: 0,
                    width: 1280,
                    height: 1024,
                },
                terra_host::OutputGeometry {
                    id: 1,
                    width: 1280,
                    height: 720,
                },
            ],
        });

        screen.paint_inside(&mut context, &frame());
        context.calls.clear();

        let view = BackdropView {
            x_rotate: 0.0,
            v_rotate: 0.0,
            viewer_inside: false,
        };
        screen.clear_backdrop(&mut context, &view);

        // Output 0 was painted, so the backdrop scales by output 1's aspect.
        let expected = 720.0 / 1280.0;
        assert!(context.contains(|call| matches!(
            call,
            Call::Scale(s) if (s[0] - expected).abs() < 1e-5 && s[1] == 1.0
        )));
    }
}
