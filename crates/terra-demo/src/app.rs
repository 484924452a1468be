//! The demo window: winit event handling and the per-frame hook dispatch.
//!
//! This is the "host" side of the effect: it owns the paint chain, feeds the
//! hooks every frame, and replays the recorded commands through the wgpu
//! backend. Dragging with the left mouse button rotates the cube, which the
//! backdrop pass tracks.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use terra_config::{DataLayout, Settings};
use terra_globe::ScreenContext;
use terra_host::{
    BackdropView, EffectHandler, FrameInput, HostScreen, MultiOutputMode, PaintChain,
    PaintContext, ScreenGeometry,
};

use crate::backend::WgpuBackend;
use crate::gpu::{DEPTH_FORMAT, GpuContext};

/// Host screen services: collects damage requests from the effect.
#[derive(Default)]
struct DemoHost {
    damaged: bool,
}

impl DemoHost {
    fn take_damage(&mut self) -> bool {
        std::mem::take(&mut self.damaged)
    }
}

impl HostScreen for DemoHost {
    fn damage(&mut self) {
        self.damaged = true;
    }
}

/// Adapter registering a shared screen context into the paint chain.
struct ChainedScreen {
    inner: Rc<RefCell<ScreenContext>>,
}

impl EffectHandler for ChainedScreen {
    fn prepare_paint(&mut self, context: &mut dyn PaintContext, elapsed_ms: u32) {
        self.inner.borrow_mut().prepare_paint(context, elapsed_ms);
    }

    fn done_paint(&mut self, host: &mut dyn HostScreen) {
        self.inner.borrow_mut().done_paint(host);
    }

    fn paint_inside(
        &mut self,
        context: &mut dyn PaintContext,
        frame: &FrameInput,
    ) -> terra_host::ChainAction {
        self.inner.borrow_mut().paint_inside(context, frame)
    }

    fn clear_backdrop(
        &mut self,
        context: &mut dyn PaintContext,
        view: &BackdropView,
    ) -> terra_host::ChainAction {
        self.inner.borrow_mut().clear_backdrop(context, view)
    }
}

/// The demo application state.
pub struct DemoApp {
    settings: Settings,
    layout: DataLayout,
    initial_size: (u32, u32),

    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    backend: Option<WgpuBackend>,
    chain: PaintChain,
    screen: Option<Rc<RefCell<ScreenContext>>>,
    host: DemoHost,

    last_frame: Instant,
    cube_x_rotate: f32,
    cube_v_rotate: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl DemoApp {
    pub fn new(settings: Settings, layout: DataLayout, width: u32, height: u32) -> Self {
        Self {
            settings,
            layout,
            initial_size: (width, height),
            window: None,
            gpu: None,
            backend: None,
            chain: PaintChain::new(),
            screen: None,
            host: DemoHost::default(),
            last_frame: Instant::now(),
            cube_x_rotate: 0.0,
            cube_v_rotate: 0.0,
            dragging: false,
            last_cursor: None,
        }
    }

    fn render(&mut self) {
        let (Some(gpu), Some(backend), Some(window)) =
            (&mut self.gpu, &mut self.backend, &self.window)
        else {
            return;
        };

        let elapsed_ms = self.last_frame.elapsed().as_millis() as u32;
        self.last_frame = Instant::now();

        // Drive the effect hooks the way a compositor would: prepare, clear
        // the backdrop, paint the inset, then report damage.
        backend.begin_frame();
        self.chain.prepare_paint(backend, elapsed_ms);

        let backdrop = BackdropView {
            x_rotate: self.cube_x_rotate,
            v_rotate: self.cube_v_rotate,
            viewer_inside: false,
        };
        self.chain.clear_backdrop(backend, &backdrop);

        let frame = FrameInput {
            transform: Mat4::IDENTITY,
            output: 0,
            output_offset: (0.0, 0.0),
            output_scale: (1.0, 1.0),
            viewer_inside: false,
        };
        self.chain.paint_inside(backend, &frame);
        self.chain.done_paint(&mut self.host);

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
                gpu.resize(w, h);
                return;
            }
            Err(e) => {
                tracing::warn!("Skipping frame: {e}");
                return;
            }
        };
        let color_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("terra-frame"),
            });

        // Aspect is compensated inside the passes (the ratio scaling), so
        // the projection itself stays square.
        let projection = Mat4::perspective_rh(45.0_f32.to_radians(), 1.0, 0.1, 100.0);
        let camera = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.2), Vec3::ZERO, Vec3::Y);
        backend.flush(
            &mut encoder,
            &color_view,
            &gpu.depth_view,
            projection * camera,
            wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.01,
                a: 1.0,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        if self.host.take_damage() {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Terra")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.initial_size.0 as f64,
                self.initial_size.1 as f64,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Could not create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu = match GpuContext::new_blocking(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut backend = WgpuBackend::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            gpu.surface_format,
            DEPTH_FORMAT,
        );

        let geometry =
            ScreenGeometry::single(gpu.surface_config.width, gpu.surface_config.height);
        let screen = match ScreenContext::attach(
            &mut backend,
            self.settings.clone(),
            self.layout.clone(),
            geometry,
            MultiOutputMode::Automatic,
        ) {
            Ok(screen) => Rc::new(RefCell::new(screen)),
            Err(e) => {
                tracing::error!("Could not attach the globe effect: {e}");
                event_loop.exit();
                return;
            }
        };

        self.chain.register(Box::new(ChainedScreen {
            inner: Rc::clone(&screen),
        }));

        self.screen = Some(screen);
        self.backend = Some(backend);
        self.gpu = Some(gpu);
        self.window = Some(window);
        tracing::info!("Demo host ready; drag with the left mouse button to rotate");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let (Some(screen), Some(backend)) = (&self.screen, &mut self.backend) {
                    screen.borrow_mut().detach(backend);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
                if let Some(screen) = &self.screen {
                    screen
                        .borrow_mut()
                        .set_screen_geometry(ScreenGeometry::single(
                            size.width.max(1),
                            size.height.max(1),
                        ));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.dragging = state == ElementState::Pressed;
                    if !self.dragging {
                        self.last_cursor = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((last_x, last_y)) = self.last_cursor {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        self.cube_x_rotate += dx * 0.3;
                        self.cube_v_rotate = (self.cube_v_rotate + dy * 0.2).clamp(-90.0, 90.0);
                    }
                    self.last_cursor = Some((position.x, position.y));
                } else {
                    self.last_cursor = None;
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // The terminator moves with the clock, so keep painting.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Build the window and run the event loop to completion.
pub fn run(settings: Settings, layout: DataLayout, width: u32, height: u32) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = DemoApp::new(settings, layout, width, height);
    event_loop.run_app(&mut app).expect("Event loop failed");
}
