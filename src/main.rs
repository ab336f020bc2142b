use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};
use std::sync::Arc;
use std::time::Instant;

// Import from the library crate
use citydrive::{
    logging, ui,
    config::DriveConfig,
    model, view, controller,
};

use model::{Camera, CameraHandle, NodeHandle, Transform};
use controller::{DriveLoop, FrameClock, InputEvent, SharedInputQueue};
use controller::input::native::key_event_to_input;
use view::{GpuContext, RenderState};

struct App {
    gpu: GpuContext,
    window: Arc<Window>,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Simulation
    drive: DriveLoop,
    input_queue: SharedInputQueue,
    camera: CameraHandle,
    car: NodeHandle,

    // Frame timing
    started: Instant,
    clock: FrameClock,
}

impl App {
    async fn new(window: Arc<Window>, config: &DriveConfig) -> Result<Self, view::GpuInitError> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;

        let mut camera = Camera::new(gpu.config.width, gpu.config.height);
        camera.fov_y = config.camera.fov_y_degrees.to_radians();
        camera.eye = config.camera.initial_eye;
        let camera = camera.shared();
        let car = Transform::at(config.vehicle.start_position).shared();

        let render_state = RenderState::new(
            &gpu.device,
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
            &model::build_track_mesh(),
            &model::build_car_mesh(),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let mut drive = DriveLoop::new(config);
        drive.attach_vehicle(car.clone());
        drive.attach_camera(camera.clone());
        let input_queue = drive.input_queue();

        Ok(Self {
            gpu,
            window,
            render_state,
            egui_state,
            egui_ctx,
            drive,
            input_queue,
            camera,
            car,
            started: Instant::now(),
            clock: FrameClock::new(0.0),
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(input) = key_event_to_input(event) {
                    self.input_queue.borrow_mut().push(input);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.input_queue.borrow_mut().push(InputEvent::FocusLost);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.input_queue
                    .borrow_mut()
                    .push(InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.render_state.resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height) {
            self.gpu.config.width = new_size.width;
            self.gpu.config.height = new_size.height;
            self.camera.borrow_mut().set_aspect(new_size.width, new_size.height);
        }
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn update(&mut self) {
        let time = self.clock.advance(self.now_ms());
        self.drive.tick(time);
        self.render_state
            .update_uniforms(&self.gpu.queue, &self.camera.borrow(), &self.car.borrow());

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = ui::build_ui(
            &self.egui_ctx,
            raw_input,
            self.drive.last_output(),
            self.drive.processor().bindings(),
            time.delta,
        );
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
        self.render_state.set_ui(primitives, full_output, dpr);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.render_state.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface)
    }
}

fn main() {
    logging::init();

    let config = DriveConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "config rejected, using defaults");
        DriveConfig::default()
    });

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!(error = %e, "failed to create event loop");
            return;
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));
    #[allow(deprecated)]
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(e) => {
            tracing::error!(error = %e, "failed to create window");
            return;
        }
    };

    let mut app = match pollster::block_on(App::new(window, &config)) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "GPU init failed");
            return;
        }
    };

    #[allow(deprecated)]
    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => {
                            app.drive.detach();
                            elwt.exit();
                        }
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            app.update();

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("out of GPU memory");
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!(error = ?e, "frame skipped"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    });
    if let Err(e) = result {
        tracing::error!(error = %e, "event loop terminated");
    }
}
