// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod utils;
pub mod ui;
pub mod config;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
    use web_sys::{Window, Document, HtmlCanvasElement, KeyboardEvent, Event};
    use std::rc::Rc;
    use std::cell::RefCell;

    use crate::config::DriveConfig;
    use crate::controller::input::wasm::keyboard_event_to_input;
    use crate::controller::{DriveLoop, FrameClock, InputEvent, InputProcessor, SharedInputQueue};
    use crate::model::{self, Camera, Transform};
    use crate::view::{GpuContext, RenderState};
    use crate::{logging, ui};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let config = DriveConfig::default();
        let (window, document, canvas) = init_canvas(config.window.width, config.window.height)?;
        setup_app(&window, &document, &canvas, config).await
    }

    /// Main application setup for WASM
    async fn setup_app(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        config: DriveConfig,
    ) -> Result<(), JsValue> {
        let gpu = GpuContext::new(canvas, config.window.width, config.window.height)
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let width = gpu.config.width;
        let height = gpu.config.height;

        // Scene nodes the loop writes into
        let mut cam = Camera::new(width, height);
        cam.fov_y = config.camera.fov_y_degrees.to_radians();
        cam.eye = config.camera.initial_eye;
        let cam = cam.shared();
        let car = Transform::at(config.vehicle.start_position).shared();

        let mut render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            width,
            height,
            &model::build_track_mesh(),
            &model::build_car_mesh(),
        );

        let mut drive = DriveLoop::new(&config);
        drive.attach_vehicle(car.clone());
        drive.attach_camera(cam.clone());
        let drive = Rc::new(RefCell::new(drive));

        let processor = drive.borrow().processor().clone();
        setup_input_listeners(document, window, drive.borrow().input_queue(), processor)?;

        // Pagehide tears the input down for good
        {
            let drive = drive.clone();
            let pagehide = Closure::wrap(Box::new(move |_e: Event| {
                drive.borrow_mut().detach();
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("pagehide", pagehide.as_ref().unchecked_ref())?;
            pagehide.forget();
        }

        let egui_ctx = egui::Context::default();
        let now = || web_sys::window().and_then(|w| w.performance()).map(|p| p.now()).unwrap_or(0.0);
        let mut clock = FrameClock::new(now());
        let dpr = window.device_pixel_ratio() as f32;
        tracing::info!(width, height, "drive loop starting");

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), move || {
            let now_ms = now();
            let time = clock.advance(now_ms);

            let mut drive = drive.borrow_mut();
            drive.tick(time);
            render_state.update_uniforms(gpu.queue.as_ref(), &cam.borrow(), &car.borrow());

            egui_ctx.set_pixels_per_point(dpr);
            let mut full_output = ui::build_ui(
                &egui_ctx,
                ui::screen_input(width, height, now_ms),
                drive.last_output(),
                drive.processor().bindings(),
                time.delta,
            );
            drop(drive);
            let primitives = egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            render_state.set_ui(primitives, full_output, dpr);

            if let Err(e) = render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface) {
                tracing::warn!(error = ?e, "frame skipped");
            }
        });
        f.start();

        Ok(())
    }

    /// Keyboard and focus listeners feeding the shared input queue
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        queue: SharedInputQueue,
        processor: InputProcessor,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let queue = queue.clone();
            let processor = processor.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                // Keep arrows and space from scrolling the page
                if processor.consumes(&e.key()) {
                    e.prevent_default();
                }
                queue.borrow_mut().push(keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let queue = queue.clone();
            let processor = processor.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if processor.consumes(&e.key()) {
                    e.prevent_default();
                }
                queue.borrow_mut().push(keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - release all controls
        {
            let queue = queue.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                queue.borrow_mut().push(InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change
        {
            let queue = queue.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                queue.borrow_mut().push(InputEvent::VisibilityChanged { visible: !doc.hidden() });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        Ok(())
    }

    fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Schedule the next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(error = ?e, "requestAnimationFrame failed, loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame start failed");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
