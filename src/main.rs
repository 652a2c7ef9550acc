//! Dune Ghosts entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Response};

    use dune_ghosts::Tuning;
    use dune_ghosts::consts::*;
    use dune_ghosts::renderer::{RenderState, scene};
    use dune_ghosts::sim::{ClickAction, GameEvent, MatchPhase, TickInput, World, tick};

    const MANIFEST_URL: &str = "models/manifest.json";

    // JS binding for pointer lock
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.warn('Pointer lock failed:', e));
                }
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
    }

    /// Game instance holding all state
    struct Game {
        world: World,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        pointer_locked: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                world: World::new(Tuning {
                    seed,
                    ..Tuning::default()
                }),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                pointer_locked: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.world, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // One-shot inputs apply to a single tick
                self.input.fire = false;
                self.input.look_yaw = 0.0;
                self.input.look_pitch = 0.0;
            }

            for event in self.world.drain_events() {
                log_event(&event);
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = scene::build(&self.world);
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let status = self.world.status();

            set_text(document, "#hud-time .hud-value", &format!("{:.1}", status.survival_time));
            set_text(document, "#hud-wave .hud-value", &status.wave.to_string());
            set_text(document, "#hud-ghosts .hud-value", &status.live_npcs.to_string());
            set_text(document, "#hud-best .hud-value", &format!("{:.1}", status.best_time));
            set_text(document, "#hud-fps .hud-value", &self.fps.to_string());
            set_text(document, "#message", &status.outcome_message);

            show(document, "start-screen", status.phase == MatchPhase::Idle);
            show(document, "pause-menu", status.phase == MatchPhase::Paused);
            show(document, "game-over", status.phase.is_over());
            if status.phase.is_over() {
                set_text(document, "#final-time", &format!("{:.1}", status.survival_time));
                set_text(document, "#final-wave", &status.wave.to_string());
            }
        }

        fn set_key(&mut self, code: &str, down: bool) -> bool {
            match code {
                "KeyW" | "ArrowUp" => self.input.forward = down,
                "KeyS" | "ArrowDown" => self.input.back = down,
                "KeyA" | "ArrowLeft" => self.input.left = down,
                "KeyD" | "ArrowRight" => self.input.right = down,
                "Space" => self.input.jump = down,
                _ => return false,
            }
            true
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::SparkFired { .. } | GameEvent::GhostHit { .. } => log::debug!("{:?}", event),
            _ => log::info!("{:?}", event),
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Fetch the model manifest as text
    async fn fetch_manifest() -> Result<String, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let value = JsFuture::from(window.fetch_with_str(MANIFEST_URL)).await?;
        let response: Response = value.dyn_into()?;
        if !response.ok() {
            return Err(js_err(format!("HTTP {} for {}", response.status(), MANIFEST_URL)));
        }
        let text = JsFuture::from(response.text()?).await?;
        text.as_string()
            .ok_or_else(|| js_err("manifest body is not text"))
    }

    fn load_models(game: Rc<RefCell<Game>>) {
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_manifest().await;
            let mut g = game.borrow_mut();
            match result {
                Ok(json) => g.world.assets.resolve(&json),
                Err(e) => g.world.assets.fail(format!("{:?}", e)),
            }
            if g.world.assets.is_ready() {
                log::info!("Models ready");
            }
        });
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(js_err)?;

        log::info!("Dune Ghosts starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        show(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("no canvas"))?
            .dyn_into()
            .map_err(|_| js_err("#canvas is not a canvas"))?;

        let (width, height) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        load_models(game.clone());

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (view_min, view_max) = {
            let g = game.borrow();
            let b = &g.world.bounds;
            (Vec2::new(b.min_x, b.min_z), Vec2::new(b.max_x, b.max_z))
        };
        let render_state = RenderState::new(surface, &adapter, width, height, view_min, view_max)
            .await
            .map_err(js_err)?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_auto_pause(game.clone())?;
        setup_resize(canvas, game.clone())?;

        show(&document, "hud", true);

        request_animation_frame(game);

        log::info!("Dune Ghosts running!");
        Ok(())
    }

    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let w = (canvas.client_width() as f64 * dpr) as u32;
        let h = (canvas.client_height() as f64 * dpr) as u32;
        (w.max(1), h.max(1))
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        kind: &str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        {
            let game = game.clone();
            let doc = document.clone();
            listen(&document, "pointerlockchange", move |_event: web_sys::Event| {
                let locked = doc.pointer_lock_element().is_some();
                log::debug!("Pointer lock {}", if locked { "acquired" } else { "released" });
                let mut g = game.borrow_mut();
                g.pointer_locked = locked;
                if !locked && g.world.phase == MatchPhase::Running {
                    log::info!("Auto-paused (pointer released)");
                }
                g.world.set_input_focus(locked);
                g.input.fire = false;
            })?;
        }

        // Mouse look only while the pointer is locked
        {
            let game = game.clone();
            listen(&document, "mousemove", move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.pointer_locked {
                    // Positive yaw turns left
                    g.input.look_yaw -= event.movement_x() as f32 * MOUSE_SENSITIVITY;
                    g.input.look_pitch -= event.movement_y() as f32 * MOUSE_SENSITIVITY;
                }
            })?;
        }

        // Fire when locked, otherwise grab the pointer
        {
            let game = game.clone();
            listen(canvas, "mousedown", move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                match g.world.click_action(g.pointer_locked) {
                    ClickAction::LockPointer => request_pointer_lock(),
                    ClickAction::Resume => g.world.set_input_focus(true),
                    ClickAction::Fire => g.input.fire = true,
                    ClickAction::Ignore => {}
                }
            })?;
        }

        {
            let game = game.clone();
            listen(&window, "keydown", move |event: KeyboardEvent| {
                if game.borrow_mut().set_key(&event.code(), true) {
                    event.prevent_default();
                }
            })?;
        }

        listen(&window, "keyup", move |event: KeyboardEvent| {
            game.borrow_mut().set_key(&event.code(), false);
        })
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            listen(&btn, "click", move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if let Err(e) = g.world.start() {
                    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
                        set_text(&doc, "#message", &e.to_string());
                    }
                    return;
                }
                g.input = TickInput::default();
                request_pointer_lock();
            })?;
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            listen(&btn, "click", move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                match g.world.restart() {
                    Ok(()) => {
                        g.input = TickInput::default();
                        request_pointer_lock();
                    }
                    Err(e) => log::warn!("Restart refused: {}", e),
                }
            })?;
        }
        Ok(())
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let doc = document.clone();
            listen(&document, "visibilitychange", move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.world.phase == MatchPhase::Running {
                        log::info!("Auto-paused (tab hidden)");
                    }
                    g.world.set_input_focus(false);
                } else if g.pointer_locked {
                    g.world.set_input_focus(true);
                }
            })?;
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            listen(&window, "blur", move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.world.phase == MatchPhase::Running {
                    log::info!("Auto-paused (window blur)");
                }
                g.world.set_input_focus(false);
                // Released keys are never seen while unfocused
                g.input = TickInput::default();
            })?;
        }

        // Without the pointer the player cannot look or fire; wait for a click
        listen(&window, "focus", move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            if g.pointer_locked {
                g.world.set_input_focus(true);
            }
        })
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let win = window.clone();
        listen(&window, "resize", move |_event: web_sys::Event| {
            let (w, h) = canvas_size(&win, &canvas);
            canvas.set_width(w);
            canvas.set_height(h);
            if let Some(rs) = game.borrow_mut().render_state.as_mut() {
                rs.resize(w, h);
            }
        })
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dune_ghosts::Tuning;
    use dune_ghosts::assets::{AssetGate, ModelSet};
    use dune_ghosts::consts::SIM_DT;
    use dune_ghosts::sim::{GameEvent, TickInput, World, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dune Ghosts (native) starting...");
    log::info!("Native mode runs a headless scripted match - run with `trunk serve` for the web version");

    // Optional tuning file as the first argument
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut world = World::new(tuning);
    world.assets = AssetGate::Ready(ModelSet::default());
    if let Err(e) = world.start() {
        log::error!("Could not start: {}", e);
        return;
    }

    // Sweep the view across the spawn band and fire a spark every 12 ticks
    let max_ticks = (180.0 / SIM_DT) as u64;
    let mut input = TickInput::default();
    for t in 0..max_ticks {
        input.look_yaw = if (t / 120) % 2 == 0 { 0.006 } else { -0.006 };
        input.fire = t % 12 == 0;
        tick(&mut world, &input, SIM_DT);

        for event in world.drain_events() {
            match event {
                GameEvent::SparkFired { .. } | GameEvent::GhostHit { .. } => {
                    log::debug!("{:?}", event)
                }
                _ => log::info!("{:?}", event),
            }
        }
        if world.phase.is_over() {
            break;
        }
    }

    if !world.phase.is_over() {
        log::info!("Script finished with the match still running");
    }
    let status = world.status();
    log::info!(
        "{:?} after {:.1}s (wave {}, {} ghosts left) {}",
        status.phase,
        status.survival_time,
        status.wave,
        status.live_npcs,
        status.outcome_message
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
