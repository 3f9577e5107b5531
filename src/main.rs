//! Shape Shifter Duel entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use shape_shifter_duel::consts::*;
    use shape_shifter_duel::platform::Controls;
    use shape_shifter_duel::renderer::{RenderState, scene};
    use shape_shifter_duel::sim::{GameEvent, GameOverReport, GamePhase, ModeKind};
    use shape_shifter_duel::{Arcade, Screen, Settings, stats};

    /// Game instance holding all state
    struct Game {
        arcade: Arcade,
        controls: Controls,
        settings: Settings,
        render_state: Option<RenderState>,
        accumulator: f64,
        last_time: f64,
        /// Last terminal notification, shown until the session leaves GameOver
        last_report: Option<GameOverReport>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                arcade: Arcade::new(seed),
                controls: Controls::new(),
                settings: Settings::load(),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                last_report: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt_ms: f64, time: f64) {
            self.accumulator += dt_ms.min(100.0);

            // Presses stay queued in `controls` until a tick consumes them
            if self.accumulator >= TICK_MS {
                let frame = self.controls.take_frame();
                let held = frame.held_only();

                let mut substeps = 0;
                while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
                    let keys = if substeps == 0 { &frame } else { &held };
                    let events = self.arcade.update(keys, TICK_MS);
                    self.handle_events(events);
                    self.accumulator -= TICK_MS;
                    substeps += 1;
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn handle_events(&mut self, events: Vec<GameEvent>) {
            for event in events {
                if let GameEvent::GameOver(report) = event {
                    if report.mode != ModeKind::Duel {
                        if let Some(score) = report.score {
                            if let Err(e) = stats::record_result(score, report.level) {
                                log::warn!("Could not record result: {e}");
                            }
                        }
                    }
                    dispatch_game_over(&report);
                    self.last_report = Some(report);
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = scene::build(&self.arcade, &self.settings);
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
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_visible(&document, "menu", self.arcade.screen == Screen::Menu);
            set_visible(
                &document,
                "level-select",
                matches!(self.arcade.screen, Screen::LevelSelect { .. }),
            );
            if let Screen::LevelSelect { mode, pending } = self.arcade.screen {
                let title = match mode {
                    ModeKind::Duel => "SELECT DUEL PLAYER LEVEL",
                    _ => "SELECT SINGLE PLAYER LEVEL",
                };
                set_text(&document, "#level-select-title", title);
                set_text(&document, "#level-select-pending", &pending.to_string());
                let preview = self
                    .arcade
                    .health_preview()
                    .map(|h| format!("Player Health: {h:.0}"))
                    .unwrap_or_default();
                set_text(&document, "#level-health", &preview);
            }

            set_visible(&document, "hud-fps", self.settings.show_fps);
            set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            set_visible(&document, "controls", self.settings.show_controls);

            let Some(session) = self.arcade.session() else {
                set_visible(&document, "hud", false);
                set_visible(&document, "pause-menu", false);
                set_visible(&document, "game-over", false);
                set_visible(&document, "transition-caption", false);
                self.last_report = None;
                return;
            };

            set_visible(&document, "hud", true);
            set_text(&document, "#hud-score .hud-value", &session.score.to_string());
            set_text(&document, "#hud-level .hud-value", &session.level().to_string());
            if let Some(player) = session.players.first() {
                set_text(&document, "#hud-lives .hud-value", &player.lives.to_string());
                set_text(&document, "#hud-shape .hud-value", player.shape.as_str());
            }
            if let Some(player) = session.players.get(1) {
                set_text(&document, "#hud-shape-p2 .hud-value", player.shape.as_str());
            }

            set_visible(&document, "pause-menu", session.phase == GamePhase::Paused);

            match &session.transition {
                Some(transition) if self.settings.effective_fade() => {
                    set_visible(&document, "transition-caption", true);
                    set_text(
                        &document,
                        "#transition-caption",
                        &format!("LEVEL {}", transition.displayed_level()),
                    );
                    set_style(
                        &document,
                        "transition-caption",
                        &format!("opacity: {:.2}", transition.text_alpha()),
                    );
                }
                _ => set_visible(&document, "transition-caption", false),
            }

            if session.phase != GamePhase::GameOver {
                self.last_report = None;
            }
            match &self.last_report {
                Some(report) => {
                    set_visible(&document, "game-over", true);
                    set_text(&document, "#game-over-message", &report.message);
                }
                None => set_visible(&document, "game-over", false),
            }
        }

        /// Host-only preference hotkeys; returns true if handled
        fn toggle_setting(&mut self, key: &str) -> bool {
            match key {
                "`" => self.settings.show_fps = !self.settings.show_fps,
                "h" | "H" => self.settings.enemy_health_bars = !self.settings.enemy_health_bars,
                "k" | "K" => self.settings.show_controls = !self.settings.show_controls,
                "m" | "M" => {
                    self.settings.reduced_motion = !self.settings.reduced_motion;
                    log::info!("Reduced motion: {}", self.settings.reduced_motion);
                }
                _ => return false,
            }
            self.settings.save();
            true
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn set_style(document: &Document, id: &str, style: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("style", style);
        }
    }

    /// Re-dispatch the terminal notification as a `game-over` CustomEvent
    fn dispatch_game_over(report: &GameOverReport) {
        let json = match serde_json::to_string(report) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode game-over report: {e}");
                return;
            }
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let detail = match js_sys::JSON::parse(&json) {
            Ok(detail) => detail,
            Err(e) => {
                log::error!("Failed to parse game-over detail: {e:?}");
                return;
            }
        };

        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        match web_sys::CustomEvent::new_with_event_init_dict("game-over", &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::error!("Failed to create game-over event: {e:?}"),
        }
    }

    fn js_err(context: &str, e: impl std::fmt::Debug) -> JsValue {
        JsValue::from_str(&format!("{context}: {e:?}"))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| js_err("logger", e))?;

        log::info!("Shape Shifter Duel starting...");

        let window = web_sys::window().ok_or_else(|| js_err("window", "missing"))?;
        let document = window
            .document()
            .ok_or_else(|| js_err("document", "missing"))?;

        // Hide loading indicator
        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("canvas", "missing"))?
            .dyn_into()
            .map_err(|e| js_err("canvas", e))?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| js_err("surface", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_err("adapter", e))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| js_err("renderer", e))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Shape Shifter Duel running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if !event.repeat() && g.toggle_setting(&key) {
                    return;
                }
                if g.controls.key_down(&key) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().controls.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            // Calculate delta time
            let dt_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                TICK_MS
            };
            g.last_time = time;

            g.update(dt_ms, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.controls.release_all();
                    g.arcade.auto_pause();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.controls.release_all();
                g.arcade.auto_pause();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shape Shifter Duel (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless combat run driven by a simple autopilot
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use shape_shifter_duel::consts::*;
    use shape_shifter_duel::sim::{GameEvent, ModeConfig, PlayerInput, Session, TickInput, tick};
    use shape_shifter_duel::stats;

    /// Give up after ten simulated minutes
    const MAX_TICKS: u32 = 60 * 60 * 10;

    pub fn run(seed: u64) {
        let mut session = Session::new(ModeConfig::combat(MIN_LEVEL), seed);
        let mut kills = 0u32;

        for n in 0..MAX_TICKS {
            let input = TickInput {
                players: [autopilot(&session), PlayerInput::default()],
                ..Default::default()
            };
            tick(&mut session, &input, TICK_MS);

            for event in session.drain_events() {
                match event {
                    GameEvent::EnemyDefeated { .. } => kills += 1,
                    GameEvent::WaveAdvanced { wave, bonus } => {
                        log::info!("Wave {wave} reached (+{bonus})");
                    }
                    GameEvent::GameOver(report) => {
                        log::info!(
                            "{} ({kills} kills, {:.1}s)",
                            report.message,
                            n as f64 * TICK_MS / 1000.0
                        );
                        if let Some(score) = report.score {
                            if let Err(e) = stats::record_result(score, report.level) {
                                log::warn!("Could not record result: {e}");
                            }
                        }
                    }
                    _ => {}
                }
            }

            if session.is_over() {
                return;
            }
        }

        log::info!(
            "Demo stopped at wave {} with score {} ({kills} kills)",
            session.level(),
            session.score
        );
    }

    /// Chase the lowest enemy, match its shape and keep firing
    fn autopilot(session: &Session) -> PlayerInput {
        let Some(player) = session.players.first() else {
            return PlayerInput::default();
        };
        let Some(target) = session
            .enemies
            .iter()
            .max_by(|a, b| a.body.pos.y.total_cmp(&b.body.pos.y))
        else {
            return PlayerInput::default();
        };

        let dx = target.body.center().x - player.body.center().x;
        PlayerInput {
            dx: if dx.abs() < player.speed { 0.0 } else { dx.signum() },
            dy: 0.0,
            fire: true,
            shape: (player.shape != target.shape).then_some(target.shape),
        }
    }
}
