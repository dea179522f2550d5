//! Space Map entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use space_map::audio::{AudioSink, WebAudio};
    use space_map::persistence::{LocalStorage, SaveScheduler, SaveSlots};
    use space_map::platform::ImageCache;
    use space_map::platform::images::fetch_alpha_mask;
    use space_map::renderer::{CanvasRenderer, build_scene};
    use space_map::sim::{GameEvent, PlanetPatch, TickInput, WorldState, tick};
    use space_map::{Settings, Tuning};

    // Hooks into the page's UI shell
    #[wasm_bindgen(inline_js = "
        export function on_planet_selected(id) {
            window.dispatchEvent(new CustomEvent('planet-selected', { detail: id }));
        }

        export function on_landed(id) {
            window.dispatchEvent(new CustomEvent('planet-landed', { detail: id }));
        }
    ")]
    extern "C" {
        fn on_planet_selected(id: u32);
        fn on_landed(id: u32);
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Game instance holding all state
    struct Game {
        state: WorldState,
        input: TickInput,
        settings: Settings,
        slots: Option<SaveSlots<LocalStorage>>,
        scheduler: SaveScheduler,
        images: Rc<RefCell<ImageCache>>,
        renderer: CanvasRenderer,
        audio: WebAudio,
        canvas: HtmlCanvasElement,
        last_time: f64,
        /// Cleared on teardown; the frame loop stops rescheduling
        running: bool,
    }

    impl Game {
        /// Match the canvas backing store to its CSS size
        fn sync_viewport(&mut self) {
            let w = self.canvas.client_width().max(1) as u32;
            let h = self.canvas.client_height().max(1) as u32;
            if self.canvas.width() != w || self.canvas.height() != h {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
            }
            self.input.viewport = Vec2::new(w as f32, h as f32);
        }

        /// Run one frame. Returns events the UI shell must hear about.
        fn update(&mut self, time: f64) -> Vec<GameEvent> {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;
            self.sync_viewport();
            self.input.now_ms = time;

            let events = {
                let images = self.images.borrow();
                tick(&mut self.state, &self.input, dt, &*images)
            };

            // Clear one-shot inputs after processing
            self.input.click = None;
            self.input.confirm_landing = None;

            for event in &events {
                self.audio.handle_event(event);
                match event {
                    GameEvent::Landed(id) => log::info!("Landed on planet {}", id),
                    GameEvent::LandingStarted(id) => log::info!("Landing on planet {}", id),
                    _ => {}
                }
            }

            if let Some(slots) = self.slots.as_mut() {
                self.scheduler.poll(time, &self.state, slots);
            }

            let scene = build_scene(&self.state, &self.settings, self.input.viewport);
            self.renderer.render(&scene);

            events
                .into_iter()
                .filter(|e| matches!(e, GameEvent::PlanetSelected(_) | GameEvent::ScreenTransition(_)))
                .collect()
        }

        /// Write everything still pending; the loop keeps running
        fn flush_saves(&mut self) {
            if let Some(slots) = self.slots.as_mut() {
                self.scheduler.flush(&self.state, slots);
            }
        }

        /// Stop the loop and write everything still pending
        fn teardown(&mut self) {
            if !self.running {
                return;
            }
            self.running = false;
            self.flush_saves();
            self.scheduler.cancel();
            self.audio.engine_stop();
            log::info!("Frame loop stopped");
        }

        fn edit_planet(&mut self, planet_id: u32, patch: &PlanetPatch) -> bool {
            let world_size = self.state.world_size();
            if !self.state.planets.update(planet_id, patch, world_size) {
                return false;
            }
            self.scheduler.planet_edited(planet_id, patch, self.state.now_ms);
            true
        }
    }

    fn with_game<R>(f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let game = GAME.with(|slot| slot.borrow().clone())?;
        let mut g = game.try_borrow_mut().ok()?;
        Some(f(&mut g))
    }

    /// UI confirmed a landing on this planet (applied next frame)
    #[wasm_bindgen]
    pub fn confirm_landing(planet_id: u32) {
        with_game(|g| g.input.confirm_landing = Some(planet_id));
    }

    /// Layout editor change: JSON `{x?, y?, radius?, rotation?, interactionRadius?}`
    #[wasm_bindgen]
    pub fn edit_planet(planet_id: u32, json_patch: &str) -> bool {
        let patch: PlanetPatch = match serde_json::from_str(json_patch) {
            Ok(patch) => patch,
            Err(err) => {
                log::warn!("Ignoring malformed planet patch: {}", err);
                return false;
            }
        };
        with_game(|g| g.edit_planet(planet_id, &patch)).unwrap_or(false)
    }

    /// Closest planet the ship can interact with, for the landing prompt
    #[wasm_bindgen]
    pub fn nearest_planet() -> Option<u32> {
        with_game(|g| {
            let world_size = g.state.world_size();
            g.state
                .planets
                .nearest_in_range(g.state.ship.pos, world_size)
                .map(|p| p.id)
        })
        .flatten()
    }

    /// Host is unmounting the map
    #[wasm_bindgen]
    pub fn teardown() {
        with_game(|g| g.teardown());
    }

    fn load_saved(state: &mut WorldState, slots: &SaveSlots<LocalStorage>) {
        let world_size = state.world_size();
        match slots.load_world_positions() {
            Ok(records) if !records.is_empty() => {
                state.planets.apply_records(&records, world_size);
                log::info!("Restored layout for {} planets", records.len());
            }
            Ok(_) => {}
            Err(err) => log::warn!("Planet layout unavailable: {}", err),
        }
        match slots.load_ship_state() {
            Ok(Some(snapshot)) => {
                state.restore(&snapshot);
                log::info!("Restored ship at ({:.0}, {:.0})", snapshot.x, snapshot.y);
            }
            Ok(None) => {}
            Err(err) => log::warn!("Ship state unavailable: {}", err),
        }
    }

    /// Kick off async image loads; completion only swaps in a cache slot
    fn load_planet_images(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        let refs: Vec<String> = g.state.planets.iter().map(|p| p.image_ref.clone()).collect();
        for image_ref in refs {
            g.renderer.load_image(&image_ref);
            if !g.images.borrow_mut().request(&image_ref) {
                continue;
            }
            let images = g.images.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = fetch_alpha_mask(&image_ref).await;
                images.borrow_mut().resolve(&image_ref, result);
            });
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Space Map starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = match LocalStorage::open() {
            Ok(store) => Settings::load(&store),
            Err(_) => Settings::default(),
        };

        let seed = js_sys::Date::now() as u64;
        let mut state = WorldState::new(seed, settings.quality.star_count(), Tuning::default());

        let slots = match LocalStorage::open() {
            Ok(store) => Some(SaveSlots::new(store)),
            Err(err) => {
                log::warn!("Saving disabled: {}", err);
                None
            }
        };
        if let Some(slots) = &slots {
            load_saved(&mut state, slots);
        }

        let mut audio = WebAudio::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);

        let renderer = CanvasRenderer::new(&canvas)?;
        let game = Rc::new(RefCell::new(Game {
            state,
            input: TickInput::default(),
            settings,
            slots,
            scheduler: SaveScheduler::default(),
            images: Rc::new(RefCell::new(ImageCache::new())),
            renderer,
            audio,
            canvas: canvas.clone(),
            last_time: 0.0,
            running: true,
        }));
        game.borrow_mut().sync_viewport();
        log::info!("Game initialized with seed: {}", seed);

        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        load_planet_images(&game);
        setup_input_handlers(&canvas, &game);
        setup_lifecycle_handlers(&game)?;
        request_animation_frame(game);

        log::info!("Space Map running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        // Pointer move - steering target
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().input.pointer = Some(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down - planet click or start firing
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let mut g = game.borrow_mut();
                g.input.pointer = Some(pos);
                g.input.click = Some(pos);
                g.input.fire_held = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up - stop firing
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().input.fire_held = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer leave - ship coasts, firing stops
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.input.pointer = None;
                g.input.fire_held = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle_handlers(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Page may be going away (or into the back/forward cache) - save now.
        // Only the exported teardown stops the loop.
        for event in ["pagehide", "beforeunload"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(mut g) = game.try_borrow_mut() {
                    g.flush_saves();
                }
            });
            window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(hidden);
                }
                if hidden {
                    // Treat as a release: no firing or steering while away
                    g.input.pointer = None;
                    g.input.fire_held = false;
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let notify = {
            let mut g = game.borrow_mut();
            if !g.running {
                return;
            }
            g.update(time)
        };

        // Outside the borrow: the shell may call back into the exports
        for event in notify {
            match event {
                GameEvent::PlanetSelected(id) => on_planet_selected(id),
                GameEvent::ScreenTransition(id) => on_landed(id),
                _ => {}
            }
        }

        if game.borrow().running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Space Map (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| space_map::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning file {}: {}", path, err);
                space_map::Tuning::default()
            }
        },
        None => space_map::Tuning::default(),
    };

    headless::run_demo(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use space_map::audio::{AudioSink, NullAudio};
    use space_map::persistence::{MemoryStore, SaveScheduler, SaveSlots};
    use space_map::sim::{GameEvent, NoImages, TickInput, WorldState, tick};
    use space_map::{Settings, Tuning, torus_delta};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60;
    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    /// Fly to the first planet firing along the way, select it and land
    pub fn run_demo(tuning: Tuning) {
        let settings = Settings::default();
        let mut state = WorldState::new(7, settings.quality.star_count(), tuning);
        let mut slots = SaveSlots::new(MemoryStore::default());
        let mut scheduler = SaveScheduler::default();
        let mut audio = NullAudio;
        let mut input = TickInput {
            viewport: VIEWPORT,
            ..Default::default()
        };

        let Some(target) = state.planets.iter().next().map(|p| p.id) else {
            log::warn!("No planets to visit");
            return;
        };

        let mut shots = 0;
        for frame in 0..MAX_FRAMES {
            let now = frame as f64 * FRAME_MS;
            input.now_ms = now;
            let world_size = state.world_size();

            if let Some(planet) = state.planets.get(target) {
                let screen = VIEWPORT * 0.5 + torus_delta(planet.pos, state.camera.pos, world_size);
                input.pointer = Some(screen);
                // Hold fire for the first second of the trip
                input.fire_held = now < 1000.0;
                if frame == 0 {
                    input.click = Some(VIEWPORT * 0.5);
                } else if !state.is_landing()
                    && state.planets.nearest_in_range(state.ship.pos, world_size).map(|p| p.id)
                        == Some(target)
                {
                    input.click = Some(screen);
                }
            }

            let events = tick(&mut state, &input, (FRAME_MS / 1000.0) as f32, &NoImages);
            input.click = None;
            input.confirm_landing = None;

            for event in &events {
                audio.handle_event(event);
                match event {
                    GameEvent::ShotFired => shots += 1,
                    GameEvent::PlanetSelected(id) => {
                        log::info!("Frame {}: selected planet {}", frame, id);
                        input.confirm_landing = Some(*id);
                    }
                    GameEvent::EngineUpdate { .. } => {}
                    other => log::info!("Frame {}: {:?}", frame, other),
                }
            }
            scheduler.poll(now, &state, &mut slots);

            if events.iter().any(|e| matches!(e, GameEvent::ScreenTransition(_))) {
                break;
            }
        }

        scheduler.flush(&state, &mut slots);
        log::info!(
            "Demo finished: {} shots, {} projectiles alive, {} save writes",
            shots,
            state.projectiles.len(),
            slots.store().writes
        );
    }
}
