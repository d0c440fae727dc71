use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{DVec2, DVec3};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::actions::{ActionMode, PlayerActions, PointerContext};
use crate::camera::{CameraConfig, CameraControl, CameraPose};
use crate::clock::{Clock, PerformanceClock};
use crate::consts::LEADERBOARD_ROWS;
use crate::error::MinimapError;
use crate::input::{Button, InputEvent, Key, KeyBindings, Modifiers, Surface, WheelDelta};
use crate::leaderboard::{self, Standing};
use crate::minimap::{MinimapConfig, MinimapCore, MinimapScene};
use crate::render;
use crate::sim::{
    BulletInfo, Command, ExplosionInfo, IslandId, IslandOwner, PlayerId, PlayerInfo, ShipInfo, Simulation,
};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Key that shows or hides the minimap.
const MINIMAP_TOGGLE_KEY: &str = "m";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A command that was sent to the simulation.
    Command { command: Command },
    /// The minimap was clicked or dragged at this world point; the camera has been re-targeted.
    MinimapClicked { at: DVec2 },
    MinimapVisibility { visible: bool },
    SetCursor { cursor: String },
    RenderNeeded,
}

/// Everything sampled for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameState {
    pub frame: u64,
    pub time: f64,
    pub pose: CameraPose,
    pub heading: f64,
    /// Ground point the viewport-scoped queries were centred on.
    pub center: DVec2,
    pub players: Vec<PlayerInfo>,
    #[serde(skip)]
    pub owners: HashMap<IslandId, IslandOwner>,
    pub ships: Vec<ShipInfo>,
    /// Map-wide ship count per player, unaffected by where the camera looks.
    #[serde(skip)]
    pub fleets: HashMap<PlayerId, usize>,
    pub bullets: Vec<BulletInfo>,
    pub explosions: Vec<ExplosionInfo>,
    /// Flag images the host should start loading.
    pub flag_requests: Vec<String>,
    /// A flag image finished loading since the previous frame.
    pub flags_changed: bool,
}

/// Core engine state: all logic that doesn't depend on the canvas elements.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore<S: Simulation, C: Clock = PerformanceClock> {
    pub sim: S,
    pub camera: CameraControl<C>,
    pub minimap: MinimapCore,
    pub actions: PlayerActions,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    pub minimap_visible: bool,
    frame: u64,
}

impl<S: Simulation, C: Clock> EngineCore<S, C> {
    /// Build the core for a simulation.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError`] if the simulation's map cannot be projected.
    pub fn new(sim: S, clock: C, camera: CameraConfig, minimap: MinimapConfig) -> Result<Self, MinimapError> {
        let minimap = MinimapCore::new(&sim, minimap)?;
        let mut camera = CameraControl::new(camera, clock);
        let mid = minimap.map_size() * 0.5;
        let height = (camera.config().min_z + camera.config().max_z) * 0.5;
        camera.set_pose(DVec3::new(mid, mid - height, height), DVec3::new(mid, mid, 0.0));
        Ok(Self {
            sim,
            camera,
            minimap,
            actions: PlayerActions::new(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            minimap_visible: true,
            frame: 0,
        })
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.camera = self.camera.with_bindings(bindings);
        self
    }

    // --- Viewport ---

    /// Update scene viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    // --- Input events ---

    /// Route a raw input event to the matching handler.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { surface, at, button, modifiers } => {
                self.on_pointer_down(*surface, *at, *button, *modifiers)
            }
            InputEvent::PointerMove { surface, at, modifiers } => self.on_pointer_move(*surface, *at, *modifiers),
            InputEvent::PointerUp { surface, at, button, modifiers } => {
                self.on_pointer_up(*surface, *at, *button, *modifiers)
            }
            InputEvent::Wheel { at, delta, modifiers } => self.on_wheel(*at, *delta, *modifiers),
            InputEvent::KeyDown { key, modifiers, repeat } => self.on_key_down(key, *modifiers, *repeat),
            InputEvent::KeyUp { key, modifiers } => self.on_key_up(key, *modifiers),
            InputEvent::Blur => self.on_blur(),
        }
    }

    pub fn on_pointer_down(&mut self, surface: Surface, at: DVec2, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match surface {
            Surface::Minimap => {
                if !self.minimap_visible || button != Button::Primary {
                    return Vec::new();
                }
                let world = self.minimap.pointer_down(at);
                self.recenter(world)
            }
            Surface::Scene => {
                let ships = self.viewport_ships();
                let ctx = self.pointer_context(at, &ships);
                let commands = self.actions.pointer_down(&ctx, button, modifiers);
                self.dispatch(commands)
            }
        }
    }

    pub fn on_pointer_move(&mut self, surface: Surface, at: DVec2, _modifiers: Modifiers) -> Vec<Action> {
        match surface {
            Surface::Minimap => {
                let world = self.minimap.pointer_move(at);
                self.recenter(world)
            }
            Surface::Scene => {
                if matches!(self.actions.mode(), ActionMode::Selecting { .. }) {
                    let ctx = self.pointer_context(at, &[]);
                    self.actions.pointer_move(&ctx);
                    return vec![Action::RenderNeeded];
                }
                Vec::new()
            }
        }
    }

    pub fn on_pointer_up(&mut self, surface: Surface, at: DVec2, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        // A drag that leaves the minimap still ends when the button comes up anywhere.
        let was_dragging = self.minimap.is_dragging();
        self.minimap.pointer_up();
        if surface == Surface::Minimap || was_dragging {
            return Vec::new();
        }
        let ships = self.viewport_ships();
        let ctx = self.pointer_context(at, &ships);
        let commands = self.actions.pointer_up(&ctx, button);
        self.dispatch(commands)
    }

    pub fn on_wheel(&mut self, _at: DVec2, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if let Some(command) = self.actions.wheel(delta.dy) {
            return self.dispatch(vec![command]);
        }
        if delta.dy == 0.0 || !delta.dy.is_finite() {
            return Vec::new();
        }
        if modifiers.ctrl {
            self.camera.zoom(-delta.dy);
        } else {
            self.camera.move_camera_on_z(delta.dy.signum());
        }
        vec![Action::RenderNeeded]
    }

    /// Auto-repeats keep camera keys held but never flip the minimap toggle again.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers, repeat: bool) -> Vec<Action> {
        let before = self.actions.mode();
        let commands = self.actions.key_down(key);
        let mut out = self.dispatch(commands);

        if key.normalized().0 == MINIMAP_TOGGLE_KEY {
            if repeat {
                self.push_cursor_change(before, &mut out);
                return out;
            }
            self.minimap_visible = !self.minimap_visible;
            if !self.minimap_visible {
                self.minimap.pointer_up();
            }
            out.push(Action::MinimapVisibility { visible: self.minimap_visible });
        } else if self.camera.key_down(key) {
            out.push(Action::RenderNeeded);
        }

        self.push_cursor_change(before, &mut out);
        out
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        let before = self.actions.mode();
        self.actions.key_up(key);
        self.camera.key_up(key);
        let mut out = Vec::new();
        self.push_cursor_change(before, &mut out);
        out
    }

    /// Focus left the page: release keys and abandon gestures.
    pub fn on_blur(&mut self) -> Vec<Action> {
        let before = self.actions.mode();
        self.camera.release_all();
        self.actions.reset();
        self.minimap.pointer_up();
        let mut out = Vec::new();
        self.push_cursor_change(before, &mut out);
        out
    }

    // --- Frame ---

    /// Advance one frame: poll held keys, ease the camera, and fetch viewport-scoped snapshots.
    pub fn tick(&mut self) -> FrameState {
        self.frame += 1;
        let pose = self.camera.tick();
        let center = Self::query_center(&pose);

        let players = self.sim.players();
        let flag_requests: Vec<String> = players
            .iter()
            .filter_map(|p| p.flag.as_deref())
            .filter(|url| self.minimap.flags_mut().request(url))
            .map(str::to_owned)
            .collect();

        FrameState {
            frame: self.frame,
            time: self.camera.clock().now_secs(),
            pose,
            heading: pose.heading(),
            center,
            owners: self.sim.island_owners(),
            ships: self.sim.ships(center),
            fleets: self.sim.fleet_sizes(),
            bullets: self.sim.bullets(center),
            explosions: self.sim.explosions(center),
            players,
            flag_requests,
            flags_changed: self.minimap.flags_mut().take_need_update(),
        }
    }

    /// Build the minimap display list for a frame. Commit its matrix once painted.
    #[must_use]
    pub fn compose_minimap(&self, frame: &FrameState) -> MinimapScene<'_> {
        self.minimap.compose(&frame.pose, &frame.players, &frame.owners, &frame.ships)
    }

    /// Leaderboard rows for a frame.
    #[must_use]
    pub fn standings(&self, frame: &FrameState) -> Vec<Standing> {
        leaderboard::standings(&frame.players, &frame.owners, &frame.fleets, self.sim.local_player(), LEADERBOARD_ROWS)
    }

    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // --- Internals ---

    fn query_center(pose: &CameraPose) -> DVec2 {
        pose.ground_focus().unwrap_or_else(|| pose.position.truncate())
    }

    fn viewport_ships(&self) -> Vec<ShipInfo> {
        self.sim.ships(Self::query_center(&self.camera.pose()))
    }

    fn pointer_context<'a>(&self, at: DVec2, ships: &'a [ShipInfo]) -> PointerContext<'a> {
        let viewport = DVec2::new(self.viewport_width, self.viewport_height);
        let world = self.camera.pose().screen_to_ground(at, viewport, self.camera.config().fov_y_deg);
        PointerContext { screen: at, world, ships, local: self.sim.local_player() }
    }

    fn recenter(&mut self, world: Option<DVec2>) -> Vec<Action> {
        let Some(at) = world else {
            return Vec::new();
        };
        self.camera.center_on(at);
        vec![Action::MinimapClicked { at }, Action::RenderNeeded]
    }

    fn dispatch(&mut self, commands: Vec<Command>) -> Vec<Action> {
        commands
            .into_iter()
            .map(|command| {
                log::debug!("sending command {command:?}");
                self.sim.apply(command.clone());
                Action::Command { command }
            })
            .collect()
    }

    fn push_cursor_change(&self, before: ActionMode, out: &mut Vec<Action>) {
        let after = self.actions.mode();
        if (before == ActionMode::Shooting) == (after == ActionMode::Shooting) {
            return;
        }
        let cursor = if after == ActionMode::Shooting { "crosshair" } else { "default" };
        out.push(Action::SetCursor { cursor: cursor.to_owned() });
    }
}

/// Flag image loads reported by `onload`/`onerror` callbacks, drained each tick.
type LoadInbox = Rc<RefCell<Vec<(String, bool)>>>;

/// The browser engine. Wraps `EngineCore` and owns the minimap and leaderboard canvases.
pub struct Engine<S: Simulation> {
    minimap_canvas: HtmlCanvasElement,
    minimap_ctx: CanvasRenderingContext2d,
    leaderboard_ctx: Option<CanvasRenderingContext2d>,
    images: HashMap<String, HtmlImageElement>,
    loads: LoadInbox,
    pub core: EngineCore<S>,
}

impl<S: Simulation> Engine<S> {
    /// Create an engine drawing the minimap (and optionally the leaderboard) on the given canvases.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a canvas has no 2D context or the map cannot be projected.
    pub fn new(
        minimap_canvas: HtmlCanvasElement,
        leaderboard_canvas: Option<&HtmlCanvasElement>,
        sim: S,
        camera: CameraConfig,
        minimap: MinimapConfig,
    ) -> Result<Self, JsValue> {
        let minimap_ctx = context_2d(&minimap_canvas)?;
        let leaderboard_ctx = leaderboard_canvas.map(context_2d).transpose()?;
        let core = EngineCore::new(sim, PerformanceClock, camera, minimap)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            minimap_canvas,
            minimap_ctx,
            leaderboard_ctx,
            images: HashMap::new(),
            loads: Rc::new(RefCell::new(Vec::new())),
            core,
        })
    }

    /// Update scene viewport dimensions and size the minimap backing store for the DPR.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        let size = self.core.minimap.size() * self.core.dpr;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (width, height) = (size.x.round() as u32, size.y.round() as u32);
        self.minimap_canvas.set_width(width);
        self.minimap_canvas.set_height(height);
    }

    pub fn handle(&mut self, event: &InputEvent) -> Vec<Action> {
        self.core.handle(event)
    }

    /// Run one frame: apply finished image loads, advance the core, and paint the overlays.
    ///
    /// Returns the frame so the host can hand the pose to the 3D scene.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call or image setup fails.
    pub fn tick(&mut self) -> Result<FrameState, JsValue> {
        for (url, ok) in self.loads.borrow_mut().drain(..) {
            if ok {
                self.core.minimap.flags_mut().mark_loaded(&url);
            } else {
                self.core.minimap.flags_mut().mark_failed(&url);
            }
        }

        let frame = self.core.tick();
        for url in &frame.flag_requests {
            self.load_flag(url)?;
        }
        self.render(&frame)?;
        Ok(frame)
    }

    fn render(&mut self, frame: &FrameState) -> Result<(), JsValue> {
        if self.core.minimap_visible {
            let scene = self.core.compose_minimap(frame);
            render::draw_minimap(&self.minimap_ctx, &scene, &self.images, self.core.dpr)?;
            let matrix = scene.matrix;
            self.core.minimap.commit(matrix);
        }
        if let Some(ctx) = &self.leaderboard_ctx {
            let rows = self.core.standings(frame);
            render::draw_leaderboard(ctx, &rows, frame.heading, self.core.dpr)?;
        }
        Ok(())
    }

    fn load_flag(&mut self, url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;

        let inbox = Rc::clone(&self.loads);
        let done_url = url.to_owned();
        let onload = Closure::once_into_js(move || inbox.borrow_mut().push((done_url, true)));
        image.set_onload(Some(onload.unchecked_ref()));

        let inbox = Rc::clone(&self.loads);
        let failed_url = url.to_owned();
        let onerror = Closure::once_into_js(move || inbox.borrow_mut().push((failed_url, false)));
        image.set_onerror(Some(onerror.unchecked_ref()));

        image.set_src(url);
        self.images.insert(url.to_owned(), image);
        Ok(())
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}
