//! Player command gestures: selecting ships, ordering moves, and shooting.
//!
//! [`PlayerActions`] is an explicit state machine over [`ActionMode`]:
//!
//! - `Idle` → `Selecting` on a primary press over empty sea;
//! - `Idle` → `Shooting` while Ctrl is held;
//! - any state → `Idle` on Escape.
//!
//! Handlers return the [`Command`]s to send to the simulation. World points
//! come from the scene camera's ground projection; a press that misses the sea
//! (e.g. on the sky) produces nothing.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use glam::DVec2;

use crate::consts::{CLICK_SLOP_PX, DEFAULT_SHIP_RADIUS};
use crate::input::{Button, Key, Modifiers};
use crate::sim::{Command, PlayerId, ShipId, ShipInfo};

/// The current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ActionMode {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Dragging a selection box.
    Selecting {
        /// Screen position of the press, used to tell a click from a drag.
        anchor_screen: DVec2,
        /// Ground point under the press.
        anchor: DVec2,
        /// Ground point under the pointer now.
        current: DVec2,
    },
    /// Ctrl is held; presses fire at the sea.
    Shooting,
}

/// What the engine knows about the pointer when an event arrives.
#[derive(Debug, Clone, Copy)]
pub struct PointerContext<'a> {
    pub screen: DVec2,
    /// Ground point under the pointer, if the pointer is over the sea.
    pub world: Option<DVec2>,
    pub ships: &'a [ShipInfo],
    pub local: Option<PlayerId>,
}

impl PointerContext<'_> {
    fn own_ships(&self) -> impl Iterator<Item = &ShipInfo> {
        let local = self.local;
        self.ships.iter().filter(move |s| Some(s.owner) == local)
    }

    /// The closest own ship whose pick radius contains the pointer.
    fn ship_under_pointer(&self) -> Option<ShipId> {
        let world = self.world?;
        self.own_ships()
            .map(|s| (s, s.position.distance(world)))
            .filter(|(s, d)| *d <= s.radius.unwrap_or(DEFAULT_SHIP_RADIUS))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s.id)
    }

    fn has_selection(&self) -> bool {
        self.own_ships().any(|s| s.selected)
    }
}

/// Gesture state machine for ship commands.
#[derive(Debug, Clone, Default)]
pub struct PlayerActions {
    mode: ActionMode,
}

impl PlayerActions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    #[must_use]
    pub fn is_shooting(&self) -> bool {
        self.mode == ActionMode::Shooting
    }

    pub fn pointer_down(&mut self, ctx: &PointerContext<'_>, button: Button, modifiers: Modifiers) -> Vec<Command> {
        let Some(world) = ctx.world else {
            return Vec::new();
        };
        match (self.mode, button) {
            (ActionMode::Shooting, Button::Primary) => vec![Command::ShootAt { at: world }],
            (ActionMode::Idle, Button::Primary) if modifiers.shift => vec![Command::CreateShip { at: world }],
            (ActionMode::Idle, Button::Primary) => {
                if let Some(id) = ctx.ship_under_pointer() {
                    return vec![Command::SelectShip { id }];
                }
                self.mode = ActionMode::Selecting { anchor_screen: ctx.screen, anchor: world, current: world };
                Vec::new()
            }
            (ActionMode::Idle, Button::Secondary) if ctx.has_selection() => {
                vec![Command::MoveSelectedShips { to: world }]
            }
            _ => Vec::new(),
        }
    }

    pub fn pointer_move(&mut self, ctx: &PointerContext<'_>) {
        if let ActionMode::Selecting { current, .. } = &mut self.mode {
            if let Some(world) = ctx.world {
                *current = world;
            }
        }
    }

    pub fn pointer_up(&mut self, ctx: &PointerContext<'_>, button: Button) -> Vec<Command> {
        let ActionMode::Selecting { anchor_screen, anchor, current } = self.mode else {
            return Vec::new();
        };
        if button != Button::Primary {
            return Vec::new();
        }
        self.mode = ActionMode::Idle;
        let current = ctx.world.unwrap_or(current);

        if ctx.screen.distance(anchor_screen) < CLICK_SLOP_PX {
            if ctx.has_selection() {
                return vec![Command::MoveSelectedShips { to: current }];
            }
            return vec![Command::ClearSelection];
        }

        let (min, max) = (anchor.min(current), anchor.max(current));
        let ids: Vec<ShipId> = ctx
            .own_ships()
            .filter(|s| s.position.cmpge(min).all() && s.position.cmple(max).all())
            .map(|s| s.id)
            .collect();
        if ids.is_empty() {
            return vec![Command::ClearSelection];
        }
        vec![Command::SelectShips { ids }]
    }

    /// Escape cancels everything; Ctrl enters shooting from idle.
    pub fn key_down(&mut self, key: &Key) -> Vec<Command> {
        if key.is_escape() {
            self.mode = ActionMode::Idle;
            return vec![Command::ClearSelection];
        }
        if key.is_control() && self.mode == ActionMode::Idle {
            self.mode = ActionMode::Shooting;
        }
        Vec::new()
    }

    pub fn key_up(&mut self, key: &Key) {
        if key.is_control() && self.mode == ActionMode::Shooting {
            self.mode = ActionMode::Idle;
        }
    }

    /// In shooting mode the wheel adjusts the firing radius.
    pub fn wheel(&mut self, dy: f64) -> Option<Command> {
        if !self.is_shooting() || dy == 0.0 || !dy.is_finite() {
            return None;
        }
        Some(Command::ChangeShootRadius { delta: -dy.signum() })
    }

    /// Drop any gesture in progress without emitting commands (e.g. on focus loss).
    pub fn reset(&mut self) {
        self.mode = ActionMode::Idle;
    }
}
