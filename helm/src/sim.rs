//! The contract with the external simulation module.
//!
//! The game simulation (ships, terrain, combat, island ownership) lives outside
//! this crate. The engine reads viewport-scoped snapshots through
//! [`Simulation`] and sends fire-and-forget [`Command`]s back. Tests and the
//! headless harness provide their own implementations.

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub type IslandId = u32;
pub type PlayerId = u32;
pub type ShipId = u32;

/// Enumeration entry for one island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IslandData {
    pub id: IslandId,
    pub center: DVec2,
}

/// Current ownership of one island.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandOwner {
    pub owner: Option<PlayerId>,
}

/// A player as shown on the minimap and leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    /// CSS color used for owned islands and ship dots.
    pub color: String,
    /// Flag image URL, if the player has one.
    #[serde(default)]
    pub flag: Option<String>,
    /// Where the player's marker sits on the minimap (e.g. fleet centroid).
    #[serde(default)]
    pub position: Option<DVec2>,
}

/// A ship near the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipInfo {
    pub id: ShipId,
    pub owner: PlayerId,
    pub position: DVec2,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub selected: bool,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletInfo {
    pub position: DVec2,
    #[serde(default)]
    pub height: f64,
}

/// An explosion with its remaining lifetime share in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionInfo {
    pub position: DVec2,
    pub life: f64,
}

/// Commands the client sends to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateShip { at: DVec2 },
    SelectShip { id: ShipId },
    SelectShips { ids: Vec<ShipId> },
    ClearSelection,
    MoveSelectedShips { to: DVec2 },
    ShootAt { at: DVec2 },
    ChangeShootRadius { delta: f64 },
}

/// Read/command interface of the simulation state.
pub trait Simulation {
    /// World-space side length of the square map.
    fn map_size(&self) -> f64;

    /// Simplified outline of one island, or `None` if unknown.
    fn island_path(&self, id: IslandId, tolerance: f64) -> Option<Vec<DVec2>>;

    fn all_island_data(&self) -> Vec<IslandData>;

    fn island_owners(&self) -> HashMap<IslandId, IslandOwner>;

    fn players(&self) -> Vec<PlayerInfo>;

    /// Ships relevant to a viewport centred on `center`.
    fn ships(&self, center: DVec2) -> Vec<ShipInfo>;

    fn bullets(&self, center: DVec2) -> Vec<BulletInfo>;

    fn explosions(&self, center: DVec2) -> Vec<ExplosionInfo>;

    /// Ships owned by each player across the whole map, regardless of viewport.
    fn fleet_sizes(&self) -> HashMap<PlayerId, usize>;

    /// The player this client controls, if any.
    fn local_player(&self) -> Option<PlayerId>;

    /// Send a command. Nothing is returned; effects show up in later snapshots.
    fn apply(&mut self, command: Command);
}

#[cfg(test)]
#[path = "sim_test.rs"]
pub(crate) mod sim_test;
