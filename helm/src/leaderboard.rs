//! Leaderboard standings and the compass reading shown beside them.

#[cfg(test)]
#[path = "leaderboard_test.rs"]
mod leaderboard_test;

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use crate::sim::{IslandId, IslandOwner, PlayerId, PlayerInfo};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub player: PlayerId,
    pub name: String,
    pub color: String,
    pub islands: usize,
    pub ships: usize,
    pub is_local: bool,
}

/// Rank players by islands owned, then fleet size, then name. Returns at most `limit` rows.
///
/// `fleets` must be map-wide counts; viewport-scoped ship lists would make the
/// ranking follow the camera.
///
/// The local player is always included, replacing the last row if it would
/// otherwise be cut off.
#[must_use]
pub fn standings(
    players: &[PlayerInfo],
    owners: &HashMap<IslandId, IslandOwner>,
    fleets: &HashMap<PlayerId, usize>,
    local: Option<PlayerId>,
    limit: usize,
) -> Vec<Standing> {
    let mut islands: HashMap<PlayerId, usize> = HashMap::new();
    for owner in owners.values().filter_map(|o| o.owner) {
        *islands.entry(owner).or_default() += 1;
    }

    let mut rows: Vec<Standing> = players
        .iter()
        .map(|p| Standing {
            rank: 0,
            player: p.id,
            name: p.name.clone(),
            color: p.color.clone(),
            islands: islands.get(&p.id).copied().unwrap_or(0),
            ships: fleets.get(&p.id).copied().unwrap_or(0),
            is_local: Some(p.id) == local,
        })
        .collect();
    rows.sort_by(|a, b| {
        (Reverse(a.islands), Reverse(a.ships), &a.name).cmp(&(Reverse(b.islands), Reverse(b.ships), &b.name))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    if limit == 0 {
        return Vec::new();
    }
    let local_row = rows.iter().position(|r| r.is_local).filter(|i| *i >= limit);
    let mut top: Vec<Standing> = rows.iter().take(limit).cloned().collect();
    if let Some(i) = local_row {
        top.pop();
        top.push(rows[i].clone());
    }
    top
}

/// Sixteen-point compass label for a heading measured from +x (east), counter-clockwise.
#[must_use]
pub fn compass_label(heading: f64) -> &'static str {
    const POINTS: [&str; 16] =
        ["E", "ENE", "NE", "NNE", "N", "NNW", "NW", "WNW", "W", "WSW", "SW", "SSW", "S", "SSE", "SE", "ESE"];
    let turns = heading.rem_euclid(std::f64::consts::TAU) / std::f64::consts::TAU;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((turns * 16.0).round() as usize) % 16;
    POINTS[index]
}
