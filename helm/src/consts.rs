//! Shared numeric constants for the helm crate.

// ── Camera ──────────────────────────────────────────────────────

/// Lowest height (world units) the camera may sit at.
pub const MIN_Z: f64 = 10.0;

/// Highest height (world units) the camera may sit at.
pub const MAX_Z: f64 = 300.0;

/// Angular step in radians applied per tick by yaw and pitch rotation.
pub const MAX_ROTATION_SPEED: f64 = 0.03;

/// Ground distance per tick for forward/strafe movement at `MAX_Z`.
pub const MAX_SPEED: f64 = 6.0;

/// Movement speed never drops below this share of `MAX_SPEED`.
pub const MIN_SPEED_FRACTION: f64 = 0.2;

/// Height change per dolly step before clamping.
pub const Z_STEP: f64 = 10.0;

/// Zoom deltas are divided by this to get the fraction of distance travelled.
pub const ZOOM_DIVISOR: f64 = 500.0;

/// Duration of the camera ease, in seconds.
pub const EASE_DURATION_SECS: f64 = 0.3;

/// Vertical field of view of the scene camera, in degrees.
pub const FOV_Y_DEG: f64 = 60.0;

// ── Minimap ─────────────────────────────────────────────────────

/// Default minimap side length in CSS pixels.
pub const MINIMAP_SIZE_PX: f64 = 200.0;

/// Outline simplification error, in minimap pixels.
pub const ERROR_MARGIN_PX: f64 = 10.0;

/// Islands whose pixel extent falls below this go to the small-island tier.
pub const SMALL_ISLAND_EXTENT_PX: f64 = 12.0;

/// Outline simplification error for small islands, in minimap pixels.
pub const SMALL_ERROR_MARGIN_PX: f64 = 1.0;

/// Fill used for a player flag whose image has not loaded.
pub const FALLBACK_FLAG_COLOR: &str = "#8A8F98";

/// Fill used for islands nobody owns.
pub const NEUTRAL_ISLAND_COLOR: &str = "#C9B48A";

// ── Player actions ──────────────────────────────────────────────

/// A selection drag shorter than this (screen pixels) counts as a click.
pub const CLICK_SLOP_PX: f64 = 4.0;

/// Pick radius used for ships that do not report one, in world units.
pub const DEFAULT_SHIP_RADIUS: f64 = 6.0;

// ── Leaderboard ─────────────────────────────────────────────────

/// Rows shown on the leaderboard overlay.
pub const LEADERBOARD_ROWS: usize = 10;
