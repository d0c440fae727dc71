//! Minimap projection and pointer interaction.
//!
//! Three coordinate spaces meet here:
//!
//! - **world**: simulation ground truth, `x` east and `y` north;
//! - **map pixels**: the unrotated minimap surface, produced from world
//!   coordinates by a pair of [`LinearScale`]s (`y` flipped so north is up);
//! - **canvas pixels**: what the user sees, map pixels rotated about the
//!   surface centre so the camera's forward direction always points up.
//!
//! Island outlines are converted to map pixels once, at construction. Every
//! frame [`MinimapCore::compose`] builds a display list together with the draw
//! matrix (map pixels to canvas pixels). Once the frame has been painted the
//! caller hands that matrix back through [`MinimapCore::commit`]; pointer
//! events are inverted through the committed matrix only, so a click always
//! lands where the user saw it.

#[cfg(test)]
#[path = "minimap_test.rs"]
mod minimap_test;

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::FRAC_PI_2;

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::consts::{
    ERROR_MARGIN_PX, FALLBACK_FLAG_COLOR, MINIMAP_SIZE_PX, NEUTRAL_ISLAND_COLOR, SMALL_ERROR_MARGIN_PX,
    SMALL_ISLAND_EXTENT_PX,
};
use crate::error::MinimapError;
use crate::scale::LinearScale;
use crate::sim::{IslandId, IslandOwner, PlayerId, PlayerInfo, ShipInfo, Simulation};

/// Minimap surface size and simplification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub width_px: f64,
    pub height_px: f64,
    /// Outline simplification error for regular islands, in pixels.
    pub error_margin_px: f64,
    /// Islands with a smaller pixel extent are kept in the small-island tier.
    pub small_island_extent_px: f64,
    /// Outline simplification error for small islands, in pixels.
    pub small_error_margin_px: f64,
    pub fallback_flag_color: String,
    pub neutral_island_color: String,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width_px: MINIMAP_SIZE_PX,
            height_px: MINIMAP_SIZE_PX,
            error_margin_px: ERROR_MARGIN_PX,
            small_island_extent_px: SMALL_ISLAND_EXTENT_PX,
            small_error_margin_px: SMALL_ERROR_MARGIN_PX,
            fallback_flag_color: FALLBACK_FLAG_COLOR.to_owned(),
            neutral_island_color: NEUTRAL_ISLAND_COLOR.to_owned(),
        }
    }
}

/// Axis-aligned bounding box in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Bounds of a point set. `None` for an empty set.
    #[must_use]
    pub fn of(points: &[DVec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// The larger of width and height.
    #[must_use]
    pub fn extent(&self) -> f64 {
        let size = self.max - self.min;
        size.x.max(size.y)
    }

    #[must_use]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// One island outline, closed implicitly, in map pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandShape {
    pub id: IslandId,
    pub outline: Vec<DVec2>,
    pub bounds: Bounds,
}

/// The two-tier outline cache built at construction.
#[derive(Debug, Clone, Default)]
pub struct ShapeCache {
    regular: BTreeMap<IslandId, IslandShape>,
    small: BTreeMap<IslandId, IslandShape>,
}

impl ShapeCache {
    #[must_use]
    pub fn get(&self, id: IslandId) -> Option<&IslandShape> {
        self.regular.get(&id).or_else(|| self.small.get(&id))
    }

    #[must_use]
    pub fn is_small(&self, id: IslandId) -> bool {
        self.small.contains_key(&id)
    }

    pub fn regular(&self) -> impl Iterator<Item = &IslandShape> {
        self.regular.values()
    }

    pub fn small(&self) -> impl Iterator<Item = &IslandShape> {
        self.small.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regular.len() + self.small.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load state of one flag image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    Pending,
    Loaded,
    Failed,
}

/// Tracks flag image loads and the one-shot redraw request they trigger.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    states: HashMap<String, FlagState>,
    need_update: bool,
}

impl FlagRegistry {
    /// Start tracking `url`. Returns `true` when the caller should begin loading it.
    pub fn request(&mut self, url: &str) -> bool {
        if self.states.contains_key(url) {
            return false;
        }
        self.states.insert(url.to_owned(), FlagState::Pending);
        true
    }

    /// A pending image finished loading. Requests one redraw; repeated calls do nothing.
    pub fn mark_loaded(&mut self, url: &str) {
        if let Some(state) = self.states.get_mut(url) {
            if *state == FlagState::Pending {
                *state = FlagState::Loaded;
                self.need_update = true;
            }
        }
    }

    /// A pending image failed to load; it keeps rendering with the fallback fill.
    pub fn mark_failed(&mut self, url: &str) {
        if let Some(state) = self.states.get_mut(url) {
            if *state == FlagState::Pending {
                log::warn!("flag image failed to load: {url}");
                *state = FlagState::Failed;
            }
        }
    }

    #[must_use]
    pub fn state(&self, url: &str) -> Option<FlagState> {
        self.states.get(url).copied()
    }

    /// Consume the redraw request, if any.
    pub fn take_need_update(&mut self) -> bool {
        std::mem::take(&mut self.need_update)
    }
}

/// How a player marker should be filled.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagPaint {
    /// Draw the loaded flag image.
    Image(String),
    /// Draw a plain fill; the image is missing, pending, or failed.
    Fallback(String),
}

/// One island in a composed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandFill<'a> {
    pub id: IslandId,
    pub outline: &'a [DVec2],
    pub color: String,
    pub small: bool,
}

/// The camera arrow, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMarker {
    pub at: DVec2,
    /// Arrow direction in map pixels (radians, `y` down).
    pub angle: f64,
    /// Where the camera is looking, if the look ray meets the sea.
    pub focus: Option<DVec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarker {
    pub id: PlayerId,
    pub at: DVec2,
    pub flag: FlagPaint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipDot {
    pub at: DVec2,
    pub color: String,
    pub selected: bool,
}

/// Everything needed to paint one minimap frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapScene<'a> {
    /// Map pixels to canvas pixels for this frame.
    pub matrix: DAffine2,
    pub size: DVec2,
    pub islands: Vec<IslandFill<'a>>,
    pub camera: CameraMarker,
    pub players: Vec<PlayerMarker>,
    pub ships: Vec<ShipDot>,
    /// Fill for flags whose image element has not reached the renderer yet.
    pub fallback_flag_color: &'a str,
}

/// Minimap projection state and pointer handling.
#[derive(Debug, Clone)]
pub struct MinimapCore {
    config: MinimapConfig,
    map_size: f64,
    scale_x: LinearScale,
    scale_y: LinearScale,
    inverse_x: LinearScale,
    inverse_y: LinearScale,
    shapes: ShapeCache,
    matrix: Option<DAffine2>,
    dragging: bool,
    flags: FlagRegistry,
}

impl MinimapCore {
    /// Build the projection for the simulation's map and cache every island outline.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError`] when the map or pixel size is not positive.
    pub fn new<S: Simulation>(sim: &S, config: MinimapConfig) -> Result<Self, MinimapError> {
        let map_size = sim.map_size();
        if !(map_size.is_finite() && map_size > 0.0) {
            return Err(MinimapError::InvalidMapSize(map_size));
        }
        if !(config.width_px > 0.0 && config.height_px > 0.0) {
            return Err(MinimapError::InvalidPixelSize { width: config.width_px, height: config.height_px });
        }
        let scale_x = LinearScale::from_points(0.0, 0.0, map_size, config.width_px)?;
        let scale_y = LinearScale::from_points(0.0, config.height_px, map_size, 0.0)?;
        let mut minimap = Self {
            inverse_x: scale_x.inverse_scale()?,
            inverse_y: scale_y.inverse_scale()?,
            scale_x,
            scale_y,
            config,
            map_size,
            shapes: ShapeCache::default(),
            matrix: None,
            dragging: false,
            flags: FlagRegistry::default(),
        };
        minimap.shapes = minimap.build_shapes(sim);
        log::info!(
            "minimap ready: {} regular islands, {} small islands",
            minimap.shapes.regular.len(),
            minimap.shapes.small.len()
        );
        Ok(minimap)
    }

    fn build_shapes<S: Simulation>(&self, sim: &S) -> ShapeCache {
        let mut cache = ShapeCache::default();
        let regular_tolerance = self.tolerance_for(self.config.error_margin_px);
        let small_tolerance = self.tolerance_for(self.config.small_error_margin_px);
        let mut dropped = 0_usize;

        for island in sim.all_island_data() {
            let regular = sim
                .island_path(island.id, regular_tolerance)
                .map(|path| self.shape_from_world(island.id, &path));
            match regular {
                Some(Some(shape)) if shape.bounds.extent() >= self.config.small_island_extent_px => {
                    cache.regular.insert(island.id, shape);
                }
                _ => {
                    let small = sim
                        .island_path(island.id, small_tolerance)
                        .and_then(|path| self.shape_from_world(island.id, &path));
                    if let Some(shape) = small {
                        cache.small.insert(island.id, shape);
                    } else {
                        dropped += 1;
                    }
                }
            }
        }
        if dropped > 0 {
            log::debug!("minimap dropped {dropped} islands with degenerate outlines");
        }
        cache
    }

    fn shape_from_world(&self, id: IslandId, path: &[DVec2]) -> Option<IslandShape> {
        if path.len() < 2 {
            return None;
        }
        let outline: Vec<DVec2> = path.iter().map(|p| self.world_to_pixel(*p)).collect();
        let bounds = Bounds::of(&outline)?;
        Some(IslandShape { id, outline, bounds })
    }

    /// A pixel error expressed in world units.
    #[must_use]
    pub fn tolerance_for(&self, error_px: f64) -> f64 {
        self.inverse_x.alpha().abs() * error_px
    }

    /// Simplification tolerance (world units) used for regular islands.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance_for(self.config.error_margin_px)
    }

    #[must_use]
    pub fn config(&self) -> &MinimapConfig {
        &self.config
    }

    #[must_use]
    pub fn map_size(&self) -> f64 {
        self.map_size
    }

    #[must_use]
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.config.width_px, self.config.height_px)
    }

    #[must_use]
    pub fn shapes(&self) -> &ShapeCache {
        &self.shapes
    }

    #[must_use]
    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagRegistry {
        &mut self.flags
    }

    // --- Transforms ---

    /// World coordinates to unrotated map pixels.
    #[must_use]
    pub fn world_to_pixel(&self, world: DVec2) -> DVec2 {
        DVec2::new(self.scale_x.scale(world.x), self.scale_y.scale(world.y))
    }

    /// Unrotated map pixels to world coordinates.
    #[must_use]
    pub fn pixel_to_world(&self, pixel: DVec2) -> DVec2 {
        DVec2::new(self.inverse_x.scale(pixel.x), self.inverse_y.scale(pixel.y))
    }

    /// Map pixels to canvas pixels for a camera with the given heading.
    ///
    /// Rotates about the surface centre so the heading points up.
    #[must_use]
    pub fn draw_matrix(&self, heading: f64) -> DAffine2 {
        let center = self.size() * 0.5;
        DAffine2::from_translation(center)
            * DAffine2::from_angle(heading - FRAC_PI_2)
            * DAffine2::from_translation(-center)
    }

    /// The matrix of the last painted frame.
    #[must_use]
    pub fn retained_matrix(&self) -> Option<DAffine2> {
        self.matrix
    }

    /// Retain the matrix of a frame that has just been painted.
    pub fn commit(&mut self, matrix: DAffine2) {
        self.matrix = Some(matrix);
    }

    /// Canvas pixels to world coordinates through the last painted frame's matrix.
    ///
    /// `None` before the first frame has been committed.
    #[must_use]
    pub fn canvas_to_world(&self, canvas: DVec2) -> Option<DVec2> {
        let matrix = self.matrix?;
        let unrotated = matrix.inverse().transform_point2(canvas);
        Some(self.pixel_to_world(unrotated))
    }

    // --- Pointer ---

    /// Start a drag. Returns the world point the camera should move to.
    pub fn pointer_down(&mut self, canvas: DVec2) -> Option<DVec2> {
        let world = self.canvas_to_world(canvas)?;
        self.dragging = true;
        Some(world)
    }

    /// Continue a drag. Returns a world point only while dragging.
    pub fn pointer_move(&mut self, canvas: DVec2) -> Option<DVec2> {
        if !self.dragging {
            return None;
        }
        self.canvas_to_world(canvas)
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // --- Frame ---

    /// Build the display list for one frame. Nothing is retained until [`MinimapCore::commit`].
    #[must_use]
    pub fn compose(
        &self,
        pose: &CameraPose,
        players: &[PlayerInfo],
        owners: &HashMap<IslandId, IslandOwner>,
        ships: &[ShipInfo],
    ) -> MinimapScene<'_> {
        let heading = pose.heading();
        let colors: HashMap<PlayerId, &str> = players.iter().map(|p| (p.id, p.color.as_str())).collect();
        let color_of = |id: IslandId| -> String {
            owners
                .get(&id)
                .and_then(|o| o.owner)
                .and_then(|owner| colors.get(&owner).copied())
                .unwrap_or(self.config.neutral_island_color.as_str())
                .to_owned()
        };

        let islands = self
            .shapes
            .regular()
            .map(|s| (s, false))
            .chain(self.shapes.small().map(|s| (s, true)))
            .map(|(shape, small)| IslandFill { id: shape.id, outline: &shape.outline, color: color_of(shape.id), small })
            .collect();

        let camera = CameraMarker {
            at: self.world_to_pixel(pose.position.truncate()),
            angle: -heading,
            focus: pose.ground_focus().map(|f| self.world_to_pixel(f)),
        };

        let players = players
            .iter()
            .filter_map(|p| {
                let at = self.world_to_pixel(p.position?);
                Some(PlayerMarker { id: p.id, at, flag: self.flag_paint(p) })
            })
            .collect();

        let ships = ships
            .iter()
            .map(|s| ShipDot {
                at: self.world_to_pixel(s.position),
                color: colors.get(&s.owner).map_or_else(|| self.config.neutral_island_color.clone(), |c| (*c).to_owned()),
                selected: s.selected,
            })
            .collect();

        MinimapScene {
            matrix: self.draw_matrix(heading),
            size: self.size(),
            islands,
            camera,
            players,
            ships,
            fallback_flag_color: &self.config.fallback_flag_color,
        }
    }

    fn flag_paint(&self, player: &PlayerInfo) -> FlagPaint {
        match player.flag.as_deref() {
            Some(url) if self.flags.state(url) == Some(FlagState::Loaded) => FlagPaint::Image(url.to_owned()),
            _ => FlagPaint::Fallback(self.config.fallback_flag_color.clone()),
        }
    }
}
