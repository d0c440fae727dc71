#![allow(clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;

use super::*;
use crate::sim::sim_test::FakeSim;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn vec2_approx_eq(a: DVec2, b: DVec2) -> bool {
    (a - b).length() < 1e-6
}

/// 1000-unit world on a 200px minimap: 5 world units per pixel.
fn archipelago() -> FakeSim {
    FakeSim::new(1000.0)
        .with_square(1, DVec2::new(250.0, 250.0), 200.0)
        .with_square(2, DVec2::new(700.0, 300.0), 40.0)
        .with_square(3, DVec2::new(900.0, 900.0), 6.0)
        .with_player(7, "#3366ff", Some(DVec2::new(500.0, 500.0)))
        .with_owner(1, 7)
}

fn minimap() -> MinimapCore {
    MinimapCore::new(&archipelago(), MinimapConfig::default()).unwrap()
}

/// A pose looking along `heading` from the map centre.
fn pose_with_heading(heading: f64) -> CameraPose {
    let position = DVec3::new(500.0, 500.0, 100.0);
    let target = position + DVec3::new(heading.cos() * 50.0, heading.sin() * 50.0, -50.0);
    CameraPose::new(position, target)
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_rejects_empty_map() {
    let err = MinimapCore::new(&FakeSim::new(0.0), MinimapConfig::default()).unwrap_err();
    assert_eq!(err, MinimapError::InvalidMapSize(0.0));
}

#[test]
fn new_rejects_nan_map() {
    let err = MinimapCore::new(&FakeSim::new(f64::NAN), MinimapConfig::default()).unwrap_err();
    assert!(matches!(err, MinimapError::InvalidMapSize(_)));
}

#[test]
fn new_rejects_empty_surface() {
    let config = MinimapConfig { width_px: 0.0, ..MinimapConfig::default() };
    let err = MinimapCore::new(&FakeSim::new(1000.0), config).unwrap_err();
    assert!(matches!(err, MinimapError::InvalidPixelSize { .. }));
}

#[test]
fn tolerance_is_ten_pixels_in_world_units() {
    let mm = minimap();
    assert!(approx_eq(mm.tolerance(), 50.0));
    assert!(approx_eq(mm.tolerance_for(1.0), 5.0));
}

// =============================================================
// Scales
// =============================================================

#[test]
fn world_corners_map_to_pixel_corners() {
    let mm = minimap();
    assert!(vec2_approx_eq(mm.world_to_pixel(DVec2::new(0.0, 0.0)), DVec2::new(0.0, 200.0)));
    assert!(vec2_approx_eq(mm.world_to_pixel(DVec2::new(1000.0, 1000.0)), DVec2::new(200.0, 0.0)));
    assert!(vec2_approx_eq(mm.world_to_pixel(DVec2::new(500.0, 500.0)), DVec2::new(100.0, 100.0)));
}

#[test]
fn north_renders_toward_top() {
    let mm = minimap();
    let south = mm.world_to_pixel(DVec2::new(500.0, 100.0));
    let north = mm.world_to_pixel(DVec2::new(500.0, 900.0));
    assert!(north.y < south.y);
}

#[test]
fn pixel_to_world_inverts_world_to_pixel() {
    let mm = minimap();
    for p in [DVec2::new(0.0, 0.0), DVec2::new(123.4, 987.6), DVec2::new(-50.0, 1200.0)] {
        assert!(vec2_approx_eq(mm.pixel_to_world(mm.world_to_pixel(p)), p));
    }
}

// =============================================================
// Shape cache
// =============================================================

#[test]
fn large_island_is_regular() {
    let mm = minimap();
    let shape = mm.shapes().get(1).unwrap();
    assert!(!mm.shapes().is_small(1));
    assert_eq!(shape.outline.len(), 4);
    assert!(approx_eq(shape.bounds.extent(), 40.0));
    assert!(vec2_approx_eq(shape.bounds.center(), DVec2::new(50.0, 150.0)));
}

#[test]
fn small_island_is_refetched_at_fine_tolerance() {
    let mm = minimap();
    assert!(mm.shapes().is_small(2));
    assert_eq!(mm.shapes().get(2).unwrap().outline.len(), 4);
}

#[test]
fn degenerate_island_is_dropped() {
    let mm = minimap();
    assert!(mm.shapes().get(3).is_none());
    assert_eq!(mm.shapes().len(), 2);
}

#[test]
fn split_criterion_is_configurable() {
    let config = MinimapConfig { small_island_extent_px: 50.0, ..MinimapConfig::default() };
    let mm = MinimapCore::new(&archipelago(), config).unwrap();
    assert!(mm.shapes().is_small(1));
    assert_eq!(mm.shapes().regular().count(), 0);
}

#[test]
fn single_point_island_is_dropped() {
    let mut sim = archipelago();
    sim.islands[0].data.id = 99;
    sim.islands.push(crate::sim::sim_test::FakeIsland {
        data: crate::sim::IslandData { id: 1, center: DVec2::ZERO },
        outline: vec![DVec2::ZERO],
    });
    let mm = MinimapCore::new(&sim, MinimapConfig::default()).unwrap();
    assert!(mm.shapes().get(1).is_none());
    assert!(mm.shapes().get(99).is_some());
}

#[test]
fn bounds_of_empty_is_none() {
    assert!(Bounds::of(&[]).is_none());
}

// =============================================================
// Draw matrix
// =============================================================

#[test]
fn heading_north_is_identity() {
    let mm = minimap();
    let m = mm.draw_matrix(FRAC_PI_2);
    let p = DVec2::new(37.0, 142.0);
    assert!(vec2_approx_eq(m.transform_point2(p), p));
}

#[test]
fn forward_always_points_up() {
    let mm = minimap();
    for heading in [0.0, 0.4, FRAC_PI_2, 2.0, PI, -1.3] {
        let pose = pose_with_heading(heading);
        let center = mm.world_to_pixel(pose.position.truncate());
        let ahead = mm.world_to_pixel(pose.position.truncate() + DVec2::new(heading.cos(), heading.sin()) * 100.0);
        let m = mm.draw_matrix(pose.heading());
        let dir = (m.transform_point2(ahead) - m.transform_point2(center)).normalize();
        assert!(vec2_approx_eq(dir, DVec2::new(0.0, -1.0)), "heading {heading}: {dir:?}");
    }
}

#[test]
fn draw_matrix_keeps_center_fixed() {
    let mm = minimap();
    let m = mm.draw_matrix(1.234);
    assert!(vec2_approx_eq(m.transform_point2(DVec2::new(100.0, 100.0)), DVec2::new(100.0, 100.0)));
}

// =============================================================
// Pointer inversion
// =============================================================

#[test]
fn no_world_point_before_first_frame() {
    let mut mm = minimap();
    assert!(mm.canvas_to_world(DVec2::new(10.0, 10.0)).is_none());
    assert!(mm.pointer_down(DVec2::new(10.0, 10.0)).is_none());
    assert!(!mm.is_dragging());
}

#[test]
fn inversion_recovers_world_point() {
    let mut mm = minimap();
    for heading in [0.0, 0.7, FRAC_PI_2, 2.5, -2.0] {
        let m = mm.draw_matrix(heading);
        mm.commit(m);
        for world in [DVec2::new(500.0, 500.0), DVec2::new(12.0, 980.0), DVec2::new(731.5, 44.25)] {
            let canvas = m.transform_point2(mm.world_to_pixel(world));
            let back = mm.canvas_to_world(canvas).unwrap();
            assert!(vec2_approx_eq(back, world), "heading {heading}: {back:?} != {world:?}");
        }
    }
}

#[test]
fn rotated_click_uses_rotated_chain() {
    let mut mm = minimap();
    let pose = pose_with_heading(0.0);
    let scene = mm.compose(&pose, &[], &HashMap::new(), &[]);
    let matrix = scene.matrix;
    mm.commit(matrix);

    let world = mm.pointer_down(DVec2::new(150.0, 100.0)).unwrap();
    // Facing east, the right of the minimap is south of centre.
    assert!(vec2_approx_eq(world, DVec2::new(500.0, 250.0)));

    let unrotated = mm.pixel_to_world(DVec2::new(150.0, 100.0));
    assert!(!vec2_approx_eq(world, unrotated));
}

#[test]
fn pointer_uses_committed_matrix_not_latest_compose() {
    let mut mm = minimap();
    let first = mm.compose(&pose_with_heading(FRAC_PI_2), &[], &HashMap::new(), &[]).matrix;
    mm.commit(first);

    // A newer frame is composed but not yet painted.
    let pending = mm.compose(&pose_with_heading(0.0), &[], &HashMap::new(), &[]).matrix;
    assert_ne!(pending, first);

    let world = mm.canvas_to_world(DVec2::new(150.0, 100.0)).unwrap();
    assert!(vec2_approx_eq(world, DVec2::new(750.0, 500.0)));
    assert_eq!(mm.retained_matrix(), Some(first));
}

#[test]
fn drag_reports_only_while_held() {
    let mut mm = minimap();
    mm.commit(mm.draw_matrix(FRAC_PI_2));

    assert!(mm.pointer_move(DVec2::new(20.0, 20.0)).is_none());
    let down = mm.pointer_down(DVec2::new(20.0, 20.0)).unwrap();
    assert!(vec2_approx_eq(down, DVec2::new(100.0, 900.0)));
    assert!(mm.is_dragging());

    let moved = mm.pointer_move(DVec2::new(40.0, 20.0)).unwrap();
    assert!(vec2_approx_eq(moved, DVec2::new(200.0, 900.0)));

    mm.pointer_up();
    assert!(!mm.is_dragging());
    assert!(mm.pointer_move(DVec2::new(60.0, 20.0)).is_none());
}

// =============================================================
// Compose
// =============================================================

#[test]
fn compose_colors_islands_by_owner() {
    let sim = archipelago();
    let mm = minimap();
    let scene = mm.compose(&pose_with_heading(FRAC_PI_2), &sim.players, &sim.owners, &[]);
    assert_eq!(scene.islands.len(), 2);
    let owned = scene.islands.iter().find(|i| i.id == 1).unwrap();
    assert_eq!(owned.color, "#3366ff");
    assert!(!owned.small);
    let neutral = scene.islands.iter().find(|i| i.id == 2).unwrap();
    assert_eq!(neutral.color, NEUTRAL_ISLAND_COLOR);
    assert!(neutral.small);
}

#[test]
fn compose_places_camera_marker() {
    let mm = minimap();
    let scene = mm.compose(&pose_with_heading(0.0), &[], &HashMap::new(), &[]);
    assert!(vec2_approx_eq(scene.camera.at, DVec2::new(100.0, 100.0)));
    assert!(approx_eq(scene.camera.angle, 0.0));
    let focus = scene.camera.focus.unwrap();
    assert!(focus.x > 100.0);
}

#[test]
fn compose_carries_configured_fallback_flag_color() {
    let config = MinimapConfig { fallback_flag_color: "#abcdef".to_owned(), ..MinimapConfig::default() };
    let mm = MinimapCore::new(&archipelago(), config).unwrap();
    let scene = mm.compose(&pose_with_heading(0.0), &[], &HashMap::new(), &[]);
    assert_eq!(scene.fallback_flag_color, "#abcdef");
}

#[test]
fn compose_ship_dots_use_owner_color() {
    let sim = archipelago().with_ship(4, 7, DVec2::new(100.0, 100.0)).with_ship(5, 42, DVec2::new(0.0, 0.0));
    let mm = minimap();
    let scene = mm.compose(&pose_with_heading(FRAC_PI_2), &sim.players, &sim.owners, &sim.ships);
    assert_eq!(scene.ships.len(), 2);
    assert_eq!(scene.ships[0].color, "#3366ff");
    assert!(vec2_approx_eq(scene.ships[0].at, DVec2::new(20.0, 180.0)));
    assert_eq!(scene.ships[1].color, NEUTRAL_ISLAND_COLOR);
}

#[test]
fn compose_skips_players_without_position() {
    let sim = archipelago().with_player(8, "#ff0000", None);
    let mm = minimap();
    let scene = mm.compose(&pose_with_heading(FRAC_PI_2), &sim.players, &sim.owners, &[]);
    assert_eq!(scene.players.len(), 1);
    assert_eq!(scene.players[0].id, 7);
}

#[test]
fn compose_does_not_retain_matrix() {
    let mm = minimap();
    let _scene = mm.compose(&pose_with_heading(0.3), &[], &HashMap::new(), &[]);
    assert!(mm.retained_matrix().is_none());
}

// =============================================================
// Flags
// =============================================================

#[test]
fn pending_flag_uses_fallback_then_image() {
    let sim = archipelago();
    let mut mm = minimap();
    let url = "/flags/7.png";
    assert!(mm.flags_mut().request(url));
    assert!(!mm.flags_mut().request(url));

    let scene = mm.compose(&pose_with_heading(FRAC_PI_2), &sim.players, &sim.owners, &[]);
    assert_eq!(scene.players[0].flag, FlagPaint::Fallback(FALLBACK_FLAG_COLOR.to_owned()));

    mm.flags_mut().mark_loaded(url);
    let scene = mm.compose(&pose_with_heading(FRAC_PI_2), &sim.players, &sim.owners, &[]);
    assert_eq!(scene.players[0].flag, FlagPaint::Image(url.to_owned()));
}

#[test]
fn flag_load_requests_one_redraw() {
    let mut flags = FlagRegistry::default();
    flags.request("a.png");
    assert!(!flags.take_need_update());
    flags.mark_loaded("a.png");
    flags.mark_loaded("a.png");
    assert!(flags.take_need_update());
    assert!(!flags.take_need_update());
}

#[test]
fn unrequested_flag_load_is_ignored() {
    let mut flags = FlagRegistry::default();
    flags.mark_loaded("never.png");
    assert!(!flags.take_need_update());
    assert!(flags.state("never.png").is_none());
}

#[test]
fn failed_flag_stays_fallback() {
    let mut flags = FlagRegistry::default();
    flags.request("b.png");
    flags.mark_failed("b.png");
    flags.mark_loaded("b.png");
    assert_eq!(flags.state("b.png"), Some(FlagState::Failed));
    assert!(!flags.take_need_update());
}
