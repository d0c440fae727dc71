//! Rendering: paints the minimap and leaderboard overlays to 2D contexts.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives display lists built by the core and produces pixels; it does
//! not mutate any application state. The 3D sea view is drawn by the host.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DAffine2, DVec2};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::leaderboard::{Standing, compass_label};
use crate::minimap::{CameraMarker, FlagPaint, IslandFill, MinimapScene, PlayerMarker, ShipDot};

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

const SEA_COLOR: &str = "#1B3A57";
const COAST_COLOR: &str = "rgba(0, 0, 0, 0.35)";
const CAMERA_COLOR: &str = "#F5F5F5";
const SELECTED_RING_COLOR: &str = "#FFD23F";

/// Camera arrow length in map pixels.
const CAMERA_ARROW_PX: f64 = 9.0;
/// Flag marker size in map pixels (3:2).
const FLAG_W_PX: f64 = 12.0;
const FLAG_H_PX: f64 = 8.0;
const SHIP_DOT_RADIUS_PX: f64 = 1.5;

const LEADERBOARD_ROW_PX: f64 = 18.0;
const LEADERBOARD_PAD_PX: f64 = 8.0;

/// Draw one minimap frame.
///
/// `dpr` is the device pixel ratio; the scene is laid out in CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_minimap(
    ctx: &CanvasRenderingContext2d,
    scene: &MinimapScene<'_>,
    images: &HashMap<String, HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    // Layer 1: clear and fill the sea, unrotated so the corners stay covered.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, scene.size.x, scene.size.y);
    ctx.set_fill_style_str(SEA_COLOR);
    ctx.fill_rect(0.0, 0.0, scene.size.x, scene.size.y);

    // Everything else is in map pixels, rotated so the heading points up.
    let [a, b, c, d, e, f] = (DAffine2::from_scale(DVec2::splat(dpr)) * scene.matrix).to_cols_array();
    ctx.set_transform(a, b, c, d, e, f)?;

    // Layer 2: islands, regular ones outlined.
    for island in &scene.islands {
        draw_island(ctx, island);
    }

    // Layer 3: ships.
    for ship in &scene.ships {
        draw_ship(ctx, ship)?;
    }

    // Layer 4: player flags, kept upright on screen.
    let upright = scene.camera.angle + FRAC_PI_2;
    for player in &scene.players {
        draw_player(ctx, player, images, scene.fallback_flag_color, upright)?;
    }

    // Layer 5: the camera.
    draw_camera(ctx, &scene.camera)?;

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    Ok(())
}

fn draw_island(ctx: &CanvasRenderingContext2d, island: &IslandFill<'_>) {
    let Some((first, rest)) = island.outline.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    ctx.set_fill_style_str(&island.color);
    ctx.fill();
    if !island.small {
        ctx.set_stroke_style_str(COAST_COLOR);
        ctx.set_line_width(0.5);
        ctx.stroke();
    }
}

fn draw_ship(ctx: &CanvasRenderingContext2d, ship: &ShipDot) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(ship.at.x, ship.at.y, SHIP_DOT_RADIUS_PX, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(&ship.color);
    ctx.fill();
    if ship.selected {
        ctx.set_stroke_style_str(SELECTED_RING_COLOR);
        ctx.set_line_width(0.75);
        ctx.stroke();
    }
    Ok(())
}

fn draw_player(
    ctx: &CanvasRenderingContext2d,
    player: &PlayerMarker,
    images: &HashMap<String, HtmlImageElement>,
    fallback: &str,
    upright: f64,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.translate(player.at.x, player.at.y)?;
    ctx.rotate(upright)?;
    let (x, y) = (-FLAG_W_PX * 0.5, -FLAG_H_PX * 0.5);

    match flag_fill(&player.flag, images, fallback) {
        FlagFill::Image(image) => ctx.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, FLAG_W_PX, FLAG_H_PX)?,
        FlagFill::Color(color) => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(x, y, FLAG_W_PX, FLAG_H_PX);
        }
    }
    ctx.set_stroke_style_str(COAST_COLOR);
    ctx.set_line_width(0.5);
    ctx.stroke_rect(x, y, FLAG_W_PX, FLAG_H_PX);

    ctx.restore();
    Ok(())
}

/// What actually lands in a flag's rectangle.
#[derive(Debug, PartialEq)]
enum FlagFill<'a, I> {
    Image(&'a I),
    Color(&'a str),
}

/// An image the core reports as loaded can still be missing from `images` for a
/// frame; it then paints like any other fallback flag.
fn flag_fill<'a, I>(paint: &'a FlagPaint, images: &'a HashMap<String, I>, fallback: &'a str) -> FlagFill<'a, I> {
    match paint {
        FlagPaint::Image(url) => images.get(url).map_or(FlagFill::Color(fallback), FlagFill::Image),
        FlagPaint::Fallback(color) => FlagFill::Color(color),
    }
}

fn draw_camera(ctx: &CanvasRenderingContext2d, camera: &CameraMarker) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(CAMERA_COLOR);
    ctx.set_fill_style_str(CAMERA_COLOR);
    ctx.set_line_width(0.75);

    // Sight line to the look-at point.
    if let Some(focus) = camera.focus {
        let dash = js_sys::Array::new();
        dash.push(&JsValue::from_f64(2.0));
        dash.push(&JsValue::from_f64(2.0));
        ctx.set_line_dash(&dash)?;
        ctx.begin_path();
        ctx.move_to(camera.at.x, camera.at.y);
        ctx.line_to(focus.x, focus.y);
        ctx.stroke();
        ctx.set_line_dash(&js_sys::Array::new())?;
    }

    ctx.translate(camera.at.x, camera.at.y)?;
    ctx.rotate(camera.angle)?;
    ctx.begin_path();
    ctx.move_to(CAMERA_ARROW_PX, 0.0);
    ctx.line_to(-CAMERA_ARROW_PX * 0.5, CAMERA_ARROW_PX * 0.5);
    ctx.line_to(-CAMERA_ARROW_PX * 0.25, 0.0);
    ctx.line_to(-CAMERA_ARROW_PX * 0.5, -CAMERA_ARROW_PX * 0.5);
    ctx.close_path();
    ctx.fill();

    ctx.restore();
    Ok(())
}

// =============================================================
// Leaderboard
// =============================================================

/// Draw the standings table with a compass readout underneath.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_leaderboard(
    ctx: &CanvasRenderingContext2d,
    rows: &[Standing],
    heading: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    let width = 220.0;
    #[allow(clippy::cast_precision_loss)]
    let height = LEADERBOARD_ROW_PX * (rows.len() as f64 + 1.0) + LEADERBOARD_PAD_PX * 2.0;

    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_fill_style_str("rgba(10, 20, 30, 0.55)");
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_text_baseline("middle");
    let mut y = LEADERBOARD_PAD_PX + LEADERBOARD_ROW_PX * 0.5;
    for row in rows {
        let weight = if row.is_local { "bold " } else { "" };
        ctx.set_font(&format!("{weight}12px sans-serif"));

        ctx.set_fill_style_str(&row.color);
        ctx.fill_rect(LEADERBOARD_PAD_PX, y - 4.0, 8.0, 8.0);

        ctx.set_fill_style_str("#F5F5F5");
        ctx.set_text_align("left");
        ctx.fill_text(&format!("{}. {}", row.rank, row.name), LEADERBOARD_PAD_PX + 14.0, y)?;
        ctx.set_text_align("right");
        ctx.fill_text(&format!("{} / {}", row.islands, row.ships), width - LEADERBOARD_PAD_PX, y)?;

        y += LEADERBOARD_ROW_PX;
    }

    ctx.set_font("bold 12px sans-serif");
    ctx.set_text_align("center");
    ctx.set_fill_style_str("#F5F5F5");
    ctx.fill_text(compass_label(heading), width * 0.5, y)?;
    Ok(())
}
