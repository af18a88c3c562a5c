use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement};

use worldanthem_shared::MapView;
use worldanthem_shared::layer::{CountriesLayer, MARKER_HEIGHT, MARKER_WIDTH, MarkerLayer};
use worldanthem_shared::view::TILE_SIZE;
use worldanthem_shared::{CountryFeature, MapLayer};

use crate::tiles::TileCache;

const BACKGROUND: &str = "#dddddd";
const MARKER_FILL: &str = "#2a81cb";
const MARKER_STROKE: &str = "#3274a3";
/// Rings of off-screen tiles kept around the viewport.
const TILE_RETAIN_MARGIN: i64 = 2;

/// Match the backing store to the CSS size and device pixel ratio. Returns
/// the CSS size, or `None` while the canvas is not laid out.
pub fn fit_to_parent(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) -> Option<(f64, f64)> {
    let parent = canvas.parent_element()?;
    let w = parent.client_width();
    let h = parent.client_height();
    if w <= 0 || h <= 0 {
        return None;
    }
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0);
    let bw = (f64::from(w) * dpr).round() as u32;
    let bh = (f64::from(h) * dpr).round() as u32;
    if canvas.width() != bw || canvas.height() != bh {
        canvas.set_width(bw);
        canvas.set_height(bh);
    }
    // Resizing resets context state, so the transform is always reapplied.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
    Some((f64::from(w), f64::from(h)))
}

/// Draw one frame: base tiles, then the interactive layer.
pub fn paint(ctx: &CanvasRenderingContext2d, view: &MapView, tiles: Option<&TileCache>, layer: &MapLayer) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, view.width, view.height);

    if let Some(tiles) = tiles {
        draw_tiles(ctx, view, tiles);
    }

    match layer {
        MapLayer::Pending => {}
        MapLayer::Boundaries(countries) => draw_countries(ctx, view, countries),
        MapLayer::Fallback(markers) => draw_markers(ctx, view, markers),
    }
}

fn draw_tiles(ctx: &CanvasRenderingContext2d, view: &MapView, tiles: &TileCache) {
    for tile in view.visible_tiles() {
        let Some(image) = tiles.get_or_request(tile) else {
            continue;
        };
        let (sx, sy) = view.tile_origin(tile);
        // Snap outward so neighbouring tiles overlap instead of leaving seams
        let x0 = sx.floor();
        let y0 = sy.floor();
        let size = (sx + TILE_SIZE).ceil() - x0;
        ctx.draw_image_with_html_image_element_and_dw_and_dh(&image, x0, y0, size, size)
            .ok();
    }
    tiles.retain(&view.retained_tile_keys(TILE_RETAIN_MARGIN));
}

fn draw_countries(ctx: &CanvasRenderingContext2d, view: &MapView, layer: &CountriesLayer) {
    ctx.set_line_join("round");
    for entry in layer.render_order() {
        if !trace_feature(ctx, view, &entry.feature) {
            continue;
        }
        let style = &entry.style;
        ctx.set_fill_style_str(&style.fill_css());
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        ctx.set_stroke_style_str(&style.stroke_css());
        ctx.set_line_width(style.weight);
        ctx.stroke();
    }
}

/// Build the feature's path. Returns `false` when it has nothing on screen.
fn trace_feature(ctx: &CanvasRenderingContext2d, view: &MapView, feature: &CountryFeature) -> bool {
    let Some(bounds) = feature.bounds() else {
        return false;
    };
    let (x0, y1) = view.lnglat_to_screen(bounds.min().x, bounds.min().y);
    let (x1, y0) = view.lnglat_to_screen(bounds.max().x, bounds.max().y);
    if x1 < 0.0 || y1 < 0.0 || x0 > view.width || y0 > view.height {
        return false;
    }

    ctx.begin_path();
    for polygon in feature.boundary.0.iter() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            let mut points = ring.coords();
            let Some(first) = points.next() else {
                continue;
            };
            let (sx, sy) = view.lnglat_to_screen(first.x, first.y);
            ctx.move_to(sx, sy);
            for coord in points {
                let (sx, sy) = view.lnglat_to_screen(coord.x, coord.y);
                ctx.line_to(sx, sy);
            }
            ctx.close_path();
        }
    }
    true
}

fn draw_markers(ctx: &CanvasRenderingContext2d, view: &MapView, layer: &MarkerLayer) {
    for marker in layer.markers() {
        let (px, py) = view.latlng_to_screen(marker.position);
        if px < -MARKER_WIDTH || px > view.width + MARKER_WIDTH || py < 0.0 || py > view.height + MARKER_HEIGHT {
            continue;
        }
        draw_pin(ctx, px, py);
    }
}

/// Teardrop pin with its tip at `(x, y)`.
fn draw_pin(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
    let radius = MARKER_WIDTH / 2.0;
    let cy = y - MARKER_HEIGHT + radius;
    // Half-angle between the tangent points as seen from the head's center
    let spread = (radius / (y - cy)).acos();

    ctx.begin_path();
    ctx.move_to(x, y);
    ctx.arc(x, cy, radius, PI / 2.0 + spread, 2.0 * PI + PI / 2.0 - spread)
        .ok();
    ctx.close_path();
    ctx.set_fill_style_str(MARKER_FILL);
    ctx.fill();
    ctx.set_stroke_style_str(MARKER_STROKE);
    ctx.set_line_width(1.0);
    ctx.stroke();

    ctx.begin_path();
    ctx.arc(x, cy, radius * 0.4, 0.0, 2.0 * PI).ok();
    ctx.set_fill_style_str("#ffffff");
    ctx.fill();
}
