use std::collections::HashSet;
use std::f64::consts::PI;
use std::ops::RangeInclusive;

use serde::Deserialize;

pub const DEFAULT_CENTER: LatLng = LatLng::new(20.0, 0.0);
pub const DEFAULT_ZOOM: u8 = 2;
pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;

pub const TILE_SIZE: f64 = 256.0;
/// Web Mercator cannot represent the poles; latitudes are clamped here.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

pub const OSM_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_SUBDOMAINS: &[&str] = &["a", "b", "c"];
pub const OSM_ATTRIBUTION_TEXT: &str = "OpenStreetMap";
pub const OSM_ATTRIBUTION_URL: &str = "https://www.openstreetmap.org/copyright";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Side length in pixels of the whole world at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom)
}

/// Project to spherical Mercator world pixels at `zoom`.
pub fn project(latlng: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (latlng.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lng)
}

/// Base tile layer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    pub template: &'static str,
    pub subdomains: &'static [&'static str],
    pub attribution_text: &'static str,
    pub attribution_url: &'static str,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl TileSource {
    pub const fn openstreetmap() -> Self {
        Self {
            template: OSM_TILE_TEMPLATE,
            subdomains: OSM_SUBDOMAINS,
            attribution_text: OSM_ATTRIBUTION_TEXT,
            attribution_url: OSM_ATTRIBUTION_URL,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn url(&self, tile: TileCoord) -> String {
        let x = tile.wrapped_x();
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let index = (x + tile.y).unsigned_abs() as usize % self.subdomains.len();
            self.subdomains[index]
        };
        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// A tile position. `x` is unwrapped so tiles repeat horizontally; use
/// [`TileCoord::wrapped_x`] for the source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    pub fn wrapped_x(&self) -> i64 {
        self.x.rem_euclid(1i64 << self.z)
    }

    /// Key shared by all horizontal repeats of the same source tile.
    pub fn source_key(&self) -> (u8, i64, i64) {
        (self.z, self.wrapped_x(), self.y)
    }
}

/// Center/zoom state of the map surface plus its size in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl MapView {
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// World pixel at the top-left corner of the surface.
    fn origin(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    pub fn latlng_to_screen(&self, latlng: LatLng) -> (f64, f64) {
        let (ox, oy) = self.origin();
        let (x, y) = project(latlng, self.zoom);
        (x - ox, y - oy)
    }

    /// Project a GeoJSON `[lng, lat]` coordinate pair.
    pub fn lnglat_to_screen(&self, lng: f64, lat: f64) -> (f64, f64) {
        self.latlng_to_screen(LatLng::new(lat, lng))
    }

    pub fn screen_to_latlng(&self, sx: f64, sy: f64) -> LatLng {
        let (ox, oy) = self.origin();
        unproject(ox + sx, oy + sy, self.zoom)
    }

    /// Pan by a screen-space drag delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = project(self.center, self.zoom);
        let size = world_size(self.zoom);
        self.center = unproject(cx - dx, (cy - dy).clamp(0.0, size), self.zoom);
    }

    /// Change zoom by `delta` levels keeping the point under the cursor fixed.
    /// Returns `false` when already at the bound.
    pub fn zoom_at(&mut self, delta: i32, sx: f64, sy: f64) -> bool {
        let target = (i32::from(self.zoom) + delta).clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM));
        let target = target as u8;
        if target == self.zoom {
            return false;
        }

        let focus = self.screen_to_latlng(sx, sy);
        let (fx, fy) = project(focus, target);
        let cx = fx - (sx - self.width / 2.0);
        let cy = fy - (sy - self.height / 2.0);
        self.zoom = target;
        self.center = unproject(cx, cy.clamp(0.0, world_size(target)), target);
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(1, self.width / 2.0, self.height / 2.0)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(-1, self.width / 2.0, self.height / 2.0)
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    /// Tile columns and rows covering the surface grown by `margin` tiles on
    /// each side. Rows are clamped to the world.
    fn tile_span(&self, margin: i64) -> Option<(RangeInclusive<i64>, RangeInclusive<i64>)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let (ox, oy) = self.origin();
        let rows = 1i64 << self.zoom;
        let x0 = (ox / TILE_SIZE).floor() as i64 - margin;
        let x1 = ((ox + self.width) / TILE_SIZE).floor() as i64 + margin;
        let y0 = ((oy / TILE_SIZE).floor() as i64 - margin).max(0);
        let y1 = (((oy + self.height) / TILE_SIZE).floor() as i64 + margin).min(rows - 1);
        Some((x0..=x1, y0..=y1))
    }

    /// Tiles overlapping the surface, nearest to the center first.
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let Some((xs, ys)) = self.tile_span(0) else {
            return Vec::new();
        };
        let (ox, oy) = self.origin();

        let mut tiles = Vec::new();
        for y in ys {
            for x in xs.clone() {
                tiles.push(TileCoord { z: self.zoom, x, y });
            }
        }

        let mid_x = (ox + self.width / 2.0) / TILE_SIZE;
        let mid_y = (oy + self.height / 2.0) / TILE_SIZE;
        tiles.sort_by(|a, b| {
            let da = (a.x as f64 + 0.5 - mid_x).powi(2) + (a.y as f64 + 0.5 - mid_y).powi(2);
            let db = (b.x as f64 + 0.5 - mid_x).powi(2) + (b.y as f64 + 0.5 - mid_y).powi(2);
            da.total_cmp(&db)
        });
        tiles
    }

    /// Source keys of the visible tiles plus a `margin` ring around them at
    /// the current zoom. Everything else can be dropped from a tile cache.
    pub fn retained_tile_keys(&self, margin: i64) -> HashSet<(u8, i64, i64)> {
        let Some((xs, ys)) = self.tile_span(margin.max(0)) else {
            return HashSet::new();
        };
        let mut keys = HashSet::new();
        for y in ys {
            for x in xs.clone() {
                keys.insert(TileCoord { z: self.zoom, x, y }.source_key());
            }
        }
        keys
    }

    /// Screen position of a tile's top-left corner.
    pub fn tile_origin(&self, tile: TileCoord) -> (f64, f64) {
        let (ox, oy) = self.origin();
        (
            tile.x as f64 * TILE_SIZE - ox,
            tile.y as f64 * TILE_SIZE - oy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn sized_view() -> MapView {
        let mut view = MapView::default();
        view.resize(800.0, 600.0);
        view
    }

    #[test]
    fn default_view_matches_initial_viewpoint() {
        let view = MapView::default();
        assert_eq!(view.center, LatLng::new(20.0, 0.0));
        assert_eq!(view.zoom, 2);
    }

    #[test]
    fn project_unproject_roundtrip() {
        let tokyo = LatLng::new(35.6762, 139.6503);
        let (x, y) = project(tokyo, 5);
        let back = unproject(x, y, 5);
        assert_close(back.lat, tokyo.lat, 1e-9);
        assert_close(back.lng, tokyo.lng, 1e-9);
    }

    #[test]
    fn project_equator_prime_meridian_is_world_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 2);
        assert_close(x, 512.0, 1e-9);
        assert_close(y, 512.0, 1e-9);
    }

    #[test]
    fn center_projects_to_middle_of_surface() {
        let view = sized_view();
        let (sx, sy) = view.latlng_to_screen(view.center);
        assert_close(sx, 400.0, 1e-9);
        assert_close(sy, 300.0, 1e-9);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut view = sized_view();
        assert!(!view.zoom_out());
        assert_eq!(view.zoom, MIN_ZOOM);

        for _ in 0..40 {
            view.zoom_in();
        }
        assert_eq!(view.zoom, MAX_ZOOM);
        assert!(!view.can_zoom_in());
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut view = sized_view();
        let focus = view.screen_to_latlng(620.0, 140.0);
        assert!(view.zoom_at(1, 620.0, 140.0));
        let (sx, sy) = view.latlng_to_screen(focus);
        assert_close(sx, 620.0, 1e-6);
        assert_close(sy, 140.0, 1e-6);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut view = sized_view();
        view.zoom_at(2, 400.0, 300.0);
        let paris = LatLng::new(48.8566, 2.3522);
        let (before_x, before_y) = view.latlng_to_screen(paris);
        view.pan(30.0, -20.0);
        let (after_x, after_y) = view.latlng_to_screen(paris);
        assert_close(after_x - before_x, 30.0, 1e-6);
        assert_close(after_y - before_y, -20.0, 1e-6);
    }

    #[test]
    fn visible_tiles_cover_surface_without_vertical_overflow() {
        let view = sized_view();
        let tiles = view.visible_tiles();
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.z == 2 && (0..4).contains(&t.y)));
    }

    #[test]
    fn retained_keys_cover_visible_tiles_and_drop_far_ones() {
        let mut view = sized_view();
        for _ in 0..8 {
            view.zoom_in();
        }
        let keys = view.retained_tile_keys(1);
        assert!(
            view.visible_tiles()
                .iter()
                .all(|tile| keys.contains(&tile.source_key()))
        );

        let before = view.visible_tiles()[0].source_key();
        view.pan(-4000.0, 0.0);
        let moved = view.retained_tile_keys(1);
        assert!(!moved.contains(&before));
        assert!(moved.len() <= keys.len() + 3 * 2);

        view.zoom_in();
        let zoomed = view.retained_tile_keys(1);
        assert!(zoomed.iter().all(|&(z, _, _)| z == view.zoom));
    }

    #[test]
    fn empty_surface_has_no_tiles() {
        assert!(MapView::default().visible_tiles().is_empty());
    }

    #[test]
    fn tile_url_wraps_x_and_rotates_subdomains() {
        let source = TileSource::openstreetmap();
        let tile = TileCoord { z: 2, x: -1, y: 1 };
        assert_eq!(tile.wrapped_x(), 3);
        assert_eq!(source.url(tile), "https://b.tile.openstreetmap.org/2/3/1.png");

        let origin = TileCoord { z: 3, x: 0, y: 0 };
        assert_eq!(source.url(origin), "https://a.tile.openstreetmap.org/3/0/0.png");
    }

    #[test]
    fn latlng_validity() {
        assert!(LatLng::new(36.2048, 138.2529).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 181.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }
}
