//! Host map abstraction and a standalone Web Mercator viewport.

use field_common::{LatLng, LatLngBounds};
use std::f64::consts::PI;

use crate::{DrawingSurface, PixmapSurface, RenderResult};

/// Web map tile edge in pixels at zoom 0
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// A position in container pixels, origin at the top-left of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a layer needs from the map it is drawn on.
pub trait MapHost {
    /// Current viewport transform from geographic to container pixels.
    fn latlng_to_container_point(&self, at: LatLng) -> ScreenPoint;

    /// Apply the layer opacity to its drawing surface.
    fn apply_opacity(&mut self, opacity: f32);

    /// The surface the layer draws on.
    fn drawing_surface(&mut self) -> &mut dyn DrawingSurface;
}

/// Spherical Web Mercator view: centre, fractional zoom and pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercatorViewport {
    center: LatLng,
    zoom: f64,
    width: u32,
    height: u32,
}

impl WebMercatorViewport {
    pub fn new(center: LatLng, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Largest view of `bounds` that fits in `width` x `height` pixels.
    pub fn fit_bounds(bounds: &LatLngBounds, width: u32, height: u32) -> Self {
        let (x0, y0) = project(bounds.south_west(), 0.0);
        let (x1, y1) = project(bounds.north_east(), 0.0);
        let dx = (x1 - x0).abs().max(f64::EPSILON);
        let dy = (y1 - y0).abs().max(f64::EPSILON);

        let zoom = (width as f64 / dx).log2().min((height as f64 / dy).log2());
        let center = unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0.0);
        Self::new(center, zoom, width, height)
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    /// Move the view by a pixel offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = project(self.center, self.zoom);
        self.center = unproject(cx + dx, cy + dy, self.zoom);
    }

    pub fn project(&self, at: LatLng) -> ScreenPoint {
        let (x, y) = project(at, self.zoom);
        let (ox, oy) = self.pixel_origin();
        ScreenPoint::new(x - ox, y - oy)
    }

    pub fn unproject(&self, p: ScreenPoint) -> LatLng {
        let (ox, oy) = self.pixel_origin();
        unproject(p.x + ox, p.y + oy, self.zoom)
    }

    /// World pixel of the container's top-left corner.
    fn pixel_origin(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        (cx - self.width as f64 / 2.0, cy - self.height as f64 / 2.0)
    }
}

/// World pixel coordinates at `zoom`.
fn project(at: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (at.lng + 180.0) / 360.0;
    let y = 0.5 - ((PI / 4.0) + (lat / 2.0)).tan().ln() / (2.0 * PI);
    (x * scale, y * scale)
}

fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = x / scale * 360.0 - 180.0;
    let merc_y = (0.5 - y / scale) * 2.0 * PI;
    let lat = (2.0 * merc_y.exp().atan() - PI / 2.0).to_degrees();
    LatLng::new(lat, lng)
}

/// Off-screen map: a Web Mercator viewport drawing onto a pixmap.
pub struct PixmapHost {
    viewport: WebMercatorViewport,
    surface: PixmapSurface,
}

impl PixmapHost {
    pub fn new(viewport: WebMercatorViewport) -> RenderResult<Self> {
        let (width, height) = viewport.size();
        Ok(Self {
            viewport,
            surface: PixmapSurface::new(width, height)?,
        })
    }

    pub fn viewport(&self) -> &WebMercatorViewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut WebMercatorViewport {
        &mut self.viewport
    }

    pub fn surface(&self) -> &PixmapSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PixmapSurface {
        &mut self.surface
    }

    pub fn into_surface(self) -> PixmapSurface {
        self.surface
    }
}

impl MapHost for PixmapHost {
    fn latlng_to_container_point(&self, at: LatLng) -> ScreenPoint {
        self.viewport.project(at)
    }

    fn apply_opacity(&mut self, opacity: f32) {
        self.surface.set_opacity(opacity);
    }

    fn drawing_surface(&mut self) -> &mut dyn DrawingSurface {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_middle() {
        let vp = WebMercatorViewport::new(LatLng::new(40.0, -3.0), 5.0, 800, 600);
        let p = vp.project(LatLng::new(40.0, -3.0));
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_zero_world_is_one_tile() {
        let vp = WebMercatorViewport::new(LatLng::new(0.0, 0.0), 0.0, 256, 256);
        let nw = vp.project(LatLng::new(MAX_LATITUDE, -180.0));
        let se = vp.project(LatLng::new(-MAX_LATITUDE, 180.0));
        assert!(nw.x.abs() < 1e-6 && nw.y.abs() < 1e-6);
        assert!((se.x - 256.0).abs() < 1e-6 && (se.y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = WebMercatorViewport::new(LatLng::new(48.8, 2.3), 7.3, 640, 480);
        let at = LatLng::new(45.0, 5.0);
        let back = vp.unproject(vp.project(at));
        assert!((back.lat - at.lat).abs() < 1e-9);
        assert!((back.lng - at.lng).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        let vp = WebMercatorViewport::new(LatLng::new(0.0, 0.0), 3.0, 512, 512);
        let north = vp.project(LatLng::new(10.0, 0.0));
        let south = vp.project(LatLng::new(-10.0, 0.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_fit_bounds_contains_corners() {
        let bounds = LatLngBounds::new(35.0, -10.0, 44.0, 3.0);
        let vp = WebMercatorViewport::fit_bounds(&bounds, 400, 300);

        for corner in [bounds.south_west(), bounds.north_east()] {
            let p = vp.project(corner);
            assert!(p.x >= -1e-6 && p.x <= 400.0 + 1e-6);
            assert!(p.y >= -1e-6 && p.y <= 300.0 + 1e-6);
        }
    }

    #[test]
    fn test_pan_by_moves_points_opposite() {
        let mut vp = WebMercatorViewport::new(LatLng::new(0.0, 0.0), 4.0, 256, 256);
        let at = LatLng::new(5.0, 5.0);
        let before = vp.project(at);
        vp.pan_by(10.0, -20.0);
        let after = vp.project(at);
        assert!((after.x - (before.x - 10.0)).abs() < 1e-6);
        assert!((after.y - (before.y + 20.0)).abs() < 1e-6);
    }
}
