//! Placing a decoded field bitmap on the map.
//!
//! Three cell centres anchor the image: top-left `(0, 0)`, top-right
//! `(columns - 1, 0)` and bottom-left `(0, rows - 1)`. Their projected
//! container positions give the on-screen width and height; the bitmap is
//! then drawn at native size under a translate + scale transform so the
//! surface's own filtering does the stretch.
//!
//! Rotated or flipped views can yield negative sizes. They are passed
//! through unchanged and mirror the image.

use field_common::{LatLng, ScalarField};
use tracing::trace;

use crate::surface::with_saved_state;
use crate::{DecodedBitmap, DrawingSurface, MapHost, ScreenPoint};

/// Geographic reference corners of a grid, latitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAnchors {
    pub top_left: LatLng,
    pub top_right: LatLng,
    pub bottom_left: LatLng,
    pub columns: usize,
    pub rows: usize,
}

impl GridAnchors {
    pub fn from_field<F>(field: &F) -> Self
    where
        F: ScalarField + ?Sized,
    {
        let columns = field.columns();
        let rows = field.rows();
        let last_col = columns.saturating_sub(1);
        let last_row = rows.saturating_sub(1);

        Self {
            top_left: LatLng::from_lon_lat(field.lon_lat_at_indexes(0, 0)),
            top_right: LatLng::from_lon_lat(field.lon_lat_at_indexes(last_col, 0)),
            bottom_left: LatLng::from_lon_lat(field.lon_lat_at_indexes(0, last_row)),
            columns,
            rows,
        }
    }
}

/// On-screen position and size of the grid image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top_left: ScreenPoint,
    pub screen_width: f64,
    pub screen_height: f64,
    pub columns: usize,
    pub rows: usize,
}

impl Placement {
    /// Placement from already projected corners.
    pub fn from_points(
        top_left: ScreenPoint,
        top_right: ScreenPoint,
        bottom_left: ScreenPoint,
        columns: usize,
        rows: usize,
    ) -> Self {
        Self {
            top_left,
            screen_width: top_right.x - top_left.x,
            screen_height: bottom_left.y - top_left.y,
            columns,
            rows,
        }
    }

    /// Project the anchors through the host's current viewport.
    pub fn compute<H>(anchors: &GridAnchors, host: &H) -> Self
    where
        H: MapHost + ?Sized,
    {
        Self::from_points(
            host.latlng_to_container_point(anchors.top_left),
            host.latlng_to_container_point(anchors.top_right),
            host.latlng_to_container_point(anchors.bottom_left),
            anchors.columns,
            anchors.rows,
        )
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.top_left.x + 0.5 * self.screen_width,
            self.top_left.y + 0.5 * self.screen_height,
        )
    }

    /// Screen pixels per grid cell along x and y.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.screen_width / self.columns as f64,
            self.screen_height / self.rows as f64,
        )
    }

    /// Equivalent destination rectangle `(x, y, width, height)`.
    pub fn destination_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.top_left.x,
            self.top_left.y,
            self.screen_width,
            self.screen_height,
        )
    }

    /// Draw `bitmap` centred on the placement, restoring the surface
    /// transform afterwards.
    pub fn draw<S>(&self, surface: &mut S, bitmap: &DecodedBitmap)
    where
        S: DrawingSurface + ?Sized,
    {
        let center = self.center();
        let (sx, sy) = self.scale();
        let half_w = 0.5 * self.columns as f32;
        let half_h = 0.5 * self.rows as f32;

        with_saved_state(surface, |s| {
            s.translate(center.x as f32, center.y as f32);
            s.scale(sx as f32, sy as f32);
            s.draw_bitmap(bitmap, -half_w, -half_h);
        });
    }
}

/// Composite the current bitmap onto the host surface.
///
/// Returns `None` without touching the host when no bitmap is available.
pub fn draw_image<H>(
    host: &mut H,
    anchors: &GridAnchors,
    bitmap: Option<&DecodedBitmap>,
) -> Option<Placement>
where
    H: MapHost + ?Sized,
{
    let bitmap = bitmap?;
    let placement = Placement::compute(anchors, host);
    trace!(
        x = placement.top_left.x,
        y = placement.top_left.y,
        width = placement.screen_width,
        height = placement.screen_height,
        "Compositing field bitmap"
    );
    placement.draw(host.drawing_surface(), bitmap);
    Some(placement)
}
