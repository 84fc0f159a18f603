//! Scalar fields on regular geographic grids.

use crate::{FieldError, FieldResult, LatLngBounds};
use serde::{Deserialize, Serialize};

/// A geographic position, latitude first as map hosts expect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a field coordinate pair, which is ordered `[lon, lat]`.
    pub fn from_lon_lat(lon_lat: [f64; 2]) -> Self {
        let [lng, lat] = lon_lat;
        Self { lat, lng }
    }
}

/// A 2D grid of numeric samples with a geographic position per cell.
///
/// Cells are addressed by column `i` and row `j`; row 0 is the northern edge
/// and the flat order is row-major.
pub trait ScalarField: Send + Sync {
    /// Number of columns (cells along longitude).
    fn columns(&self) -> usize;

    /// Number of rows (cells along latitude).
    fn rows(&self) -> usize;

    /// Value of the cell, or `None` when the cell is missing.
    fn value_at_indexes(&self, i: usize, j: usize) -> Option<f64>;

    /// Coordinates of the cell centre as `[lon, lat]`.
    fn lon_lat_at_indexes(&self, i: usize, j: usize) -> [f64; 2];

    /// Global `(min, max)` of the non-missing values.
    fn range(&self) -> (f64, f64);

    /// Cell containing a geographic position, if inside the grid.
    fn indexes_at(&self, at: LatLng) -> Option<(usize, usize)>;

    /// Geographic extent of the field.
    fn bounds(&self) -> LatLngBounds;

    /// Value of the cell under a geographic position.
    fn value_at(&self, at: LatLng) -> Option<f64> {
        let (i, j) = self.indexes_at(at)?;
        self.value_at_indexes(i, j)
    }

    /// Total number of cells.
    fn len(&self) -> usize {
        self.columns() * self.rows()
    }

    fn is_empty(&self) -> bool {
        self.columns() == 0 || self.rows() == 0
    }
}

/// Georeferencing of a regular lat/lon grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub ncols: usize,
    pub nrows: usize,
    /// Longitude of the lower-left corner (cell edge, not centre)
    pub xll_corner: f64,
    /// Latitude of the lower-left corner (cell edge, not centre)
    pub yll_corner: f64,
    pub cell_x_size: f64,
    pub cell_y_size: f64,
}

impl GridParams {
    /// Square cells.
    pub fn new(ncols: usize, nrows: usize, xll_corner: f64, yll_corner: f64, cellsize: f64) -> Self {
        Self {
            ncols,
            nrows,
            xll_corner,
            yll_corner,
            cell_x_size: cellsize,
            cell_y_size: cellsize,
        }
    }

    /// Latitude of the upper edge.
    pub fn yur_corner(&self) -> f64 {
        self.yll_corner + self.nrows as f64 * self.cell_y_size
    }

    /// Longitude of the right edge.
    pub fn xur_corner(&self) -> f64 {
        self.xll_corner + self.ncols as f64 * self.cell_x_size
    }
}

/// In-memory scalar field on a regular grid.
///
/// Values are stored row-major from north to south; `NaN` marks a missing
/// cell.
#[derive(Debug, Clone)]
pub struct RegularGrid {
    params: GridParams,
    values: Vec<f32>,
    range: (f64, f64),
}

impl RegularGrid {
    /// Create a grid, checking that `values` holds exactly `ncols * nrows`
    /// samples.
    pub fn new(params: GridParams, values: Vec<f32>) -> FieldResult<Self> {
        if params.cell_x_size <= 0.0 || params.cell_y_size <= 0.0 {
            return Err(FieldError::InvalidDimensions(format!(
                "cell size must be positive, got {}x{}",
                params.cell_x_size, params.cell_y_size
            )));
        }

        let expected = params.ncols.checked_mul(params.nrows).ok_or_else(|| {
            FieldError::InvalidDimensions(format!(
                "{}x{} cells overflow",
                params.ncols, params.nrows
            ))
        })?;
        if values.len() != expected {
            return Err(FieldError::ShapeMismatch {
                columns: params.ncols,
                rows: params.nrows,
                expected,
                actual: values.len(),
            });
        }

        let range = compute_range(&values);
        Ok(Self {
            params,
            values,
            range,
        })
    }

    /// Create a grid where cells equal to `no_data` are treated as missing.
    pub fn with_no_data(params: GridParams, mut values: Vec<f32>, no_data: f32) -> FieldResult<Self> {
        for v in values.iter_mut() {
            if *v == no_data {
                *v = f32::NAN;
            }
        }
        Self::new(params, values)
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Raw row-major samples (`NaN` for missing).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

impl ScalarField for RegularGrid {
    fn columns(&self) -> usize {
        self.params.ncols
    }

    fn rows(&self) -> usize {
        self.params.nrows
    }

    fn value_at_indexes(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.params.ncols || j >= self.params.nrows {
            return None;
        }
        let v = self.values[j * self.params.ncols + i];
        if v.is_nan() {
            None
        } else {
            Some(v as f64)
        }
    }

    fn lon_lat_at_indexes(&self, i: usize, j: usize) -> [f64; 2] {
        let p = &self.params;
        let lon = p.xll_corner + 0.5 * p.cell_x_size + i as f64 * p.cell_x_size;
        let lat = p.yur_corner() - 0.5 * p.cell_y_size - j as f64 * p.cell_y_size;
        [lon, lat]
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }

    fn indexes_at(&self, at: LatLng) -> Option<(usize, usize)> {
        let p = &self.params;
        let i = ((at.lng - p.xll_corner) / p.cell_x_size).floor();
        let j = ((p.yur_corner() - at.lat) / p.cell_y_size).floor();

        if !i.is_finite() || !j.is_finite() || i < 0.0 || j < 0.0 {
            return None;
        }
        let (i, j) = (i as usize, j as usize);
        if i >= p.ncols || j >= p.nrows {
            return None;
        }
        Some((i, j))
    }

    fn bounds(&self) -> LatLngBounds {
        let p = &self.params;
        LatLngBounds::new(p.yll_corner, p.xll_corner, p.yur_corner(), p.xur_corner())
    }
}

/// `(min, max)` over non-NaN values; `(0.0, 0.0)` when every cell is missing.
fn compute_range(values: &[f32]) -> (f64, f64) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }

    if min > max {
        (0.0, 0.0)
    } else {
        (min as f64, max as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> RegularGrid {
        // 3 columns x 2 rows, 1 degree cells, lower-left at (10E, 40N)
        let params = GridParams::new(3, 2, 10.0, 40.0, 1.0);
        RegularGrid::new(params, vec![1.0, 2.0, 3.0, 4.0, f32::NAN, 6.0]).unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let params = GridParams::new(3, 2, 0.0, 0.0, 1.0);
        let err = RegularGrid::new(params, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { expected: 6, actual: 5, .. }));
    }

    #[test]
    fn test_cell_centres() {
        let grid = sample_grid();
        assert_eq!(grid.lon_lat_at_indexes(0, 0), [10.5, 41.5]);
        assert_eq!(grid.lon_lat_at_indexes(2, 1), [12.5, 40.5]);
    }

    #[test]
    fn test_range_skips_missing() {
        let grid = sample_grid();
        assert_eq!(grid.range(), (1.0, 6.0));
        assert_eq!(grid.valid_count(), 5);
    }

    #[test]
    fn test_all_missing_range() {
        let params = GridParams::new(2, 1, 0.0, 0.0, 1.0);
        let grid = RegularGrid::new(params, vec![f32::NAN, f32::NAN]).unwrap();
        assert_eq!(grid.range(), (0.0, 0.0));
    }

    #[test]
    fn test_value_at_position() {
        let grid = sample_grid();
        assert_eq!(grid.value_at(LatLng::new(41.9, 10.1)), Some(1.0));
        assert_eq!(grid.value_at(LatLng::new(40.2, 12.7)), Some(6.0));
        assert_eq!(grid.value_at(LatLng::new(40.5, 11.5)), None);
        assert_eq!(grid.value_at(LatLng::new(39.0, 11.0)), None);
    }

    #[test]
    fn test_from_lon_lat_swaps_order() {
        let ll = LatLng::from_lon_lat([10.5, 41.5]);
        assert_eq!(ll.lat, 41.5);
        assert_eq!(ll.lng, 10.5);
    }
}
