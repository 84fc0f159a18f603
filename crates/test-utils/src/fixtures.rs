//! Common grid fixtures.

/// Georeferencing of a small synthetic grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridExtent {
    pub width: usize,
    pub height: usize,
    pub xll_corner: f64,
    pub yll_corner: f64,
    pub cellsize: f64,
}

impl GridExtent {
    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Bounds as (west, south, east, north).
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.xll_corner,
            self.yll_corner,
            self.xll_corner + self.width as f64 * self.cellsize,
            self.yll_corner + self.height as f64 * self.cellsize,
        )
    }
}

/// 2x2 grid around the origin, one degree cells.
pub const TINY_2X2: GridExtent = GridExtent {
    width: 2,
    height: 2,
    xll_corner: -1.0,
    yll_corner: -1.0,
    cellsize: 1.0,
};

/// Iberian peninsula at 0.5 degrees.
pub const IBERIA: GridExtent = GridExtent {
    width: 26,
    height: 18,
    xll_corner: -10.0,
    yll_corner: 35.0,
    cellsize: 0.5,
};

/// Global grid at 1 degree, cut at the Mercator limits.
pub const GLOBAL_1DEG: GridExtent = GridExtent {
    width: 360,
    height: 170,
    xll_corner: -180.0,
    yll_corner: -85.0,
    cellsize: 1.0,
};

/// Small ASCII grid with one NODATA cell.
pub const SAMPLE_ASCII_GRID: &str = "\
ncols 4
nrows 3
xllcorner -3.5
yllcorner 40.0
cellsize 0.5
NODATA_value -9999
1 2 3 4
5 6 -9999 8
9 10 11 12
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_bbox() {
        assert_eq!(IBERIA.bbox(), (-10.0, 35.0, 3.0, 44.0));
        assert_eq!(IBERIA.size(), 468);
    }
}
