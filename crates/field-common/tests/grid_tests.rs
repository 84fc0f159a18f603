//! Tests for regular grids and the ASCII grid reader.

use field_common::{ascii_grid, FieldError, GridParams, LatLng, RegularGrid, ScalarField};
use test_utils::{
    ascii_grid_text, create_grid_with_gaps, create_test_grid, temp_test_dir, write_test_file,
    IBERIA, SAMPLE_ASCII_GRID,
};

// ============================================================================
// RegularGrid tests
// ============================================================================

#[test]
fn test_values_are_row_major() {
    let params = GridParams::new(10, 5, 0.0, 0.0, 1.0);
    let grid = RegularGrid::new(params, create_test_grid(10, 5)).unwrap();

    assert_eq!(grid.value_at_indexes(3, 2), Some(3002.0));
    assert_eq!(grid.value_at_indexes(9, 4), Some(9004.0));
    assert_eq!(grid.value_at_indexes(10, 0), None);
}

#[test]
fn test_missing_cells() {
    let params = GridParams::new(4, 2, 0.0, 0.0, 1.0);
    let grid = RegularGrid::new(params, create_grid_with_gaps(4, 2, 3)).unwrap();

    assert_eq!(grid.value_at_indexes(0, 0), None);
    assert_eq!(grid.value_at_indexes(1, 0), Some(1.0));
    assert_eq!(grid.value_at_indexes(3, 0), None);
    assert_eq!(grid.range(), (1.0, 7.0));
}

#[test]
fn test_bounds_use_cell_edges() {
    let params = GridParams::new(IBERIA.width, IBERIA.height, IBERIA.xll_corner, IBERIA.yll_corner, IBERIA.cellsize);
    let grid = RegularGrid::new(params, vec![0.0; IBERIA.size()]).unwrap();
    let b = grid.bounds();

    assert_eq!((b.west, b.south, b.east, b.north), IBERIA.bbox());
}

#[test]
fn test_corner_centres_are_inside_bounds() {
    let params = GridParams::new(4, 3, -3.5, 40.0, 0.5);
    let grid = RegularGrid::new(params, vec![0.0; 12]).unwrap();
    let b = grid.bounds();

    for (i, j) in [(0, 0), (3, 0), (0, 2), (3, 2)] {
        assert!(b.contains(LatLng::from_lon_lat(grid.lon_lat_at_indexes(i, j))));
    }
}

#[test]
fn test_non_positive_cell_size_rejected() {
    let params = GridParams::new(2, 2, 0.0, 0.0, 0.0);
    let err = RegularGrid::new(params, vec![0.0; 4]).unwrap_err();
    assert!(matches!(err, FieldError::InvalidDimensions(_)));
}

// ============================================================================
// ASCII grid tests
// ============================================================================

#[test]
fn test_parse_sample_grid() {
    let grid = ascii_grid::parse(SAMPLE_ASCII_GRID).unwrap();

    assert_eq!(grid.columns(), 4);
    assert_eq!(grid.rows(), 3);
    assert_eq!(grid.value_at_indexes(0, 0), Some(1.0));
    assert_eq!(grid.value_at_indexes(2, 1), None);
    assert_eq!(grid.value_at_indexes(3, 2), Some(12.0));
    assert_eq!(grid.range(), (1.0, 12.0));

    // Top-left centre: west edge + half cell, north edge - half cell
    assert_eq!(grid.lon_lat_at_indexes(0, 0), [-3.25, 41.25]);
}

#[test]
fn test_parse_center_registration() {
    let text = "ncols 2\nnrows 1\nxllcenter 0.5\nyllcenter 10.5\ncellsize 1\n1 2\n";
    let grid = ascii_grid::parse(text).unwrap();

    assert_eq!(grid.params().xll_corner, 0.0);
    assert_eq!(grid.params().yll_corner, 10.0);
    assert_eq!(grid.lon_lat_at_indexes(1, 0), [1.5, 10.5]);
}

#[test]
fn test_parse_separate_cell_sizes() {
    let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ndx 2\ndy 0.5\n1 2\n3 4\n";
    let grid = ascii_grid::parse(text).unwrap();

    assert_eq!(grid.params().cell_x_size, 2.0);
    assert_eq!(grid.params().cell_y_size, 0.5);
}

#[test]
fn test_parse_missing_header() {
    let text = "ncols 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
    let err = ascii_grid::parse(text).unwrap_err();
    assert!(matches!(err, FieldError::MissingHeader("nrows")));
}

#[test]
fn test_parse_unknown_header_key() {
    let text = "ncols 1\nnrows 1\nflavour vanilla\n";
    let err = ascii_grid::parse(text).unwrap_err();
    assert!(matches!(err, FieldError::InvalidHeader { line: 3, .. }));
}

#[test]
fn test_parse_bad_value() {
    let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 x2\n";
    let err = ascii_grid::parse(text).unwrap_err();
    assert!(matches!(err, FieldError::InvalidValue { position: 1, .. }));
}

#[test]
fn test_parse_wrong_count() {
    let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
    let err = ascii_grid::parse(text).unwrap_err();
    assert!(matches!(err, FieldError::ShapeMismatch { expected: 4, actual: 3, .. }));
}

#[test]
fn test_parse_overflowing_dimensions() {
    let text = "ncols 10000000000\nnrows 10000000000\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
    assert!(matches!(
        ascii_grid::parse(text),
        Err(FieldError::InvalidDimensions(_))
    ));
}

#[test]
fn test_parse_huge_header_with_short_data() {
    // Fits in usize but must not be allocated up front
    let text = "ncols 3000000000\nnrows 3000000000\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
    assert!(matches!(
        ascii_grid::parse(text),
        Err(FieldError::ShapeMismatch { actual: 3, .. })
    ));
}

#[test]
fn test_new_rejects_overflowing_dimensions() {
    let params = GridParams::new(usize::MAX, 2, 0.0, 0.0, 1.0);
    assert!(matches!(
        RegularGrid::new(params, vec![1.0]),
        Err(FieldError::InvalidDimensions(_))
    ));
}

#[test]
fn test_read_file_round_trip() {
    let values = create_grid_with_gaps(5, 4, 7);
    let text = ascii_grid_text(5, 4, 10.0, 20.0, 0.25, &values, -9999.0);

    let dir = temp_test_dir();
    let path = write_test_file(&dir, "field.asc", &text);
    let grid = ascii_grid::read_file(&path).unwrap();

    assert_eq!(grid.columns(), 5);
    assert_eq!(grid.rows(), 4);
    assert_eq!(grid.valid_count(), values.iter().filter(|v| !v.is_nan()).count());
}

#[test]
fn test_read_missing_file() {
    let err = ascii_grid::read_file("/definitely/not/here.asc").unwrap_err();
    assert!(matches!(err, FieldError::IoError(_)));
}
