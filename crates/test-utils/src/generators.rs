//! Synthetic scalar grids with predictable values.
//!
//! All generators return row-major `Vec<f32>` (row 0 is the northern edge);
//! `NaN` marks a missing cell.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a smooth gradient from `min` (top-left) to `max` (bottom-right).
pub fn create_gradient_grid(width: usize, height: usize, min: f32, max: f32) -> Vec<f32> {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let t = (col + row) as f32 / span;
            data.push(min + (max - min) * t);
        }
    }
    data
}

/// Creates a grid with temperature-like values in Celsius.
///
/// Colder towards the north (row 0), with a gentle east-west wave.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let y_factor = row as f32 / height.max(1) as f32;
            let wave = ((col as f32 / width.max(1) as f32) * std::f32::consts::PI * 2.0).sin();
            data.push(-20.0 + y_factor * 50.0 + wave * 3.0);
        }
    }
    data
}

/// Creates a constant grid.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid where every `every`-th cell (in flat order) is missing.
///
/// The remaining cells hold their flat index as value.
pub fn create_grid_with_gaps(width: usize, height: usize, every: usize) -> Vec<f32> {
    let every = every.max(1);
    (0..width * height)
        .map(|i| if i % every == 0 { f32::NAN } else { i as f32 })
        .collect()
}

/// Renders values as ESRI ASCII grid text.
///
/// `NaN` cells are written as `no_data`.
pub fn ascii_grid_text(
    width: usize,
    height: usize,
    xll_corner: f64,
    yll_corner: f64,
    cellsize: f64,
    values: &[f32],
    no_data: f32,
) -> String {
    let mut out = format!(
        "ncols {}\nnrows {}\nxllcorner {}\nyllcorner {}\ncellsize {}\nNODATA_value {}\n",
        width, height, xll_corner, yll_corner, cellsize, no_data
    );
    for row in values.chunks(width.max(1)) {
        let line: Vec<String> = row
            .iter()
            .map(|v| if v.is_nan() { no_data.to_string() } else { v.to_string() })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
