//! Pixel buffer construction from scalar fields.
//!
//! The buffer holds one RGBA pixel per grid cell in the field's row-major
//! order, so pixel `(row * columns + col) * 4` belongs to cell `(col, row)`.
//! Missing cells keep whatever the buffer already holds; fresh buffers are
//! zeroed, which makes them fully transparent.

use field_common::ScalarField;
use rayon::prelude::*;
use tracing::debug;

use crate::{ColorFn, RenderError, RenderResult};

/// Minimum cell count to fill rows in parallel (256x256)
pub const PARALLEL_THRESHOLD: usize = 256 * 256;

/// Convert a 0-1 alpha fraction to a byte, truncating.
///
/// `0.999` maps to `254`, not `255`.
#[inline]
pub fn alpha_byte(alpha: f64) -> u8 {
    (alpha * 255.0) as u8
}

/// Fill `data` in place with the colors of every non-missing cell.
///
/// `data` must be exactly `4 * columns * rows` bytes long.
pub fn prepare_image_in<F>(data: &mut [u8], field: &F, color: &ColorFn) -> RenderResult<()>
where
    F: ScalarField + ?Sized,
{
    let width = field.columns();
    let height = field.rows();
    let expected = width * height * 4;

    if data.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: data.len(),
        });
    }
    if expected == 0 {
        return Ok(());
    }

    let row_bytes = width * 4;
    if width * height >= PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(j, row)| fill_row(row, j, field, color));
    } else {
        for (j, row) in data.chunks_exact_mut(row_bytes).enumerate() {
            fill_row(row, j, field, color);
        }
    }

    Ok(())
}

/// Allocate a transparent buffer sized for `field` and fill it.
pub fn build_pixel_buffer<F>(field: &F, color: &ColorFn) -> RenderResult<Vec<u8>>
where
    F: ScalarField + ?Sized,
{
    let mut data = vec![0u8; field.len() * 4];
    prepare_image_in(&mut data, field, color)?;

    debug!(
        columns = field.columns(),
        rows = field.rows(),
        bytes = data.len(),
        "Built pixel buffer"
    );
    Ok(data)
}

fn fill_row<F>(row: &mut [u8], j: usize, field: &F, color: &ColorFn)
where
    F: ScalarField + ?Sized,
{
    for (i, px) in row.chunks_exact_mut(4).enumerate() {
        if let Some(v) = field.value_at_indexes(i, j) {
            let (r, g, b, a) = color.color_for(v).rgba();
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = alpha_byte(a);
        }
    }
}
