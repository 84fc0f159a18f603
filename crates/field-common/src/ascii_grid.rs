//! ESRI ASCII grid reader.
//!
//! Format:
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcorner    -3.5
//! yllcorner    40.0
//! cellsize     0.5
//! NODATA_value -9999
//! 1 2 3 4
//! 5 6 -9999 8
//! ```
//!
//! `xllcenter`/`yllcenter` are accepted in place of the corner keys, and
//! `dx`/`dy` in place of `cellsize`. Rows run from north to south.

use crate::{FieldError, FieldResult, GridParams, RegularGrid};
use std::path::Path;
use tracing::debug;

/// Upper bound on values reserved up front from the header (16M cells)
const MAX_PREALLOCATED_CELLS: usize = 1 << 24;

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<f64>,
    yll: Option<f64>,
    xll_is_center: bool,
    yll_is_center: bool,
    dx: Option<f64>,
    dy: Option<f64>,
    no_data: Option<f32>,
}

/// Read an ASCII grid file.
pub fn read_file(path: impl AsRef<Path>) -> FieldResult<RegularGrid> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let grid = parse(&content)?;
    debug!(path = %path.display(), "Loaded ASCII grid");
    Ok(grid)
}

/// Parse ASCII grid text.
pub fn parse(content: &str) -> FieldResult<RegularGrid> {
    let mut header = Header::default();
    let mut lines = content.lines().enumerate().peekable();

    // Header lines start with a keyword; the first numeric line ends them.
    while let Some((idx, line)) = lines.peek().copied() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.next();
            continue;
        }
        let starts_alpha = trimmed
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false);
        if !starts_alpha {
            break;
        }
        parse_header_line(&mut header, idx + 1, trimmed)?;
        lines.next();
    }

    let ncols = header.ncols.ok_or(FieldError::MissingHeader("ncols"))?;
    let nrows = header.nrows.ok_or(FieldError::MissingHeader("nrows"))?;
    let xll = header.xll.ok_or(FieldError::MissingHeader("xllcorner"))?;
    let yll = header.yll.ok_or(FieldError::MissingHeader("yllcorner"))?;
    let dx = header.dx.ok_or(FieldError::MissingHeader("cellsize"))?;
    let dy = header.dy.unwrap_or(dx);

    let params = GridParams {
        ncols,
        nrows,
        xll_corner: if header.xll_is_center { xll - dx / 2.0 } else { xll },
        yll_corner: if header.yll_is_center { yll - dy / 2.0 } else { yll },
        cell_x_size: dx,
        cell_y_size: dy,
    };

    let cells = ncols.checked_mul(nrows).ok_or_else(|| {
        FieldError::InvalidDimensions(format!("{}x{} cells overflow", ncols, nrows))
    })?;

    // The header is untrusted; short data is caught by the shape check.
    let mut values = Vec::with_capacity(cells.min(MAX_PREALLOCATED_CELLS));
    for (_, line) in lines {
        for token in line.split_whitespace() {
            let v: f32 = token.parse().map_err(|_| FieldError::InvalidValue {
                token: token.to_string(),
                position: values.len(),
            })?;
            values.push(v);
        }
    }

    match header.no_data {
        Some(no_data) => RegularGrid::with_no_data(params, values, no_data),
        None => RegularGrid::new(params, values),
    }
}

fn parse_header_line(header: &mut Header, line: usize, text: &str) -> FieldResult<()> {
    let mut parts = text.split_whitespace();
    let key = parts.next().unwrap_or_default().to_ascii_lowercase();
    let raw = parts.next().ok_or_else(|| FieldError::InvalidHeader {
        line,
        message: format!("'{}' has no value", key),
    })?;

    let invalid = |what: &str| FieldError::InvalidHeader {
        line,
        message: format!("invalid {} '{}'", what, raw),
    };
    let float = || raw.parse::<f64>().map_err(|_| invalid("number"));

    match key.as_str() {
        "ncols" => header.ncols = Some(raw.parse().map_err(|_| invalid("ncols"))?),
        "nrows" => header.nrows = Some(raw.parse().map_err(|_| invalid("nrows"))?),
        "xllcorner" => header.xll = Some(float()?),
        "yllcorner" => header.yll = Some(float()?),
        "xllcenter" => {
            header.xll = Some(float()?);
            header.xll_is_center = true;
        }
        "yllcenter" => {
            header.yll = Some(float()?);
            header.yll_is_center = true;
        }
        "cellsize" => {
            let size = float()?;
            header.dx = Some(size);
            header.dy = Some(size);
        }
        "dx" | "xcellsize" => header.dx = Some(float()?),
        "dy" | "ycellsize" => header.dy = Some(float()?),
        "nodata_value" => header.no_data = Some(raw.parse().map_err(|_| invalid("NODATA_value"))?),
        _ => {
            return Err(FieldError::InvalidHeader {
                line,
                message: format!("unknown key '{}'", key),
            })
        }
    }
    Ok(())
}
