//! Common types shared by the scalar-field raster layer.
//!
//! Provides the scalar field abstraction, geographic coordinates and bounds,
//! and the small color library used to turn values into RGBA.

pub mod ascii_grid;
pub mod bbox;
pub mod color;
pub mod error;
pub mod grid;
pub mod scale;

pub use bbox::LatLngBounds;
pub use color::Color;
pub use error::{ColorError, FieldError, FieldResult};
pub use grid::{GridParams, LatLng, RegularGrid, ScalarField};
pub use scale::ColorScale;
