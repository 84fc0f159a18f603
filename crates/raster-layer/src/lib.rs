//! Scalar-field raster layer for interactive maps.
//!
//! - Pixel buffer: one RGBA pixel per grid cell via a color function
//! - Bitmap decoding: asynchronous, generation-tagged
//! - Compositing: bitmap placed on the map surface from three projected corners
//! - Layer: data/color/visibility/opacity lifecycle around the above

pub mod bitmap;
pub mod color_fn;
pub mod compositor;
pub mod error;
pub mod layer;
pub mod options;
pub mod pixels;
pub mod png;
pub mod redraw;
pub mod surface;
pub mod viewport;

pub use bitmap::{BitmapDecoder, BlockingPoolDecoder, DecodedBitmap, InlineDecoder};
pub use color_fn::ColorFn;
pub use compositor::{GridAnchors, Placement};
pub use error::{RenderError, RenderResult};
pub use layer::{scalar_field_layer, DrawOutcome, ScalarFieldLayer};
pub use options::{ColorSpec, LayerConfig, LayerOptions};
pub use redraw::RedrawSignal;
pub use surface::{DrawingSurface, PixmapSurface};
pub use viewport::{MapHost, PixmapHost, ScreenPoint, WebMercatorViewport};
