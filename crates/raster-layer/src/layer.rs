//! Scalar field layer lifecycle.
//!
//! A layer holds one field, its options and a single "current renderable"
//! slot (decoded bitmap plus the grid corners it was built from). The slot is
//! replaced as a whole when a decode lands, never patched.
//!
//! The pixel buffer is rebuilt only when the data or the color changes:
//! - `set_data` rebuilds immediately and submits a decode
//! - `set_color` marks the slot stale; the next draw rebuilds
//!
//! Each rebuild bumps a generation counter. Decode results carrying an older
//! generation are dropped, so a slow decode of superseded data can never
//! overwrite a newer bitmap.

use std::sync::Arc;

use field_common::{LatLng, LatLngBounds, RegularGrid, ScalarField};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bitmap::{default_decoder, DecodeReceiver, DecodeRequest, DecodeResult, DecodeSender};
use crate::compositor::draw_image;
use crate::pixels::build_pixel_buffer;
use crate::{
    BitmapDecoder, ColorFn, DecodedBitmap, GridAnchors, LayerOptions, MapHost, Placement,
    RedrawSignal, RenderError, RenderResult,
};

/// What a draw callback did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOutcome {
    /// Layer is hidden; nothing touched.
    Hidden,
    /// No bitmap decoded yet; nothing drawn.
    NotReady,
    /// Bitmap composited at this placement.
    Drawn(Placement),
}

struct Renderable {
    generation: u64,
    bitmap: DecodedBitmap,
    anchors: GridAnchors,
}

/// A map layer drawing a scalar field as a colored raster.
pub struct ScalarFieldLayer<F: ScalarField = RegularGrid> {
    options: LayerOptions,
    field: Option<Arc<F>>,
    current: Option<Renderable>,
    pending: Option<(u64, GridAnchors)>,
    generation: u64,
    stale: bool,
    visible: bool,
    decoder: Box<dyn BitmapDecoder>,
    reply_tx: DecodeSender,
    reply_rx: DecodeReceiver,
    redraw: RedrawSignal,
}

/// Create a layer for `field`, building its first pixel buffer.
pub fn scalar_field_layer<F: ScalarField>(
    field: F,
    options: LayerOptions,
) -> RenderResult<ScalarFieldLayer<F>> {
    let mut layer = ScalarFieldLayer::new(options);
    layer.set_data(field)?;
    Ok(layer)
}

impl<F: ScalarField> ScalarFieldLayer<F> {
    /// Empty layer using the default decoder for the current context.
    pub fn new(options: LayerOptions) -> Self {
        Self::with_decoder(options, default_decoder())
    }

    pub fn with_decoder(options: LayerOptions, decoder: Box<dyn BitmapDecoder>) -> Self {
        let (tx, reply_rx) = mpsc::unbounded_channel();
        let redraw = RedrawSignal::new();
        Self {
            options,
            field: None,
            current: None,
            pending: None,
            generation: 0,
            stale: false,
            visible: true,
            decoder,
            reply_tx: DecodeSender::new(tx, redraw.clone()),
            reply_rx,
            redraw,
        }
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn field(&self) -> Option<&Arc<F>> {
        self.field.as_ref()
    }

    /// Handle the host uses to learn about redraw requests.
    pub fn redraw_signal(&self) -> RedrawSignal {
        self.redraw.clone()
    }

    /// Latest issued generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the bitmap currently drawn, if any.
    pub fn drawn_generation(&self) -> Option<u64> {
        self.current.as_ref().map(|c| c.generation)
    }

    pub fn bitmap(&self) -> Option<&DecodedBitmap> {
        self.current.as_ref().map(|c| &c.bitmap)
    }

    /// Whether a decode for the latest generation is still outstanding.
    pub fn has_pending_decode(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the field, rebuild the pixel buffer and start decoding it.
    pub fn set_data(&mut self, field: impl Into<Arc<F>>) -> RenderResult<()> {
        let field = field.into();
        debug!(
            columns = field.columns(),
            rows = field.rows(),
            "Setting layer data"
        );
        self.field = Some(field);
        self.rebuild()?;
        self.redraw.request();
        Ok(())
    }

    /// Replace the color function. The buffer is rebuilt on the next draw.
    pub fn set_color(&mut self, color: impl Into<ColorFn>) {
        self.options.color = Some(color.into());
        self.stale = true;
        self.redraw.request();
    }

    /// Color used for the next rebuild: the configured one, or white to
    /// black over the field range.
    pub fn effective_color(&self) -> Option<ColorFn> {
        match (&self.options.color, &self.field) {
            (Some(color), _) => Some(color.clone()),
            (None, Some(field)) => Some(ColorFn::default_for_range(field.range())),
            (None, None) => None,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.options.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.options.opacity = opacity.clamp(0.0, 1.0);
        self.redraw.request();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Make the layer visible. Always requests a redraw, even when nothing
    /// moved since it was hidden.
    pub fn show(&mut self) {
        self.visible = true;
        self.redraw.request();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Geographic extent of the current field.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.field.as_ref().map(|f| f.bounds())
    }

    /// Field value under a map position.
    pub fn value_at(&self, at: LatLng) -> Option<f64> {
        self.field.as_ref()?.value_at(at)
    }

    /// Apply finished decodes without drawing. Returns whether a new bitmap
    /// landed.
    ///
    /// Hosts driven by the redraw signal do not need this: every delivered
    /// decode already requested a redraw, and `on_draw` applies it.
    pub fn poll_decoded(&mut self) -> bool {
        self.drain_decoded()
    }

    /// Wait until the decode for the latest generation has been applied.
    ///
    /// Fails with the decode error if that decode failed.
    pub async fn settle(&mut self) -> RenderResult<()> {
        self.drain_decoded();
        while self.pending.is_some() {
            let result = self.reply_rx.recv().await.ok_or(RenderError::DecoderClosed)?;
            self.apply(result)?;
        }
        Ok(())
    }

    /// Host draw callback.
    pub fn on_draw<H>(&mut self, host: &mut H) -> RenderResult<DrawOutcome>
    where
        H: MapHost + ?Sized,
    {
        if !self.visible {
            return Ok(DrawOutcome::Hidden);
        }

        if self.stale {
            self.rebuild()?;
        }
        self.drain_decoded();
        host.apply_opacity(self.options.opacity);

        let Some(current) = &self.current else {
            return Ok(DrawOutcome::NotReady);
        };
        Ok(match draw_image(host, &current.anchors, Some(&current.bitmap)) {
            Some(placement) => DrawOutcome::Drawn(placement),
            None => DrawOutcome::NotReady,
        })
    }

    fn rebuild(&mut self) -> RenderResult<()> {
        self.stale = false;
        let (Some(field), Some(color)) = (self.field.clone(), self.effective_color()) else {
            return Ok(());
        };
        if self.options.interpolate {
            debug!("Interpolation is not supported, drawing flat cells");
        }

        let pixels = build_pixel_buffer(field.as_ref(), &color)?;
        self.generation += 1;
        let generation = self.generation;
        self.pending = Some((generation, GridAnchors::from_field(field.as_ref())));

        self.decoder.submit(
            DecodeRequest {
                generation,
                pixels,
                width: field.columns(),
                height: field.rows(),
            },
            self.reply_tx.clone(),
        );
        debug!(generation, "Submitted bitmap decode");
        Ok(())
    }

    fn drain_decoded(&mut self) -> bool {
        let mut applied = false;
        while let Ok(result) = self.reply_rx.try_recv() {
            match self.apply(result) {
                Ok(true) => applied = true,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Dropping failed bitmap decode"),
            }
        }
        applied
    }

    /// Swap in a decode result if it belongs to the latest generation.
    fn apply(&mut self, result: DecodeResult) -> RenderResult<bool> {
        if result.generation != self.generation {
            debug!(
                generation = result.generation,
                latest = self.generation,
                "Discarding stale decode"
            );
            return Ok(false);
        }

        let pending = self.pending.take().filter(|(g, _)| *g == result.generation);
        let Some((generation, anchors)) = pending else {
            return Ok(false);
        };

        let bitmap = result.bitmap?;
        self.current = Some(Renderable {
            generation,
            bitmap,
            anchors,
        });
        debug!(generation, "Applied decoded bitmap");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InlineDecoder, PixmapHost, WebMercatorViewport};
    use field_common::GridParams;

    fn grid() -> RegularGrid {
        RegularGrid::new(GridParams::new(2, 2, 0.0, 0.0, 1.0), vec![1.0, 2.0, 3.0, f32::NAN])
            .unwrap()
    }

    fn inline_layer() -> ScalarFieldLayer {
        ScalarFieldLayer::with_decoder(LayerOptions::default(), Box::new(InlineDecoder))
    }

    #[test]
    fn test_set_data_issues_generation() {
        let mut layer = inline_layer();
        assert_eq!(layer.generation(), 0);

        layer.set_data(grid()).unwrap();
        assert_eq!(layer.generation(), 1);
        assert!(layer.has_pending_decode());
        assert!(layer.bitmap().is_none());

        assert!(layer.poll_decoded());
        assert_eq!(layer.drawn_generation(), Some(1));
        assert!(!layer.has_pending_decode());
    }

    #[test]
    fn test_empty_layer_draws_nothing() {
        let mut layer = inline_layer();
        let vp = WebMercatorViewport::new(LatLng::new(0.0, 0.0), 2.0, 16, 16);
        let mut host = PixmapHost::new(vp).unwrap();

        assert_eq!(layer.on_draw(&mut host).unwrap(), DrawOutcome::NotReady);
        assert!(layer.bounds().is_none());
        assert!(layer.effective_color().is_none());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = inline_layer();
        layer.set_opacity(1.5);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-0.2);
        assert_eq!(layer.opacity(), 0.0);
    }
}
