//! Decoding pixel buffers into drawable bitmaps.
//!
//! A decode turns a straight-alpha RGBA buffer into a premultiplied
//! [`tiny_skia::Pixmap`]. Decoders run off the caller's path and report back
//! on a channel; every request carries the layer generation it was issued
//! for so the receiver can drop results that arrive out of order.

use std::sync::Arc;

use tiny_skia::{ColorU8, IntSize, Pixmap, PixmapRef};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tracing::{debug, warn};

use crate::{RedrawSignal, RenderError, RenderResult};

/// An immutable, drawable image. Clones share the same pixels.
#[derive(Debug, Clone)]
pub struct DecodedBitmap {
    pixmap: Arc<Pixmap>,
}

impl DecodedBitmap {
    /// Decode a straight-alpha RGBA buffer of `width * height` pixels.
    pub fn decode(mut pixels: Vec<u8>, width: usize, height: usize) -> RenderResult<Self> {
        let invalid = || RenderError::InvalidBitmapSize { width, height };

        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        let w = u32::try_from(width).map_err(|_| invalid())?;
        let h = u32::try_from(height).map_err(|_| invalid())?;
        let size = IntSize::from_wh(w, h).ok_or_else(invalid)?;

        for px in pixels.chunks_exact_mut(4) {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            px[0] = c.red();
            px[1] = c.green();
            px[2] = c.blue();
            px[3] = c.alpha();
        }

        let pixmap = Pixmap::from_vec(pixels, size).ok_or_else(invalid)?;
        Ok(Self {
            pixmap: Arc::new(pixmap),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn as_pixmap_ref(&self) -> PixmapRef<'_> {
        Pixmap::as_ref(&self.pixmap)
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some((c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Whether two handles share the same decoded pixels.
    pub fn ptr_eq(&self, other: &DecodedBitmap) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap)
    }
}

/// A pixel buffer waiting to be decoded.
#[derive(Debug)]
pub struct DecodeRequest {
    pub generation: u64,
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl DecodeRequest {
    /// Run the decode on the current thread.
    pub fn decode(self) -> DecodeResult {
        DecodeResult {
            generation: self.generation,
            bitmap: DecodedBitmap::decode(self.pixels, self.width, self.height),
        }
    }
}

/// Outcome of a decode, tagged with its request generation.
#[derive(Debug)]
pub struct DecodeResult {
    pub generation: u64,
    pub bitmap: RenderResult<DecodedBitmap>,
}

pub type DecodeReceiver = mpsc::UnboundedReceiver<DecodeResult>;

/// Reply handle given to a decoder.
///
/// Delivering a result also requests a redraw, so a host waiting on the
/// layer's [`RedrawSignal`] wakes up and its next draw applies the bitmap.
#[derive(Debug, Clone)]
pub struct DecodeSender {
    tx: mpsc::UnboundedSender<DecodeResult>,
    redraw: RedrawSignal,
}

impl DecodeSender {
    pub fn new(tx: mpsc::UnboundedSender<DecodeResult>, redraw: RedrawSignal) -> Self {
        Self { tx, redraw }
    }

    /// Deliver a result. Fails, handing the result back, when the layer is gone.
    pub fn send(&self, result: DecodeResult) -> Result<(), SendError<DecodeResult>> {
        self.tx.send(result)?;
        self.redraw.request();
        Ok(())
    }
}

/// Something that turns pixel buffers into bitmaps and reports back later.
pub trait BitmapDecoder: Send + Sync {
    /// Start decoding. The result must be sent on `reply` exactly once,
    /// unless the receiver is gone.
    fn submit(&self, request: DecodeRequest, reply: DecodeSender);
}

/// Decodes immediately on the submitting thread.
///
/// The result still goes through the reply channel, so it becomes visible
/// only when the layer next polls for completed decodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDecoder;

impl BitmapDecoder for InlineDecoder {
    fn submit(&self, request: DecodeRequest, reply: DecodeSender) {
        let generation = request.generation;
        if reply.send(request.decode()).is_err() {
            debug!(generation, "Decode receiver dropped");
        }
    }
}

/// Decodes on the tokio blocking thread pool.
#[derive(Debug, Clone)]
pub struct BlockingPoolDecoder {
    handle: Handle,
}

impl BlockingPoolDecoder {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime of the calling context, if there is one.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl BitmapDecoder for BlockingPoolDecoder {
    fn submit(&self, request: DecodeRequest, reply: DecodeSender) {
        let generation = request.generation;
        let task = self.handle.spawn_blocking(move || request.decode());

        // A panicking decode still has to answer, or the layer waits forever
        self.handle.spawn(async move {
            let result = task.await.unwrap_or_else(|e| DecodeResult {
                generation,
                bitmap: Err(RenderError::DecodeTask(e.to_string())),
            });
            if let Err(e) = &result.bitmap {
                warn!(generation, error = %e, "Bitmap decode failed");
            }
            if reply.send(result).is_err() {
                debug!(generation, "Decode receiver dropped");
            }
        });
    }
}

/// Blocking pool when running inside a tokio runtime, inline otherwise.
pub fn default_decoder() -> Box<dyn BitmapDecoder> {
    match BlockingPoolDecoder::current() {
        Some(decoder) => Box::new(decoder),
        None => Box::new(InlineDecoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_straight_colors() {
        let bitmap = DecodedBitmap::decode(vec![255, 0, 0, 255, 0, 0, 255, 128], 2, 1).unwrap();
        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.pixel(0, 0), Some((255, 0, 0, 255)));

        let (_, _, b, a) = bitmap.pixel(1, 0).unwrap();
        assert_eq!(a, 128);
        assert!(b >= 254);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = DecodedBitmap::decode(vec![0; 7], 1, 2).unwrap_err();
        assert!(matches!(err, RenderError::BufferSize { expected: 8, actual: 7 }));
    }

    #[test]
    fn test_decode_rejects_empty() {
        let err = DecodedBitmap::decode(vec![], 0, 3).unwrap_err();
        assert!(matches!(err, RenderError::InvalidBitmapSize { .. }));
    }

    #[test]
    fn test_inline_decoder_replies_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let redraw = RedrawSignal::new();
        InlineDecoder.submit(
            DecodeRequest {
                generation: 7,
                pixels: vec![0; 4],
                width: 1,
                height: 1,
            },
            DecodeSender::new(tx, redraw.clone()),
        );

        let result = rx.try_recv().unwrap();
        assert_eq!(result.generation, 7);
        assert!(result.bitmap.is_ok());
        assert!(rx.try_recv().is_err());
        assert_eq!(redraw.requested(), 1);
    }

    #[test]
    fn test_send_to_dropped_layer_does_not_wake() {
        let (tx, rx) = mpsc::unbounded_channel();
        let redraw = RedrawSignal::new();
        let sender = DecodeSender::new(tx, redraw.clone());
        drop(rx);

        let request = DecodeRequest {
            generation: 1,
            pixels: vec![0; 4],
            width: 1,
            height: 1,
        };
        assert!(sender.send(request.decode()).is_err());
        assert_eq!(redraw.requested(), 0);
    }

    #[test]
    fn test_pixmap_ref_shares_pixels() {
        let bitmap = DecodedBitmap::decode(vec![1, 2, 3, 255, 4, 5, 6, 255], 2, 1).unwrap();
        let view = bitmap.as_pixmap_ref();
        assert_eq!((view.width(), view.height()), (2, 1));
        assert_eq!(view.data(), &[1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
