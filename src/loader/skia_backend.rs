use png::{BitDepth, ColorType, Transformations};
use tiny_skia::Pixmap;

use super::{BitmapLoader, ImageFormat, NativeBitmap};
use crate::bitmap::PixelBuffer;
use crate::color::Color;
use crate::error::{Error, Result};

/// Skia-style backend.
///
/// PNG bytes are decoded and encoded with straight alpha, the same `png`
/// codec `tiny-skia` builds on, so every pixel survives a round trip.
/// Premultiplied `tiny_skia::Pixmap` storage is only met in
/// [`wrap_native`](BitmapLoader::wrap_native).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkiaLoader;

fn from_pixmap(pixmap: &Pixmap) -> Result<PixelBuffer> {
    let width = pixmap.width();
    let mut pixels = pixmap.pixels().iter();
    PixelBuffer::from_fn(width, pixmap.height(), |_, _| {
        pixels
            .next()
            .map(|p| {
                let c = p.demultiply();
                Color::from_argb(c.alpha(), c.red(), c.green(), c.blue())
            })
            .unwrap_or(Color::TRANSPARENT)
    })
}

fn decode_png(bytes: &[u8]) -> Result<PixelBuffer> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::ALPHA | Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(|e| Error::decode(e.to_string()))?;
    let mut buf = vec![0_u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| Error::decode(e.to_string()))?;
    let data = &buf[..info.buffer_size()];

    let channels = match (info.color_type, info.bit_depth) {
        (ColorType::Rgba, BitDepth::Eight) => 4,
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => 2,
        other => {
            return Err(Error::decode(format!("unexpected png output {:?}", other)));
        },
    };
    let mut texels = data.chunks_exact(channels);
    PixelBuffer::from_fn(info.width, info.height, |_, _| match texels.next() {
        Some(&[r, g, b, a]) => Color::from_argb(a, r, g, b),
        Some(&[l, a]) => Color::from_argb(a, l, l, l),
        _ => Color::TRANSPARENT,
    })
}

fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let rgba: Vec<u8> = buffer.pixels().flat_map(|c| [c.r, c.g, c.b, c.a]).collect();
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, buffer.width(), buffer.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let io = |e: png::EncodingError| Error::Io(std::io::Error::other(e));
    let mut writer = encoder.write_header().map_err(io)?;
    writer.write_image_data(&rgba).map_err(io)?;
    writer.finish().map_err(io)?;
    Ok(out)
}

impl BitmapLoader for SkiaLoader {
    fn name(&self) -> &'static str {
        "skia"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Png
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        decode_png(bytes)
    }

    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>> {
        if !self.supports(format) {
            return Err(Error::unsupported_format(format!(
                "{} cannot encode {}",
                self.name(),
                format
            )));
        }
        encode_png(buffer)
    }

    fn wrap_native(&self, handle: NativeBitmap) -> Result<PixelBuffer> {
        match handle {
            // Premultiplied storage cannot be shared, so this is the one copy.
            NativeBitmap::Skia(pixmap) => from_pixmap(&pixmap),
            other => Err(Error::invalid_argument(format!(
                "skia loader cannot wrap {:?}",
                other
            ))),
        }
    }
}
