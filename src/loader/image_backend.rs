use std::io::Cursor;

use image::{DynamicImage, RgbaImage};

use super::{BitmapLoader, ImageFormat, NativeBitmap};
use crate::bitmap::{PixelBuffer, BYTES_PER_PIXEL};
use crate::error::{Error, Result};

/// CPU codecs from the `image` crate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftwareLoader;

/// RGBA and BGRA differ only by the red/blue order, so one swap converts both ways.
fn swap_red_blue(bytes: &mut [u8]) {
    for px in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Tga => image::ImageFormat::Tga,
    }
}

fn from_rgba(img: RgbaImage) -> Result<PixelBuffer> {
    let (width, height) = img.dimensions();
    let mut raw = img.into_raw();
    swap_red_blue(&mut raw);
    PixelBuffer::from_argb_bytes(width, height, raw)
}

impl BitmapLoader for SoftwareLoader {
    fn name(&self) -> &'static str {
        "software"
    }

    fn supports(&self, _format: ImageFormat) -> bool {
        true
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory(bytes).map_err(|e| Error::decode(e.to_string()))?;
        from_rgba(img.into_rgba8()).map_err(|e| Error::decode(e.to_string()))
    }

    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>> {
        let mut raw = buffer.as_bytes().to_vec();
        swap_red_blue(&mut raw);
        let img = RgbaImage::from_raw(buffer.width(), buffer.height(), raw)
            .ok_or_else(|| Error::invalid_dimension("pixel storage does not match dimensions"))?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, to_image_format(format))
            .map_err(|e| match e {
                image::ImageError::Unsupported(u) => Error::unsupported_format(u.to_string()),
                other => Error::Io(std::io::Error::other(other)),
            })?;
        Ok(out.into_inner())
    }

    fn wrap_native(&self, handle: NativeBitmap) -> Result<PixelBuffer> {
        match handle {
            // Takes over the image's allocation and swizzles it in place.
            NativeBitmap::Rgba(img) => from_rgba(img),
            other => Err(Error::invalid_argument(format!(
                "software loader cannot wrap {:?}",
                other
            ))),
        }
    }
}
