//! Decode/encode backends
//!
//! Every backend turns container bytes into a [`PixelBuffer`] and back. Which
//! backend is used is decided by the [`LoaderContext`] the caller holds; buffers
//! themselves never remember where they came from.

mod image_backend;
mod skia_backend;

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bitmap::PixelBuffer;
use crate::error::{Error, Result};

pub use image_backend::SoftwareLoader;
pub use skia_backend::SkiaLoader;

/// Container formats a backend may be able to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Bmp,
    Png,
    Tga,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Bmp, ImageFormat::Png, ImageFormat::Tga];

    /// Guess from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "bmp" | "dib" => Some(Self::Bmp),
            "png" => Some(Self::Png),
            "tga" => Some(Self::Tga),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
            Self::Tga => "tga",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// In-memory bitmap owned by a particular backend's native library
pub enum NativeBitmap {
    /// Straight RGBA image from the `image` crate
    Rgba(image::RgbaImage),
    /// Premultiplied pixmap from `tiny-skia`
    Skia(tiny_skia::Pixmap),
}

impl NativeBitmap {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgba(img) => img.dimensions(),
            Self::Skia(pixmap) => (pixmap.width(), pixmap.height()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Rgba(_) => "image::RgbaImage",
            Self::Skia(_) => "tiny_skia::Pixmap",
        }
    }
}

impl fmt::Debug for NativeBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "NativeBitmap({}, {}x{})", self.kind(), w, h)
    }
}

impl From<image::RgbaImage> for NativeBitmap {
    fn from(img: image::RgbaImage) -> Self {
        Self::Rgba(img)
    }
}

impl From<tiny_skia::Pixmap> for NativeBitmap {
    fn from(pixmap: tiny_skia::Pixmap) -> Self {
        Self::Skia(pixmap)
    }
}

/// Capability every codec backend provides
pub trait BitmapLoader {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Whether `encode` can write this format
    fn supports(&self, format: ImageFormat) -> bool;

    /// Decode a complete container held in memory
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;

    /// Read a stream to its end, then decode
    fn decode_stream(&self, reader: &mut dyn Read) -> Result<PixelBuffer> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    /// Missing files fail with `NotFound` before any decoding happens
    fn decode_file(&self, path: &Path) -> Result<PixelBuffer> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        debug!(
            loader = self.name(),
            path = %path.display(),
            bytes = bytes.len(),
            "decoding file"
        );
        self.decode(&bytes)
    }

    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>>;

    /// Adopt a backend-native bitmap without a container round-trip
    fn wrap_native(&self, handle: NativeBitmap) -> Result<PixelBuffer>;
}

/// The closed set of available backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    /// CPU codecs from the `image` crate (BMP, PNG, TGA and whatever else it reads)
    Software(SoftwareLoader),
    /// `tiny-skia` pixmaps (PNG only)
    Accelerated(SkiaLoader),
}

impl Loader {
    pub fn software() -> Self {
        Self::Software(SoftwareLoader)
    }

    pub fn accelerated() -> Self {
        Self::Accelerated(SkiaLoader)
    }

    fn backend(&self) -> &dyn BitmapLoader {
        match self {
            Self::Software(l) => l,
            Self::Accelerated(l) => l,
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::software()
    }
}

impl BitmapLoader for Loader {
    fn name(&self) -> &'static str {
        self.backend().name()
    }

    fn supports(&self, format: ImageFormat) -> bool {
        self.backend().supports(format)
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        self.backend().decode(bytes)
    }

    fn decode_stream(&self, reader: &mut dyn Read) -> Result<PixelBuffer> {
        self.backend().decode_stream(reader)
    }

    fn decode_file(&self, path: &Path) -> Result<PixelBuffer> {
        self.backend().decode_file(path)
    }

    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>> {
        self.backend().encode(buffer, format)
    }

    fn wrap_native(&self, handle: NativeBitmap) -> Result<PixelBuffer> {
        self.backend().wrap_native(handle)
    }
}

/// Holds the loader used for decode and encode calls.
///
/// Switching requires `&mut self`, so a switch can never interleave with a decode
/// running through the same context. A switch only affects later calls; buffers
/// already decoded are not touched. Failed calls leave the active loader as it was.
#[derive(Debug, Clone, Default)]
pub struct LoaderContext {
    active: Loader,
}

impl LoaderContext {
    pub fn new(loader: Loader) -> Self {
        Self { active: loader }
    }

    pub fn loader(&self) -> Loader {
        self.active
    }

    /// Make `loader` the active backend and return the previous one
    pub fn set_loader(&mut self, loader: Loader) -> Loader {
        let previous = std::mem::replace(&mut self.active, loader);
        if previous != loader {
            info!(from = previous.name(), to = loader.name(), "switched loader");
        }
        previous
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        self.active.decode(bytes)
    }

    pub fn decode_stream(&self, reader: &mut dyn Read) -> Result<PixelBuffer> {
        self.active.decode_stream(reader)
    }

    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<PixelBuffer> {
        self.active.decode_file(path.as_ref())
    }

    pub fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>> {
        self.active.encode(buffer, format)
    }

    pub fn wrap_native(&self, handle: NativeBitmap) -> Result<PixelBuffer> {
        self.active.wrap_native(handle)
    }

    /// Encode in the format implied by the extension and write the file
    pub fn save(&self, buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).ok_or_else(|| {
            Error::unsupported_format(format!("no known image format for {}", path.display()))
        })?;
        let bytes = self.encode(buffer, format)?;
        std::fs::write(path, bytes)?;
        debug!(loader = self.active.name(), path = %path.display(), "saved image");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::generate;
    use crate::color::Color;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pixmill-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.PNG")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("x.bmp")), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::from_path(Path::new("x.tga")), Some(ImageFormat::Tga));
        assert_eq!(ImageFormat::from_path(Path::new("x.jpeg2")), None);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_default_context_is_software() {
        assert_eq!(LoaderContext::default().loader(), Loader::software());
    }

    #[test]
    fn test_switch_affects_only_later_decodes() {
        let img = generate::quadrants(8, 8).unwrap();
        let mut ctx = LoaderContext::default();
        let bmp = ctx.encode(&img, ImageFormat::Bmp).unwrap();
        let decoded = ctx.decode(&bmp).unwrap();

        let previous = ctx.set_loader(Loader::accelerated());
        assert_eq!(previous, Loader::software());
        assert!(matches!(ctx.decode(&bmp), Err(Error::Decode(_))));
        // Earlier results are plain buffers and stay valid.
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_failed_decode_keeps_active_loader() {
        let ctx = LoaderContext::new(Loader::accelerated());
        assert!(ctx.decode(b"definitely not an image").is_err());
        assert_eq!(ctx.loader(), Loader::accelerated());
    }

    #[test]
    fn test_decode_file_missing_is_not_found() {
        let ctx = LoaderContext::default();
        let missing = temp_path("does-not-exist.png");
        match ctx.decode_file(&missing) {
            Err(Error::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_save_then_decode_file() {
        let img = generate::checkerboard(16, 16, 4, 4, Color::BLUE, Color::GRAY).unwrap();
        let path = temp_path("checker.png");
        let ctx = LoaderContext::default();
        ctx.save(&img, &path).unwrap();

        let accelerated = LoaderContext::new(Loader::accelerated());
        let back = accelerated.decode_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, img);
    }

    #[test]
    fn test_save_unknown_extension() {
        let img = generate::quadrants(4, 4).unwrap();
        let ctx = LoaderContext::default();
        assert!(matches!(
            ctx.save(&img, temp_path("x.unknown")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decode_stream() {
        let img = generate::quadrants(6, 4).unwrap();
        let ctx = LoaderContext::default();
        let png = ctx.encode(&img, ImageFormat::Png).unwrap();
        let mut cursor = std::io::Cursor::new(png);
        assert_eq!(ctx.decode_stream(&mut cursor).unwrap(), img);
    }

    #[test]
    fn test_wrap_native_foreign_handle_is_rejected() {
        let pixmap = tiny_skia::Pixmap::new(2, 2).unwrap();
        let ctx = LoaderContext::default();
        assert!(matches!(
            ctx.wrap_native(NativeBitmap::from(pixmap)),
            Err(Error::InvalidArgument(_))
        ));
    }
}
