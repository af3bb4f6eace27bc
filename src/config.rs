//! Demo settings, stored as JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::{RendererFlags, RendererMode};
use crate::transform::ResizeMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Backbuffer size
    pub width: u32,
    pub height: u32,
    /// Display index
    pub display: u32,
    pub mode: RendererMode,
    /// Backbuffer-to-window fit
    pub aspect: ResizeMode,
    pub wait_retrace: bool,
    /// Sleep between frames
    pub frame_interval_ms: u64,
    /// Test scene, 0 for the default
    pub test: u32,
    pub title: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            display: 0,
            mode: RendererMode::Window,
            aspect: ResizeMode::None,
            wait_retrace: true,
            frame_interval_ms: 10,
            test: 0,
            title: "pixmill".to_string(),
        }
    }
}

impl DemoConfig {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        serde_json::from_str(&json)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    pub fn flags(&self) -> RendererFlags {
        if self.wait_retrace {
            RendererFlags::WAIT_RETRACE
        } else {
            RendererFlags::empty()
        }
    }

    /// Override the backbuffer size from a `WxH` string
    pub fn set_backbuffer(&mut self, value: &str) -> Result<()> {
        let (width, height) = parse_backbuffer(value)?;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// Parse `"800x600"` into `(800, 600)`
pub fn parse_backbuffer(value: &str) -> Result<(u32, u32)> {
    let invalid = || {
        Error::invalid_argument(format!(
            "backbuffer size has to be in form of (width)x(height), got {:?}",
            value
        ))
    };
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}
