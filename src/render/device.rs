use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A display the renderer can open a window on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDevice {
    /// Platform display index
    pub index: u32,
    pub name: String,
    /// Desktop resolution
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for RenderDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({}x{})", self.index, self.name, self.width, self.height)
    }
}

/// Window presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererMode {
    /// Decorated window of the backbuffer size
    #[default]
    Window,
    /// Exclusive fullscreen at the backbuffer size
    FullScreen,
    /// Borderless window covering the whole display
    WindowedFullScreen,
}

impl fmt::Display for RendererMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Window => "window",
            Self::FullScreen => "fullscreen",
            Self::WindowedFullScreen => "windowed-fullscreen",
        };
        f.write_str(name)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct RendererFlags: u32 {
        /// Synchronize `present` with the display refresh
        const WAIT_RETRACE = 1 << 0;
    }
}
