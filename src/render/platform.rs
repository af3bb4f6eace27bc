//! Windowing seam
//!
//! The renderer composes frames on the CPU and hands them to a [`Window`] for
//! display. A [`Platform`] enumerates displays and opens windows on them.

use serde::{Deserialize, Serialize};

use super::{RenderDevice, RendererFlags, RendererMode};
use crate::bitmap::PixelBuffer;
use crate::error::Result;
use crate::transform::Placement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// What a window reports, in window pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    CloseRequested,
    MouseButton {
        button: MouseButton,
        state: ButtonState,
        x: i32,
        y: i32,
    },
    Resized {
        width: u32,
        height: u32,
    },
}

/// Requested window configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    /// Backbuffer size
    pub width: u32,
    pub height: u32,
    pub mode: RendererMode,
    pub flags: RendererFlags,
}

pub trait Window {
    /// Client area size in pixels
    fn size(&self) -> (u32, u32);

    /// Drain pending events without blocking
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Show `frame` scaled into `placement`; the rest of the window is black
    fn present(&mut self, frame: &PixelBuffer, placement: Placement) -> Result<()>;
}

pub trait Platform {
    type Window: Window;

    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn devices(&self) -> Result<Vec<RenderDevice>>;

    /// May block until the OS has the window ready
    fn open_window(&mut self, device: &RenderDevice, spec: &WindowSpec) -> Result<Self::Window>;
}
