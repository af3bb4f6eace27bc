//! Offscreen platform
//!
//! Windows exist only in memory. Presented frames are kept for inspection and
//! input is injected through a [`HeadlessHandle`]. Used by tests and by the demo
//! when no display backend is compiled in.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::platform::{ButtonState, MouseButton, Platform, Window, WindowEvent, WindowSpec};
use super::{RenderDevice, RendererMode};
use crate::bitmap::PixelBuffer;
use crate::error::{Error, Result};
use crate::transform::Placement;

/// Presented frames kept per handle
pub const DEFAULT_FRAME_HISTORY: usize = 8;

#[derive(Debug, Default)]
struct Shared {
    events: VecDeque<WindowEvent>,
    frames: VecDeque<(PixelBuffer, Placement)>,
    history: usize,
    presented: usize,
    windows_opened: usize,
    open: bool,
    size: (u32, u32),
    last_spec: Option<WindowSpec>,
}

/// Test-side view of a headless platform's window
#[derive(Debug, Clone, Default)]
pub struct HeadlessHandle {
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessHandle {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_event(&self, event: WindowEvent) {
        self.lock().events.push_back(event);
    }

    /// Queue a press and release at window coordinates
    pub fn click(&self, button: MouseButton, x: i32, y: i32) {
        for state in [ButtonState::Pressed, ButtonState::Released] {
            self.push_event(WindowEvent::MouseButton {
                button,
                state,
                x,
                y,
            });
        }
    }

    /// Simulate the user closing the window
    pub fn request_close(&self) {
        self.push_event(WindowEvent::CloseRequested);
    }

    pub fn resize(&self, width: u32, height: u32) {
        let mut shared = self.lock();
        shared.size = (width, height);
        shared.events.push_back(WindowEvent::Resized { width, height });
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn windows_opened(&self) -> usize {
        self.lock().windows_opened
    }

    /// Total number of `present` calls
    pub fn presented(&self) -> usize {
        self.lock().presented
    }

    pub fn last_frame(&self) -> Option<PixelBuffer> {
        self.lock().frames.back().map(|(f, _)| f.clone())
    }

    pub fn last_placement(&self) -> Option<Placement> {
        self.lock().frames.back().map(|(_, p)| *p)
    }

    /// Most recent frames, oldest first
    pub fn frames(&self) -> Vec<PixelBuffer> {
        self.lock().frames.iter().map(|(f, _)| f.clone()).collect()
    }

    pub fn last_spec(&self) -> Option<WindowSpec> {
        self.lock().last_spec.clone()
    }
}

/// In-memory [`Platform`]
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    devices: Vec<RenderDevice>,
    handle: HeadlessHandle,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::with_devices(vec![RenderDevice {
            index: 0,
            name: "headless".to_string(),
            width: 1920,
            height: 1080,
        }])
    }

    /// An empty list models a machine without displays
    pub fn with_devices(devices: Vec<RenderDevice>) -> Self {
        let handle = HeadlessHandle::default();
        handle.lock().history = DEFAULT_FRAME_HISTORY;
        Self { devices, handle }
    }

    #[must_use]
    pub fn with_frame_history(self, frames: usize) -> Self {
        self.handle.lock().history = frames;
        self
    }

    pub fn handle(&self) -> HeadlessHandle {
        self.handle.clone()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    type Window = HeadlessWindow;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn devices(&self) -> Result<Vec<RenderDevice>> {
        Ok(self.devices.clone())
    }

    fn open_window(&mut self, device: &RenderDevice, spec: &WindowSpec) -> Result<HeadlessWindow> {
        if !self.devices.contains(device) {
            return Err(Error::initialization(format!("unknown device {}", device)));
        }
        let size = match spec.mode {
            RendererMode::Window | RendererMode::FullScreen => (spec.width, spec.height),
            RendererMode::WindowedFullScreen => (device.width, device.height),
        };
        let mut shared = self.handle.lock();
        if shared.open {
            return Err(Error::initialization("headless platform supports one window"));
        }
        shared.open = true;
        shared.windows_opened += 1;
        shared.size = size;
        shared.events.clear();
        shared.last_spec = Some(spec.clone());
        debug!(title = %spec.title, ?size, mode = %spec.mode, "headless window opened");
        Ok(HeadlessWindow {
            handle: self.handle.clone(),
        })
    }
}

pub struct HeadlessWindow {
    handle: HeadlessHandle,
}

impl Window for HeadlessWindow {
    fn size(&self) -> (u32, u32) {
        self.handle.lock().size
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.handle.lock().events.drain(..).collect()
    }

    fn present(&mut self, frame: &PixelBuffer, placement: Placement) -> Result<()> {
        let mut shared = self.handle.lock();
        shared.presented += 1;
        if shared.history > 0 {
            if shared.frames.len() == shared.history {
                shared.frames.pop_front();
            }
            shared.frames.push_back((frame.clone(), placement));
        }
        Ok(())
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        self.handle.lock().open = false;
    }
}
