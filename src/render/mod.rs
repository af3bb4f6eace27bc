//! Sprite renderer
//!
//! Frames are composed on the CPU into an ARGB backbuffer and handed to a
//! platform window. One thread owns the renderer and drives the frame cycle:
//!
//! ```text
//! poll_events -> clear -> render -> present -> pace
//! ```
//!
//! Calling the cycle out of order shows a stale or partial frame, never panics.

mod device;
mod headless;
mod pacing;
pub mod platform;
#[cfg(feature = "sdl")]
mod sdl;
mod sprite;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::bitmap::{Canvas, PixelBuffer};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::transform::ResizeMode;

pub use device::{RenderDevice, RendererFlags, RendererMode};
pub use headless::{HeadlessHandle, HeadlessPlatform, HeadlessWindow, DEFAULT_FRAME_HISTORY};
pub use pacing::{FpsCounter, FramePacer, StopFlag};
pub use platform::{ButtonState, MouseButton, Platform, Window, WindowEvent, WindowSpec};
#[cfg(feature = "sdl")]
pub use sdl::{SdlPlatform, SdlWindow};
pub use sprite::Sprite;

static NEXT_RENDERER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    /// Window open, nothing presented yet
    Initialized,
    Running,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub state: ButtonState,
    /// Window pixels
    pub position: (i32, i32),
    /// `[0, 1]` on both axes, top-left origin
    pub position_norm: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RendererEvent {
    MouseButtonChanged(MouseButtonEvent),
    /// The window is gone. Delivered exactly once.
    Closed,
}

pub struct Renderer<P: Platform> {
    id: u64,
    platform: P,
    state: RendererState,
    window: Option<P::Window>,
    backbuffer: Option<Canvas>,
    frame: Option<PixelBuffer>,
    aspect: ResizeMode,
    /// Live generation per key
    sprites: HashMap<String, u64>,
    next_generation: u64,
    pending: Vec<RendererEvent>,
}

impl<P: Platform> Renderer<P> {
    pub fn new(platform: P) -> Self {
        Self {
            id: NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed),
            platform,
            state: RendererState::Uninitialized,
            window: None,
            backbuffer: None,
            frame: None,
            aspect: ResizeMode::default(),
            sprites: HashMap::new(),
            next_generation: 0,
            pending: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.platform.is_available()
    }

    /// Displays that can host a window. Fails with `NoDevice` when there are none.
    pub fn devices(&self) -> Result<Vec<RenderDevice>> {
        let devices = self.platform.devices()?;
        if devices.is_empty() {
            return Err(Error::NoDevice);
        }
        Ok(devices)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn backbuffer_size(&self) -> Option<(u32, u32)> {
        self.backbuffer.as_ref().map(|b| (b.width(), b.height()))
    }

    /// How the backbuffer is fitted into the window
    pub fn aspect_correction(&self) -> ResizeMode {
        self.aspect
    }

    pub fn set_aspect_correction(&mut self, mode: ResizeMode) {
        if mode != self.aspect {
            debug!(from = %self.aspect, to = %mode, "aspect correction");
            self.aspect = mode;
        }
    }

    /// Open a window with a `width x height` backbuffer.
    ///
    /// Sizes and device are checked before the platform is touched, so a bad
    /// request never leaves a window behind.
    pub fn initialize(
        &mut self,
        device: &RenderDevice,
        mode: RendererMode,
        flags: RendererFlags,
        width: u32,
        height: u32,
        title: &str,
    ) -> Result<()> {
        if self.state != RendererState::Uninitialized {
            return Err(Error::initialization(format!(
                "renderer is already {:?}",
                self.state
            )));
        }
        if width == 0 || height == 0 {
            return Err(Error::initialization(format!(
                "backbuffer {}x{} has no pixels",
                width, height
            )));
        }
        let devices = self.platform.devices()?;
        if !devices.contains(device) {
            return Err(Error::initialization(format!(
                "{} is not a {} device",
                device,
                self.platform.name()
            )));
        }

        let backbuffer = Canvas::new(width, height).map_err(|e| Error::initialization(e.to_string()))?;
        let spec = WindowSpec {
            title: title.to_string(),
            width,
            height,
            mode,
            flags,
        };
        let window = self.platform.open_window(device, &spec).map_err(|e| match e {
            Error::Initialization(_) => e,
            other => Error::initialization(other.to_string()),
        })?;

        info!(
            platform = self.platform.name(),
            device = %device,
            %mode,
            ?flags,
            width,
            height,
            "renderer initialized"
        );
        self.window = Some(window);
        self.backbuffer = Some(backbuffer);
        self.state = RendererState::Initialized;
        Ok(())
    }

    /// Bind a new sprite to `key`. An existing sprite with the same key is released
    /// and will be skipped by [`render`](Self::render) from now on.
    pub fn create_sprite(&mut self, key: &str) -> Sprite {
        let generation = self.next_generation;
        self.next_generation += 1;
        if let Some(previous) = self.sprites.insert(key.to_string(), generation) {
            debug!(key, previous, generation, "replacing sprite");
        }
        Sprite::new(key.to_string(), self.id, generation)
    }

    /// Release the binding for `key`. Returns false if there was none.
    pub fn remove_sprite(&mut self, key: &str) -> bool {
        self.sprites.remove(key).is_some()
    }

    fn owns(&self, sprite: &Sprite) -> bool {
        sprite.renderer_id() == self.id && self.sprites.get(sprite.key()) == Some(&sprite.generation())
    }

    /// Backbuffer for a frame call, None once closed
    fn frame_target(&mut self, call: &str) -> Result<Option<&mut Canvas>> {
        match self.state {
            RendererState::Uninitialized => Err(Error::initialization(format!(
                "{} called before initialize",
                call
            ))),
            RendererState::Closed => {
                warn!(call, "renderer is closed; ignoring");
                Ok(None)
            },
            RendererState::Initialized | RendererState::Running => Ok(self.backbuffer.as_mut()),
        }
    }

    pub fn clear(&mut self, color: Color) -> Result<()> {
        if let Some(backbuffer) = self.frame_target("clear")? {
            backbuffer.clear(color);
        }
        Ok(())
    }

    /// Composite sprites back to front: larger `position.z` first, equal z in
    /// slice order. Sprites this renderer does not currently own are skipped.
    pub fn render(&mut self, sprites: &[Sprite]) -> Result<()> {
        if self.frame_target("render")?.is_none() {
            return Ok(());
        }
        let mut ordered: Vec<&Sprite> = Vec::with_capacity(sprites.len());
        for sprite in sprites {
            if self.owns(sprite) {
                ordered.push(sprite);
            } else {
                warn!(key = sprite.key(), "skipping stale or foreign sprite");
            }
        }
        ordered.sort_by(|a, b| b.position.z.total_cmp(&a.position.z));

        if let Some(backbuffer) = self.backbuffer.as_mut() {
            for sprite in ordered {
                sprite.composite(backbuffer);
            }
        }
        Ok(())
    }

    /// Show the backbuffer, fitted into the window by the aspect correction
    pub fn present(&mut self) -> Result<()> {
        let frame = match self.frame_target("present")? {
            Some(backbuffer) => backbuffer.snapshot(),
            None => return Ok(()),
        };
        if let Some(window) = self.window.as_mut() {
            let (ww, wh) = window.size();
            let placement = self.aspect.placement(frame.width(), frame.height(), ww, wh);
            window.present(&frame, placement)?;
        }
        self.frame = Some(frame);
        self.state = RendererState::Running;
        Ok(())
    }

    /// Last presented frame
    pub fn frame(&self) -> Option<&PixelBuffer> {
        self.frame.as_ref()
    }

    /// Translate pending window events. Never blocks.
    pub fn poll_events(&mut self) -> Vec<RendererEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let Some(window) = self.window.as_mut() else {
            return events;
        };
        let (ww, wh) = window.size();
        let mut closed = false;
        for event in window.poll_events() {
            match event {
                WindowEvent::CloseRequested => {
                    closed = true;
                    break;
                },
                WindowEvent::MouseButton {
                    button,
                    state,
                    x,
                    y,
                } => events.push(RendererEvent::MouseButtonChanged(MouseButtonEvent {
                    button,
                    state,
                    position: (x, y),
                    position_norm: normalize(x, y, ww, wh),
                })),
                WindowEvent::Resized { width, height } => {
                    debug!(width, height, "window resized");
                },
            }
        }
        if closed {
            info!("window closed");
            self.teardown();
            events.push(RendererEvent::Closed);
        }
        events
    }

    /// Close the window. `Closed` is delivered by the next `poll_events`.
    pub fn close(&mut self) {
        if self.window.is_some() {
            self.teardown();
            self.pending.push(RendererEvent::Closed);
        }
        self.state = RendererState::Closed;
    }

    fn teardown(&mut self) {
        self.window = None;
        self.state = RendererState::Closed;
    }
}

fn normalize(x: i32, y: i32, width: u32, height: u32) -> (f32, f32) {
    let nx = x as f32 / width.max(1) as f32;
    let ny = y as f32 / height.max(1) as f32;
    (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
}
