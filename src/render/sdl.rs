//! SDL2 window backend

use sdl2::event::{Event, WindowEvent as SdlWindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window as SdlVideoWindow, WindowContext};
use sdl2::{EventPump, Sdl, VideoSubsystem};
use tracing::debug;

use super::platform::{ButtonState, MouseButton, Platform, Window, WindowEvent, WindowSpec};
use super::{RenderDevice, RendererFlags, RendererMode};
use crate::bitmap::PixelBuffer;
use crate::error::{Error, Result};
use crate::transform::Placement;

pub struct SdlPlatform {
    sdl: Sdl,
    video: VideoSubsystem,
}

impl SdlPlatform {
    pub fn new() -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::initialization)?;
        let video = sdl.video().map_err(Error::initialization)?;
        Ok(Self { sdl, video })
    }
}

impl Platform for SdlPlatform {
    type Window = SdlWindow;

    fn name(&self) -> &'static str {
        "sdl2"
    }

    fn is_available(&self) -> bool {
        self.video.num_video_displays().map_or(false, |n| n > 0)
    }

    fn devices(&self) -> Result<Vec<RenderDevice>> {
        let count = self.video.num_video_displays().map_err(Error::initialization)?;
        let mut devices = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let name = self
                .video
                .display_name(index)
                .unwrap_or_else(|_| format!("display {}", index));
            let mode = self
                .video
                .desktop_display_mode(index)
                .map_err(Error::initialization)?;
            devices.push(RenderDevice {
                index: index as u32,
                name,
                width: mode.w.max(0) as u32,
                height: mode.h.max(0) as u32,
            });
        }
        Ok(devices)
    }

    fn open_window(&mut self, device: &RenderDevice, spec: &WindowSpec) -> Result<SdlWindow> {
        let bounds = self
            .video
            .display_bounds(device.index as i32)
            .map_err(Error::initialization)?;

        let mut builder = self.video.window(&spec.title, spec.width, spec.height);
        match spec.mode {
            RendererMode::Window => {
                let x = bounds.x() + (bounds.width() as i32 - spec.width as i32) / 2;
                let y = bounds.y() + (bounds.height() as i32 - spec.height as i32) / 2;
                builder.position(x, y);
            },
            RendererMode::FullScreen => {
                builder.position(bounds.x(), bounds.y()).fullscreen();
            },
            RendererMode::WindowedFullScreen => {
                builder.position(bounds.x(), bounds.y()).fullscreen_desktop();
            },
        }
        let window = builder
            .build()
            .map_err(|e| Error::initialization(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if spec.flags.contains(RendererFlags::WAIT_RETRACE) {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| Error::initialization(e.to_string()))?;
        let texture_creator = canvas.texture_creator();
        let event_pump = self.sdl.event_pump().map_err(Error::initialization)?;

        debug!(device = %device, mode = %spec.mode, "sdl window opened");
        Ok(SdlWindow {
            canvas,
            texture_creator,
            event_pump,
        })
    }
}

pub struct SdlWindow {
    canvas: Canvas<SdlVideoWindow>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
}

impl Window for SdlWindow {
    fn size(&self) -> (u32, u32) {
        self.canvas.window().size()
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                }
                | Event::Window {
                    win_event: SdlWindowEvent::Close,
                    ..
                } => events.push(WindowEvent::CloseRequested),
                Event::Window {
                    win_event: SdlWindowEvent::SizeChanged(w, h),
                    ..
                } => events.push(WindowEvent::Resized {
                    width: w.max(0) as u32,
                    height: h.max(0) as u32,
                }),
                Event::MouseButtonDown {
                    x, y, mouse_btn, ..
                } => {
                    if let Some(button) = map_mouse_button(mouse_btn) {
                        events.push(WindowEvent::MouseButton {
                            button,
                            state: ButtonState::Pressed,
                            x,
                            y,
                        });
                    }
                },
                Event::MouseButtonUp {
                    x, y, mouse_btn, ..
                } => {
                    if let Some(button) = map_mouse_button(mouse_btn) {
                        events.push(WindowEvent::MouseButton {
                            button,
                            state: ButtonState::Released,
                            x,
                            y,
                        });
                    }
                },
                _ => {},
            }
        }

        events
    }

    fn present(&mut self, frame: &PixelBuffer, placement: Placement) -> Result<()> {
        // Texture<'a> borrows the creator, so a streaming texture lives for one present.
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, frame.width(), frame.height())
            .map_err(|e| Error::initialization(e.to_string()))?;
        texture
            .update(None, frame.as_bytes(), frame.stride())
            .map_err(|e| Error::initialization(e.to_string()))?;

        let dst = Rect::new(placement.x, placement.y, placement.width, placement.height);
        self.canvas.set_draw_color(SdlColor::RGB(0, 0, 0));
        self.canvas.clear();
        self.canvas.copy(&texture, None, Some(dst)).map_err(Error::initialization)?;
        self.canvas.present();
        Ok(())
    }
}

fn map_mouse_button(btn: SdlMouseButton) -> Option<MouseButton> {
    match btn {
        SdlMouseButton::Left => Some(MouseButton::Left),
        SdlMouseButton::Right => Some(MouseButton::Right),
        SdlMouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}
