//! Test scenes for the `play` command
//!
//! | test | sprites                                                    |
//! |------|------------------------------------------------------------|
//! | 1    | blue/gray checkerboard background                          |
//! | 2    | + elapsed-seconds label in the lower left                  |
//! | 3    | + translucent color stripes turning slowly                 |

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::bitmap::generate;
use crate::color::Color;
use crate::config::DemoConfig;
use crate::error::{Error, Result};
use crate::math3d::Vec3;
use crate::render::{
    ButtonState, FramePacer, MouseButton, Platform, Renderer, RendererEvent, Sprite, StopFlag,
};

/// Highest scene number
pub const MAX_TEST: u32 = 3;

const BACKGROUND: Color = Color::DARK_BLUE;

const BACKGROUND_KEY: &str = "1";
const TIMER_KEY: &str = "fps";
const STRIPES_KEY: &str = "rect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    WindowClosed,
    /// Button released in the top-left corner
    CornerClick,
    StopFlag,
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub frames: u64,
    pub reason: StopReason,
}

/// Open the window described by `config`
pub fn initialize<P: Platform>(renderer: &mut Renderer<P>, config: &DemoConfig) -> Result<()> {
    let devices = renderer.devices()?;
    let device = devices.get(config.display as usize).ok_or_else(|| {
        Error::invalid_argument(format!(
            "display {} does not exist ({} available)",
            config.display,
            devices.len()
        ))
    })?;
    renderer.set_aspect_correction(config.aspect);
    renderer.initialize(
        device,
        config.mode,
        config.flags(),
        config.width,
        config.height,
        &config.title,
    )
}

/// Sprites for scene `test`, back to front
pub fn build_scene<P: Platform>(renderer: &mut Renderer<P>, test: u32) -> Result<Vec<Sprite>> {
    let mut sprites = Vec::new();
    if test > 0 {
        let mut bg = renderer.create_sprite(BACKGROUND_KEY);
        bg.set_texture(&generate::checkerboard(64, 64, 8, 8, Color::BLUE, Color::GRAY)?);
        sprites.push(bg);
    }
    if test > 1 {
        let mut timer = renderer.create_sprite(TIMER_KEY);
        timer.position = Vec3::new(-0.75, -0.75, 0.0);
        timer.scale = Vec3::new(0.3, 0.2, 1.0);
        sprites.push(timer);
    }
    if test > 2 {
        let mut rect = renderer.create_sprite(STRIPES_KEY);
        rect.alpha = 0.6;
        rect.scale = Vec3::new(0.6, 0.6, 1.0);
        rect.set_texture(&generate::color_stripes(256, 256, false)?);
        sprites.push(rect);
    }
    debug!(test, sprites = sprites.len(), "scene built");
    Ok(sprites)
}

/// Advance animated sprites to `elapsed`
pub fn update_scene(sprites: &mut [Sprite], test: u32, elapsed: Duration) -> Result<()> {
    if test > 1 {
        if let Some(timer) = sprite_mut(sprites, TIMER_KEY) {
            let text = format!("{:.2}", elapsed.as_secs_f32());
            timer.set_texture(&generate::label(
                150,
                50,
                Color::GOLDENROD,
                Color::TRANSPARENT,
                &text,
                0.8,
            )?);
        }
    }
    if test > 2 {
        if let Some(rect) = sprite_mut(sprites, STRIPES_KEY) {
            rect.rotation = Vec3::new(0.0, 0.0, elapsed.as_millis() as f32 / 3000.0);
        }
    }
    Ok(())
}

fn sprite_mut<'a>(sprites: &'a mut [Sprite], key: &str) -> Option<&'a mut Sprite> {
    sprites.iter_mut().find(|s| s.key() == key)
}

/// Run the frame loop until the window closes, the stop flag is raised, or
/// `max_frames` frames have been presented.
///
/// A right click cycles the aspect correction. Releasing any button in the
/// top-left tenth of the window ends the loop.
pub fn play<P: Platform>(
    renderer: &mut Renderer<P>,
    config: &DemoConfig,
    stop: &StopFlag,
    max_frames: Option<u64>,
) -> Result<PlayOutcome> {
    let mut sprites = build_scene(renderer, config.test)?;
    let mut pacer = FramePacer::new(Duration::from_millis(config.frame_interval_ms));
    let started = Instant::now();
    let mut frames = 0u64;
    info!(test = config.test, "play started");

    let reason = loop {
        if let Some(reason) = handle_events(renderer) {
            break reason;
        }
        if stop.is_stopped() {
            break StopReason::StopFlag;
        }
        if max_frames.is_some_and(|max| frames >= max) {
            break StopReason::FrameLimit;
        }

        update_scene(&mut sprites, config.test, started.elapsed())?;
        renderer.clear(BACKGROUND)?;
        renderer.render(&sprites)?;
        renderer.present()?;
        frames += 1;

        if let Some(fps) = pacer.tick() {
            info!(fps = fps.round() as u32, "FPS");
        }
    };

    renderer.close();
    info!(frames, ?reason, "play finished");
    Ok(PlayOutcome { frames, reason })
}

fn handle_events<P: Platform>(renderer: &mut Renderer<P>) -> Option<StopReason> {
    let mut stop = None;
    for event in renderer.poll_events() {
        match event {
            RendererEvent::Closed => return Some(StopReason::WindowClosed),
            RendererEvent::MouseButtonChanged(e) => match e.state {
                ButtonState::Pressed => {
                    debug!(
                        x = e.position.0,
                        y = e.position.1,
                        nx = e.position_norm.0,
                        ny = e.position_norm.1,
                        "mouse click"
                    );
                },
                ButtonState::Released => {
                    if e.position_norm.0 < 0.1 && e.position_norm.1 < 0.1 {
                        stop = Some(StopReason::CornerClick);
                    }
                    if e.button == MouseButton::Right {
                        let next = renderer.aspect_correction().next();
                        info!(aspect = %next, "aspect correction");
                        renderer.set_aspect_correction(next);
                    }
                },
            },
        }
    }
    stop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessPlatform;

    fn started(config: &DemoConfig) -> Renderer<HeadlessPlatform> {
        let mut r = Renderer::new(HeadlessPlatform::new());
        initialize(&mut r, config).unwrap();
        r
    }

    #[test]
    fn test_scene_sizes() {
        let mut r = started(&DemoConfig::default());
        for test in 0..=MAX_TEST {
            assert_eq!(build_scene(&mut r, test).unwrap().len(), test as usize);
        }
    }

    #[test]
    fn test_update_scene_animates() {
        let mut r = started(&DemoConfig::default());
        let mut sprites = build_scene(&mut r, 3).unwrap();
        assert!(sprites[1].texture().is_none());
        update_scene(&mut sprites, 3, Duration::from_millis(3000)).unwrap();
        assert!(sprites[1].texture().is_some());
        assert!((sprites[2].rotation.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_scene_finds_sprites_by_key() {
        let mut r = started(&DemoConfig::default());
        let mut sprites = build_scene(&mut r, 3).unwrap();
        sprites.reverse();
        update_scene(&mut sprites, 3, Duration::from_millis(1500)).unwrap();

        let timer = sprites.iter().find(|s| s.key() == TIMER_KEY).unwrap();
        let stripes = sprites.iter().find(|s| s.key() == STRIPES_KEY).unwrap();
        let background = sprites.iter().find(|s| s.key() == BACKGROUND_KEY).unwrap();
        assert_eq!((timer.texture().unwrap().width(), timer.texture().unwrap().height()), (150, 50));
        assert!((stripes.rotation.z - 0.5).abs() < 1e-6);
        assert_eq!(background.rotation, Vec3::zero());
        assert_eq!(background.texture().unwrap().width(), 64);
    }

    #[test]
    fn test_missing_display() {
        let config = DemoConfig {
            display: 7,
            ..DemoConfig::default()
        };
        let mut r = Renderer::new(HeadlessPlatform::new());
        assert!(matches!(initialize(&mut r, &config), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_play_frame_limit() {
        let config = DemoConfig {
            width: 64,
            height: 48,
            frame_interval_ms: 0,
            test: 3,
            ..DemoConfig::default()
        };
        let mut r = started(&config);
        let outcome = play(&mut r, &config, &StopFlag::new(), Some(3)).unwrap();
        assert_eq!(outcome, PlayOutcome { frames: 3, reason: StopReason::FrameLimit });
    }

    #[test]
    fn test_play_stop_flag() {
        let config = DemoConfig {
            width: 32,
            height: 32,
            frame_interval_ms: 0,
            ..DemoConfig::default()
        };
        let mut r = started(&config);
        let stop = StopFlag::new();
        stop.stop();
        let outcome = play(&mut r, &config, &stop, None).unwrap();
        assert_eq!(outcome.reason, StopReason::StopFlag);
        assert_eq!(outcome.frames, 0);
    }
}
