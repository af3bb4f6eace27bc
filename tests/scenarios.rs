use pixmill::analysis;
use pixmill::bitmap::generate;
use pixmill::config::DemoConfig;
use pixmill::demo::{self, StopReason};
use pixmill::loader::{BitmapLoader, ImageFormat, Loader, LoaderContext};
use pixmill::render::{
    HeadlessPlatform, MouseButton, Renderer, RendererEvent, RendererFlags, RendererMode,
    RendererState, StopFlag,
};
use pixmill::transform::{self, ResizeMode, Translation};
use pixmill::{Color, Error, PixelBuffer};

fn demo_config() -> DemoConfig {
    DemoConfig {
        width: 80,
        height: 60,
        frame_interval_ms: 0,
        ..DemoConfig::default()
    }
}

#[test]
fn test_decode_then_stretch_doubles_quadrants() {
    let ctx = LoaderContext::default();
    let png = ctx.encode(&generate::quadrants(100, 100).unwrap(), ImageFormat::Png).unwrap();
    let image = ctx.decode(&png).unwrap();

    let big = transform::resize(&image, 200, 200, ResizeMode::Stretch).unwrap();
    assert_eq!((big.width(), big.height()), (200, 200));
    assert_eq!(big.pixel(50, 50), Some(Color::BLACK));
    assert_eq!(big.pixel(150, 50), Some(Color::RED));
    assert_eq!(big.pixel(50, 150), Some(Color::GREEN));
    assert_eq!(big.pixel(150, 150), Some(Color::BLUE));

    // Only the pixel pair straddling each boundary may mix.
    assert_eq!(big.pixel(98, 20), Some(Color::BLACK));
    assert_eq!(big.pixel(101, 20), Some(Color::RED));
    assert_eq!(big.pixel(20, 98), Some(Color::BLACK));
    assert_eq!(big.pixel(20, 101), Some(Color::GREEN));
}

#[test]
fn test_quadrant_resize_none_stays_native() {
    let image = generate::quadrants(100, 100).unwrap();
    let out = transform::resize(&image, 200, 200, ResizeMode::None).unwrap();
    assert_eq!((out.width(), out.height()), (200, 200));

    // Native 100x100 layout in the top-left corner.
    assert_eq!(out.pixel(25, 25), Some(Color::BLACK));
    assert_eq!(out.pixel(75, 25), Some(Color::RED));
    assert_eq!(out.pixel(25, 75), Some(Color::GREEN));
    assert_eq!(out.pixel(75, 75), Some(Color::BLUE));
    assert_eq!(out.pixel(49, 49), Some(Color::BLACK));
    assert_eq!(out.pixel(50, 50), Some(Color::BLUE));

    // Everything past the source is left empty.
    for (x, y) in [(150, 50), (50, 150), (150, 150), (100, 0), (0, 100), (199, 199)] {
        assert_eq!(out.pixel(x, y), Some(Color::TRANSPARENT), "({}, {})", x, y);
    }
}

#[test]
fn test_detect_colors_on_quadrants() {
    let image = generate::quadrants(200, 200).unwrap();
    let colors = analysis::detect_colors(&image, 4).unwrap();
    assert_eq!(colors, vec![Color::BLACK, Color::RED, Color::GREEN, Color::BLUE]);
    assert_eq!(analysis::detect_colors(&image, 2).unwrap().len(), 2);
}

#[test]
fn test_switching_loader_keeps_pixels() {
    let mut ctx = LoaderContext::default();
    let source = generate::color_stripes(32, 16, true).unwrap();
    let png = ctx.encode(&source, ImageFormat::Png).unwrap();

    let previous = ctx.set_loader(Loader::accelerated());
    assert_eq!(previous, Loader::software());
    let decoded = ctx.decode(&png).unwrap();
    assert!(decoded.pixels().eq(source.pixels()));

    // the accelerated backend only speaks PNG
    assert!(matches!(
        ctx.encode(&source, ImageFormat::Bmp),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_resize_none_keeps_native_pixels() {
    let image = generate::quadrants(10, 10).unwrap();
    let out = transform::resize(&image, 20, 30, ResizeMode::None).unwrap();
    assert_eq!((out.width(), out.height()), (20, 30));
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(out.pixel(x, y), image.pixel(x, y));
        }
    }
    assert_eq!(out.pixel(15, 25), Some(Color::TRANSPARENT));
}

#[test]
fn test_draw_flipped_twice_is_identity() {
    let image = generate::quadrants(16, 12).unwrap();
    let blank = PixelBuffer::new(16, 12).unwrap();
    for flip in [Translation::new().flipped_horizontally(), Translation::new().flipped_vertically()] {
        let once = transform::draw(&blank, &image, 0.0, 0.0, &flip).unwrap();
        assert_ne!(once, image);
        let twice = transform::draw(&blank, &once, 0.0, 0.0, &flip).unwrap();
        assert!(twice.pixels().eq(image.pixels()), "{:?}", flip);
    }
}

#[test]
fn test_translucent_round_trip_on_every_backend() {
    let image = PixelBuffer::from_fn(16, 16, |x, y| {
        Color::from_argb((1 + x * 15 + y) as u8, 200, 100, (x * 16) as u8)
    })
    .unwrap();
    for loader in [Loader::software(), Loader::accelerated()] {
        let ctx = LoaderContext::new(loader);
        for format in ImageFormat::ALL.into_iter().filter(|f| loader.supports(*f)) {
            let bytes = ctx.encode(&image, format).unwrap();
            let decoded = ctx.decode(&bytes).unwrap();
            assert_eq!(decoded, image, "{} via {}", format, loader.name());
        }
    }
}

#[test]
fn test_empty_backbuffer_opens_no_window() {
    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let mut renderer = Renderer::new(platform);
    let device = renderer.devices().unwrap().remove(0);

    let result = renderer.initialize(&device, RendererMode::Window, RendererFlags::empty(), 0, 0, "x");
    assert!(matches!(result, Err(Error::Initialization(_))));
    assert_eq!(handle.windows_opened(), 0);
    assert_eq!(renderer.state(), RendererState::Uninitialized);
}

#[test]
fn test_corner_click_stops_play() {
    let config = demo_config();
    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let mut renderer = Renderer::new(platform);
    demo::initialize(&mut renderer, &config).unwrap();

    handle.click(MouseButton::Left, 2, 2);
    let outcome = demo::play(&mut renderer, &config, &StopFlag::new(), Some(100)).unwrap();
    assert_eq!(outcome.reason, StopReason::CornerClick);
    assert_eq!(outcome.frames, 0);
    assert!(!handle.is_open());
}

#[test]
fn test_right_click_cycles_aspect() {
    let config = demo_config();
    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let mut renderer = Renderer::new(platform);
    demo::initialize(&mut renderer, &config).unwrap();
    assert_eq!(renderer.aspect_correction(), ResizeMode::None);

    handle.click(MouseButton::Right, 40, 30);
    let outcome = demo::play(&mut renderer, &config, &StopFlag::new(), Some(2)).unwrap();
    assert_eq!(outcome.reason, StopReason::FrameLimit);
    assert_eq!(renderer.aspect_correction(), ResizeMode::Stretch);
    assert_eq!(handle.presented(), 2);
}

#[test]
fn test_close_reports_closed_once() {
    let config = demo_config();
    let mut renderer = Renderer::new(HeadlessPlatform::new());
    demo::initialize(&mut renderer, &config).unwrap();
    demo::play(&mut renderer, &config, &StopFlag::new(), Some(1)).unwrap();

    assert_eq!(renderer.state(), RendererState::Closed);
    assert_eq!(renderer.poll_events(), vec![RendererEvent::Closed]);
    assert!(renderer.poll_events().is_empty());
}

#[test]
fn test_scene_frame_uses_background() {
    let config = DemoConfig {
        test: 0,
        ..demo_config()
    };
    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let mut renderer = Renderer::new(platform);
    demo::initialize(&mut renderer, &config).unwrap();
    demo::play(&mut renderer, &config, &StopFlag::new(), Some(1)).unwrap();

    let frame = handle.last_frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (80, 60));
    assert!(frame.pixels().all(|c| c == Color::DARK_BLUE));
}
