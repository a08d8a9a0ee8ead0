use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use image::RgbaImage;
use log::{debug, info, warn};
use pixel_mirror::core_modules::frame::VideoFrame;
use pixel_mirror::core_modules::utils::image_helper::image_helper;
use pixel_mirror::pipeline::{MirrorPipeline, RenderMode, SessionConfig};
use pixel_mirror::raster::{PaletteAssets, RasterSurface};
use tokio::sync::watch;

const CANVAS_WIDTH: u32 = 640;
const CANVAS_HEIGHT: u32 = 480;
/// Disk mode reads a capture this many times smaller than the canvas.
const DISK_CAPTURE_SCALE: u32 = 4;
const FRAME_RATE_HZ: u64 = 60;
const DEFAULT_FRAMES: u64 = 30;
const DEFAULT_CELL_SIZE: u32 = 16;

#[derive(Debug)]
struct Args {
    input_path: String,
    output_path: String,
    mode: RenderMode,
    cell_size: u32,
    frames: u64,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: mirror_tester <input_image> <output_png> [mode] [cell_size] [frames]");
        println!("Modes: raw, grey, rainbow, palette, disk");
        return Ok(None);
    }
    let mode = match args.get(3) {
        Some(name) => RenderMode::from_name(name).with_context(|| format!("unknown mode '{name}'"))?,
        None => RenderMode::RawColor,
    };
    let cell_size = match args.get(4) {
        Some(value) => value.parse().with_context(|| format!("bad cell size '{value}'"))?,
        None => DEFAULT_CELL_SIZE,
    };
    let frames = match args.get(5) {
        Some(value) => value.parse().with_context(|| format!("bad frame count '{value}'"))?,
        None => DEFAULT_FRAMES,
    };
    if frames == 0 {
        bail!("frame count must be positive");
    }
    Ok(Some(Args {
        input_path: args[1].clone(),
        output_path: args[2].clone(),
        mode,
        cell_size,
        frames,
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    // --- 1. Argument Parsing & Setup ---
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    info!("Starting mirror_tester: {args:?}");

    // --- 2. Capture Initialization ---
    // The still image stands in for a camera. 2D modes capture at canvas size,
    // the disk mode at a coarser resolution.
    let (capture_width, capture_height) = if args.mode.is_3d() {
        (CANVAS_WIDTH / DISK_CAPTURE_SCALE, CANVAS_HEIGHT / DISK_CAPTURE_SCALE)
    } else {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    };
    let source = image::open(&args.input_path)
        .with_context(|| format!("opening input image {}", args.input_path))?;
    let capture = Arc::new(image_helper::to_capture(&source, capture_width, capture_height));
    info!("Capture resolution {capture_width}x{capture_height}");

    // --- 3. Mirror Pipeline Initialization ---
    let config = SessionConfig::new(CANVAS_WIDTH, CANVAS_HEIGHT)
        .with_mode(args.mode)
        .with_cell_size(args.cell_size);
    if config.cell_size() != args.cell_size {
        warn!("cell size {} clamped to {}", args.cell_size, config.cell_size());
    }
    let mut pipeline = MirrorPipeline::new(config, capture_width, capture_height)?;
    let mut surface = RasterSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    if args.mode == RenderMode::PaletteImage {
        let palette = match env::var("PALETTE_DIR") {
            Ok(dir) => PaletteAssets::load(&dir).with_context(|| format!("loading palette from {dir}"))?,
            Err(_) => {
                info!("PALETTE_DIR not set, stamping swatch tiles");
                PaletteAssets::swatches(args.cell_size)
            }
        };
        surface = surface.with_palette(palette);
    }

    // --- 4. Capture Task ---
    // Publishes frames into a watch channel; the render loop only ever sees the
    // most recent one.
    let (frame_tx, mut frame_rx) = watch::channel::<Option<Arc<RgbaImage>>>(None);
    let producer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(1000 / 30));
        loop {
            ticker.tick().await;
            if frame_tx.send(Some(Arc::clone(&capture))).is_err() {
                break;
            }
        }
    });

    // The core must not run before a frame exists.
    frame_rx
        .wait_for(|frame| frame.is_some())
        .await
        .context("capture task stopped before the first frame")?;

    // --- 5. Main Render Loop ---
    let mut ticker = tokio::time::interval(Duration::from_micros(1_000_000 / FRAME_RATE_HZ));
    for tick in 0..args.frames {
        ticker.tick().await;

        // Sweep the pointer across the canvas so the point light moves.
        let progress = (tick + 1) as f32 / args.frames as f32;
        pipeline.set_pointer(progress * CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32 / 2.0);

        let latest = frame_rx.borrow_and_update().clone();
        let Some(latest) = latest else {
            continue;
        };
        let frame = VideoFrame::new(latest.as_raw(), latest.width(), latest.height())?;
        let report = pipeline.render_frame(&frame, &mut surface)?;
        debug!("{report:?}");
    }
    drop(frame_rx);
    producer.abort();

    // --- 6. Write Output Frame ---
    image_helper::save(&args.output_path, surface.image())
        .with_context(|| format!("writing {}", args.output_path))?;

    info!(
        "Processing complete: {} frames, {}x{} cells. Output saved to {}",
        pipeline.frames_rendered(),
        pipeline.grid().cols,
        pipeline.grid().rows,
        args.output_path
    );
    Ok(())
}
