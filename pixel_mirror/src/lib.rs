// THEORY:
// This file is the entry point for the `pixel_mirror` library crate. It exposes
// the `MirrorPipeline` and its configuration as the high-level interface: a host
// hands it one video frame per animation tick and a `Surface` to draw on, and the
// pipeline turns the frame into one draw command per grid cell.
//
// The building blocks live in `core_modules`:
// - sampling: `frame`, `grid`, `sampler` (where in the buffer each cell reads)
// - classification: `sample`, `palette` (brightness, hue angle, hue bucket)
// - rendering: `renderer`, `lighting`, `cell` (what each cell becomes on screen)
// - session state: `config` (the one mutable settings record)
//
// `raster` is a CPU `Surface` over `image::RgbaImage`. It lets the pipeline run
// headless, which is how the tester binary and the scenario tests observe output.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod raster;

pub use error::MirrorError;
