pub mod cell;
pub mod config;
pub mod frame;
pub mod grid;
pub mod lighting;
pub mod palette;
pub mod pixel;
pub mod renderer;
pub mod sample;
pub mod sampler;
pub mod utils;
