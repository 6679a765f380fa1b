use std::path::PathBuf;

use clap::Parser;

/// Headless driver: runs a scripted editing session against the engine
/// and writes the resulting canvas to a PNG.
#[derive(Parser, Debug)]
#[command(name = "rasterpad", version, about = "Raster editor core engine demo driver")]
pub struct CliArgs {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Output PNG path.
    #[arg(short, long, default_value = "rasterpad-demo.png")]
    pub output: PathBuf,
}
