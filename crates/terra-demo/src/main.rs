//! Demo binary: a winit/wgpu host for the globe effect.
//!
//! Settings come from `terra.ron` in the data directory and can be
//! overridden on the command line. Run with
//! `cargo run -p terra-demo -- --latitude 48 --longitude 2 --timezone 1`
//! to match a real location.

mod app;
mod backend;
mod gpu;
mod pipelines;
mod placeholder;

use clap::Parser;
use terra_config::{CliArgs, DataLayout, Settings};

fn main() {
    let args = CliArgs::parse();

    let layout = args
        .data_dir
        .clone()
        .map(DataLayout::with_root)
        .or_else(|| DataLayout::discover().ok())
        .unwrap_or_else(|| DataLayout::with_root("./terra-data"));

    let mut settings = match Settings::load_or_create(layout.root()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Settings unavailable ({e}); falling back to defaults");
            Settings::default()
        }
    };
    settings.apply_cli_overrides(&args);

    terra_log::init_logging(
        Some(&layout.root().join("logs")),
        cfg!(debug_assertions),
        Some(&settings),
    );

    if let Err(e) = layout.ensure_dirs() {
        tracing::error!("Could not prepare {}: {e}", layout.root().display());
        std::process::exit(1);
    }
    placeholder::ensure_placeholder_textures(&layout);

    let width = args.width.unwrap_or(1280);
    let height = args.height.unwrap_or(720);
    app::run(settings, layout, width, height);
}
