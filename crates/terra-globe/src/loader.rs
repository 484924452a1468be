//! Parallel startup loading of the steady texture images.
//!
//! Four short-lived worker threads each decode one image; all are joined
//! before the first upload, so the GPU context is only ever touched by the
//! render thread.

use std::path::Path;

use terra_clouds::ImagePixels;
use terra_config::DataLayout;
use terra_render::TextureSlot;

/// Decode the four steady textures in parallel. Missing or undecodable files
/// yield `None` for their slot; the effect renders those slots blank.
pub(crate) fn load_steady_textures(layout: &DataLayout) -> Vec<(TextureSlot, Option<ImagePixels>)> {
    let jobs = [
        (TextureSlot::Day, layout.day_texture(), "texture-day"),
        (TextureSlot::Night, layout.night_texture(), "texture-night"),
        (TextureSlot::Sky, layout.sky_texture(), "texture-sky"),
        (
            TextureSlot::Clouds,
            layout.clouds_processed(),
            "texture-clouds",
        ),
    ];

    let mut pending = Vec::with_capacity(jobs.len());
    for (slot, path, name) in jobs {
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || load_image(&worker_path));
        match spawned {
            Ok(handle) => pending.push((slot, Ok(handle))),
            Err(e) => {
                log::warn!("Could not spawn {name} loader: {e}; decoding inline");
                pending.push((slot, Err(path)));
            }
        }
    }

    pending
        .into_iter()
        .map(|(slot, job)| match job {
            Ok(handle) => (slot, handle.join().unwrap_or(None)),
            Err(path) => (slot, load_image(&path)),
        })
        .collect()
}

fn load_image(path: &Path) -> Option<ImagePixels> {
    if !path.exists() {
        log::debug!("Texture not found: {}", path.display());
        return None;
    }
    match image::open(path) {
        Ok(decoded) => Some(ImagePixels::from_rgba(decoded.to_rgba8())),
        Err(e) => {
            log::warn!("Could not decode {}: {e}", path.display());
            None
        }
    }
}
