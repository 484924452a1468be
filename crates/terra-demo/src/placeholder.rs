//! Procedural placeholder textures for first runs without bundled assets.
//!
//! Real day/night/starfield maps can be dropped into the images directory at
//! any time; these generators only fill slots that are empty so the demo
//! shows something meaningful out of the box.

use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terra_config::DataLayout;

const MAP_WIDTH: u32 = 1024;
const MAP_HEIGHT: u32 = 512;
const SKY_SIZE: u32 = 1024;

/// Generate any missing placeholder texture.
pub fn ensure_placeholder_textures(layout: &DataLayout) {
    let jobs: [(std::path::PathBuf, fn() -> RgbaImage); 3] = [
        (layout.day_texture(), generate_day),
        (layout.night_texture(), generate_night),
        (layout.sky_texture(), generate_sky),
    ];

    for (path, generate) in jobs {
        if path.exists() {
            continue;
        }
        match generate().save_with_format(&path, image::ImageFormat::Png) {
            Ok(()) => tracing::info!("Generated placeholder {}", path.display()),
            Err(e) => tracing::warn!("Could not write placeholder {}: {e}", path.display()),
        }
    }
}

/// Smooth pseudo-continent coverage in [0, 1] from overlapping sinusoids.
fn landness(u: f32, v: f32) -> f32 {
    let a = ((u * 4.0 + 0.7).sin() * (v * 3.0 + 1.3).sin()).max(0.0);
    let b = ((u * 7.0 + 2.9).sin() * (v * 5.0 + 0.4).cos()).max(0.0);
    let c = ((u * 2.0 - 1.1).cos() * (v * 2.0 + 2.2).sin()).max(0.0);
    (a * 0.5 + b * 0.3 + c * 0.4).min(1.0)
}

fn map_coords(x: u32, y: u32) -> (f32, f32) {
    let u = x as f32 / MAP_WIDTH as f32 * std::f32::consts::TAU;
    let v = y as f32 / MAP_HEIGHT as f32 * std::f32::consts::PI;
    (u, v)
}

fn is_polar(v: f32) -> bool {
    v < 0.22 || v > std::f32::consts::PI - 0.22
}

fn generate_day() -> RgbaImage {
    RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
        let (u, v) = map_coords(x, y);
        if is_polar(v) {
            return Rgba([228, 236, 244, 255]);
        }

        let land = landness(u, v);
        if land > 0.45 {
            let t = ((land - 0.45) / 0.55).min(1.0);
            let r = 60.0 + 70.0 * t;
            let g = 110.0 - 30.0 * t;
            let b = 50.0;
            Rgba([r as u8, g as u8, b as u8, 255])
        } else {
            Rgba([18, 49, 94, 255])
        }
    })
}

fn generate_night() -> RgbaImage {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7e11);
    RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
        let (u, v) = map_coords(x, y);
        let land = landness(u, v);
        // Sparse amber city lights on land away from the poles.
        if !is_polar(v) && land > 0.5 && rng.random::<f32>() < 0.035 {
            Rgba([235, 180, 90, 255])
        } else {
            Rgba([4, 5, 12, 255])
        }
    })
}

fn generate_sky() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(SKY_SIZE, SKY_SIZE, Rgba([1, 1, 4, 255]));
    let mut rng = ChaCha8Rng::seed_from_u64(0x57a2);

    for _ in 0..2200 {
        let x = rng.random_range(0..SKY_SIZE);
        let y = rng.random_range(0..SKY_SIZE);
        let brightness = 90 + rng.random_range(0..160) as u8;
        let tint = rng.random_range(0..30) as u8;
        image.put_pixel(
            x,
            y,
            Rgba([
                brightness.saturating_sub(tint),
                brightness.saturating_sub(tint / 2),
                brightness,
                255,
            ]),
        );
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_match_declared_dimensions() {
        assert_eq!(generate_day().dimensions(), (MAP_WIDTH, MAP_HEIGHT));
        assert_eq!(generate_night().dimensions(), (MAP_WIDTH, MAP_HEIGHT));
        assert_eq!(generate_sky().dimensions(), (SKY_SIZE, SKY_SIZE));
    }

    #[test]
    fn test_day_map_has_ocean_and_land() {
        let day = generate_day();
        let mut ocean = 0u32;
        let mut land = 0u32;
        for pixel in day.pixels() {
            if pixel.0 == [18, 49, 94, 255] {
                ocean += 1;
            } else if pixel.0 != [228, 236, 244, 255] {
                land += 1;
            }
        }
        assert!(ocean > 0, "Placeholder day map needs ocean");
        assert!(land > 0, "Placeholder day map needs land");
    }

    #[test]
    fn test_sky_is_deterministic() {
        let a = generate_sky();
        let b = generate_sky();
        assert_eq!(a.as_raw(), b.as_raw(), "Seeded starfield must be stable");
    }
}
