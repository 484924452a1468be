//! Pixel transforms applied to the raw cloud download.
//!
//! Decoded images are held as packed 32-bit native-endian words. On
//! little-endian targets the in-memory byte order of a pixel is B,G,R,A;
//! on big-endian targets it is A,R,G,B. The alpha-derivation step copies the
//! blue byte into the alpha byte, so the overlay's opacity follows cloud
//! brightness.

use std::path::Path;

use image::RgbaImage;

use crate::error::TransformError;

/// Byte order of the packed pixel words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Pixel bytes are B,G,R,A (alpha at offset 3).
    Little,
    /// Pixel bytes are A,R,G,B (alpha at offset 0).
    Big,
}

impl ByteOrder {
    /// The byte order of the compilation target.
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    /// Offset of the alpha byte within a pixel.
    pub fn alpha_offset(self) -> usize {
        match self {
            ByteOrder::Little => 3,
            ByteOrder::Big => 0,
        }
    }

    /// Offset of the blue byte within a pixel.
    pub fn blue_offset(self) -> usize {
        match self {
            ByteOrder::Little => 0,
            ByteOrder::Big => 3,
        }
    }

    fn channel_offsets(self) -> [usize; 4] {
        // Offsets of R, G, B, A within a packed pixel.
        match self {
            ByteOrder::Little => [2, 1, 0, 3],
            ByteOrder::Big => [1, 2, 3, 0],
        }
    }
}

/// A decoded image as packed 32-bit native-endian pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePixels {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImagePixels {
    /// Convert from the codec's RGBA byte layout into packed native pixels.
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let rgba = image.into_raw();
        let [r, g, b, a] = ByteOrder::NATIVE.channel_offsets();

        let mut data = vec![0u8; rgba.len()];
        for (dst, src) in data.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
            dst[r] = src[0];
            dst[g] = src[1];
            dst[b] = src[2];
            dst[a] = src[3];
        }

        Self {
            data,
            width,
            height,
        }
    }

    /// Convert back into the codec's RGBA layout for encoding.
    pub fn to_rgba(&self) -> Result<RgbaImage, TransformError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(TransformError::BadDimensions {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            });
        }

        let [r, g, b, a] = ByteOrder::NATIVE.channel_offsets();
        let mut rgba = vec![0u8; self.data.len()];
        for (dst, src) in rgba.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            dst[0] = src[r];
            dst[1] = src[g];
            dst[2] = src[b];
            dst[3] = src[a];
        }

        RgbaImage::from_raw(self.width, self.height, rgba).ok_or(TransformError::BadDimensions {
            width: self.width,
            height: self.height,
            len: self.data.len(),
        })
    }
}

/// Copy each pixel's blue byte into its alpha byte.
///
/// The byte positions depend on the packed word's byte order, so both
/// branches are kept explicit; big-endian targets are real deployment
/// targets, not dead code. Re-running the derivation on its own output is a
/// no-op for the same byte order.
pub fn derive_alpha(pixels: &mut [u8], order: ByteOrder) {
    let alpha = order.alpha_offset();
    let blue = order.blue_offset();
    for pixel in pixels.chunks_exact_mut(4) {
        pixel[alpha] = pixel[blue];
    }
}

/// Reverse the row order of a tightly packed 32-bit image.
///
/// The source row for output row `h` is `height − 1 − h`; each row is moved
/// with a byte-exact copy. Flipping twice reproduces the input.
pub fn flip_vertical(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let stride = width as usize * 4;
    let mut flipped = vec![0u8; pixels.len()];
    for h in 0..height as usize {
        let src = (height as usize - 1 - h) * stride;
        flipped[h * stride..(h + 1) * stride].copy_from_slice(&pixels[src..src + stride]);
    }
    flipped
}

/// The full post-fetch transform, run synchronously on the render thread:
/// decode the raw download, derive alpha from blue, flip vertically, and
/// write the processed image next to it for reuse across restarts.
///
/// Returns the processed pixels ready for texture upload.
pub fn process_raw_clouds(raw_path: &Path, out_path: &Path) -> Result<ImagePixels, TransformError> {
    let decoded = image::open(raw_path)?.to_rgba8();
    let mut pixels = ImagePixels::from_rgba(decoded);

    derive_alpha(&mut pixels.data, ByteOrder::NATIVE);
    pixels.data = flip_vertical(&pixels.data, pixels.width, pixels.height);

    pixels
        .to_rgba()?
        .save_with_format(out_path, image::ImageFormat::Png)?;

    log::debug!(
        "Processed cloud image {}x{} -> {}",
        pixels.width,
        pixels.height,
        out_path.display()
    );
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 200 } else { 10 };
                data.extend_from_slice(&[v, v / 2, v / 4, 255]);
            }
        }
        data
    }

    #[test]
    fn test_alpha_comes_from_blue_little_endian() {
        // Little-endian pixel: B,G,R,A.
        let mut pixels = vec![77u8, 1, 2, 0];
        derive_alpha(&mut pixels, ByteOrder::Little);
        assert_eq!(pixels, vec![77, 1, 2, 77]);
    }

    #[test]
    fn test_alpha_comes_from_blue_big_endian() {
        // Big-endian pixel: A,R,G,B.
        let mut pixels = vec![0u8, 1, 2, 77];
        derive_alpha(&mut pixels, ByteOrder::Big);
        assert_eq!(pixels, vec![77, 1, 2, 77]);
    }

    #[test]
    fn test_alpha_derivation_is_idempotent() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let mut pixels = checkerboard(8, 4);
            derive_alpha(&mut pixels, order);
            let once = pixels.clone();
            derive_alpha(&mut pixels, order);
            assert_eq!(pixels, once, "{order:?}: re-derivation must be a no-op");
        }
    }

    #[test]
    fn test_flip_moves_the_top_row_to_the_bottom() {
        // 1x3 image, one distinct byte pattern per row.
        let pixels = vec![
            1, 1, 1, 1, //
            2, 2, 2, 2, //
            3, 3, 3, 3,
        ];
        let flipped = flip_vertical(&pixels, 1, 3);
        assert_eq!(
            flipped,
            vec![
                3, 3, 3, 3, //
                2, 2, 2, 2, //
                1, 1, 1, 1,
            ]
        );
    }

    #[test]
    fn test_flip_is_an_involution() {
        let pixels = checkerboard(16, 9);
        let twice = flip_vertical(&flip_vertical(&pixels, 16, 9), 16, 9);
        assert_eq!(twice, pixels, "Flipping twice must reproduce the input");
    }

    #[test]
    fn test_rgba_roundtrip_preserves_pixels() {
        let image = RgbaImage::from_fn(4, 2, |x, y| {
            image::Rgba([x as u8 * 10, y as u8 * 20, 30, 255])
        });
        let packed = ImagePixels::from_rgba(image.clone());
        let back = packed.to_rgba().unwrap();
        assert_eq!(back.as_raw(), image.as_raw());
    }

    #[test]
    fn test_native_packing_places_blue_at_documented_offset() {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 40]));
        let packed = ImagePixels::from_rgba(image);
        assert_eq!(packed.data[ByteOrder::NATIVE.blue_offset()], 30);
        assert_eq!(packed.data[ByteOrder::NATIVE.alpha_offset()], 40);
    }

    #[test]
    fn test_bad_dimensions_are_rejected() {
        let pixels = ImagePixels {
            data: vec![0u8; 10],
            width: 2,
            height: 2,
        };
        assert!(matches!(
            pixels.to_rgba(),
            Err(TransformError::BadDimensions { .. })
        ));
    }

    #[test]
    fn test_process_raw_clouds_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("clouds.jpg");
        let out = dir.path().join("clouds.png");

        // A gradient so the flip is observable after JPEG compression.
        let image = RgbaImage::from_fn(32, 16, |_, y| {
            let v = (y * 16) as u8;
            image::Rgba([v, v, v, 255])
        });
        image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(&raw, image::ImageFormat::Jpeg)
            .unwrap();

        let pixels = process_raw_clouds(&raw, &out).unwrap();
        assert_eq!((pixels.width, pixels.height), (32, 16));
        assert!(out.exists(), "Processed PNG should be written");

        // After the flip, the brightest row sits at the top.
        let stride = 32 * 4;
        let blue = ByteOrder::NATIVE.blue_offset();
        let top = pixels.data[blue] as i32;
        let bottom = pixels.data[(16 - 1) * stride + blue] as i32;
        assert!(
            top > bottom,
            "Expected flipped gradient (top {top} > bottom {bottom})"
        );
    }
}
