//! Stacked-band sphere tessellation with cached trigonometry.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Number of latitude bands and longitude segments per sphere.
pub const SPHERE_BANDS: usize = 64;

/// Whether a sphere's front faces point toward or away from its center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    /// Front faces point away from the center (a planet seen from outside).
    Outward,
    /// Front faces point toward the center (a dome seen from inside).
    Inward,
}

/// Vertex format for sphere meshes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const_assert_eq!(std::mem::size_of::<SphereVertex>(), 32);

/// An immutable tessellated sphere: interleaved vertices plus a triangle list
/// derived from the band quad strips.
#[derive(Clone, Debug)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Tessellate a sphere of the given radius into [`SPHERE_BANDS`] latitude
/// bands of [`SPHERE_BANDS`] segments each.
///
/// The polar axis is +Z and longitude is measured from +Y, so the texture
/// seam sits on the +Y meridian. Longitude index `SPHERE_BANDS` reuses the
/// index-0 trig values, making the seam vertices bit-exact duplicates. Ring
/// radii at both poles are forced to zero so the pole vertices coincide.
pub fn tessellate_sphere(radius: f32, winding: Winding) -> SphereMesh {
    let n = SPHERE_BANDS;

    // Longitude caches (angle around the polar axis).
    let mut sin_lon = [0.0f32; SPHERE_BANDS + 1];
    let mut cos_lon = [0.0f32; SPHERE_BANDS + 1];
    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        sin_lon[i] = angle.sin();
        cos_lon[i] = angle.cos();
    }
    sin_lon[n] = sin_lon[0];
    cos_lon[n] = cos_lon[0];

    // Latitude caches: radius-scaled ring/height plus unit normal components,
    // negated for inward winding.
    let flip = match winding {
        Winding::Outward => 1.0f32,
        Winding::Inward => -1.0f32,
    };
    let mut ring = [0.0f32; SPHERE_BANDS + 1];
    let mut height = [0.0f32; SPHERE_BANDS + 1];
    let mut normal_sin = [0.0f32; SPHERE_BANDS + 1];
    let mut normal_cos = [0.0f32; SPHERE_BANDS + 1];
    for j in 0..=n {
        let angle = std::f32::consts::PI * j as f32 / n as f32;
        ring[j] = radius * angle.sin();
        height[j] = radius * angle.cos();
        normal_sin[j] = flip * angle.sin();
        normal_cos[j] = flip * angle.cos();
    }
    ring[0] = 0.0;
    ring[n] = 0.0;

    let band_vertex = |i: usize, row: usize| SphereVertex {
        position: [ring[row] * sin_lon[i], ring[row] * cos_lon[i], height[row]],
        normal: [
            sin_lon[i] * normal_sin[row],
            cos_lon[i] * normal_sin[row],
            normal_cos[row],
        ],
        uv: [1.0 - i as f32 / n as f32, 1.0 - row as f32 / n as f32],
    };

    let mut vertices = Vec::with_capacity(n * 2 * (n + 1));
    let mut indices = Vec::with_capacity(n * n * 6);

    for j in 0..n {
        // Each band is a quad strip alternating between two latitude rows.
        // Outward spheres lead with the upper row, inward spheres with the
        // lower, keeping front faces on the textured side.
        let (row_a, row_b) = match winding {
            Winding::Outward => (j + 1, j),
            Winding::Inward => (j, j + 1),
        };

        let base = vertices.len() as u32;
        for i in 0..=n {
            vertices.push(band_vertex(i, row_a));
            vertices.push(band_vertex(i, row_b));
        }
        for quad in 0..n as u32 {
            let s = base + quad * 2;
            indices.extend_from_slice(&[s, s + 1, s + 2, s + 2, s + 1, s + 3]);
        }
    }

    SphereMesh { vertices, indices }
}
