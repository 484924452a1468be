//! Tessellated sphere geometry shared by the four celestial bodies.
//!
//! All four bodies (sun marker, earth, cloud shell, sky dome) are stacked-band
//! spheres with per-vertex normals and texture coordinates, differing only in
//! radius and winding. The cache is built once at startup and never mutated.

mod bodies;
mod sphere;

pub use bodies::{Body, GeometryCache};
pub use sphere::{SPHERE_BANDS, SphereMesh, SphereVertex, Winding, tessellate_sphere};
