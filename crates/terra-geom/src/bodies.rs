//! The four celestial bodies and their shared geometry cache.

use crate::sphere::{SphereMesh, Winding, tessellate_sphere};

/// A body drawn by the globe effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Body {
    /// Small inward-facing shell acting as the sun marker in the backdrop.
    Sun,
    /// Unit-radius outward-facing sphere carrying the day/night maps.
    Earth,
    /// Slightly larger outward-facing shell carrying the cloud overlay.
    Clouds,
    /// Large inward-facing dome carrying the starfield.
    Sky,
}

impl Body {
    /// All bodies in cache order.
    pub const ALL: [Body; 4] = [Body::Sun, Body::Earth, Body::Clouds, Body::Sky];

    /// Sphere radius for this body.
    pub fn radius(self) -> f32 {
        match self {
            Body::Sun => 0.1,
            Body::Earth => 1.0,
            Body::Clouds => 1.01,
            Body::Sky => 10.0,
        }
    }

    /// Sphere winding for this body.
    pub fn winding(self) -> Winding {
        match self {
            Body::Sun | Body::Sky => Winding::Inward,
            Body::Earth | Body::Clouds => Winding::Outward,
        }
    }

    /// Stable index into per-body arrays.
    pub fn index(self) -> usize {
        match self {
            Body::Sun => 0,
            Body::Earth => 1,
            Body::Clouds => 2,
            Body::Sky => 3,
        }
    }
}

/// Precomputed sphere meshes for all four bodies.
///
/// Built once at screen initialization and read-only afterwards; the host
/// turns each mesh into a retained draw list.
pub struct GeometryCache {
    meshes: [SphereMesh; 4],
}

impl GeometryCache {
    /// Tessellate all four bodies.
    pub fn build() -> Self {
        let meshes = Body::ALL.map(|body| tessellate_sphere(body.radius(), body.winding()));
        Self { meshes }
    }

    /// The cached mesh for a body.
    pub fn mesh(&self, body: Body) -> &SphereMesh {
        &self.meshes[body.index()]
    }
}
