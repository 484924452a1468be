//! Host-side retained draw lists for the four bodies.

use terra_geom::{Body, GeometryCache};
use terra_host::{DrawListId, PaintContext};

/// Draw-list handles for sun, earth, clouds, and sky.
pub struct BodyLists {
    lists: [DrawListId; 4],
}

impl BodyLists {
    /// Create one retained list per body from the geometry cache.
    pub fn build(context: &mut dyn PaintContext, geometry: &GeometryCache) -> Self {
        let lists = Body::ALL.map(|body| {
            let mesh = geometry.mesh(body);
            context.create_draw_list(&mesh.vertices, &mesh.indices)
        });
        log::debug!("Created {} body draw lists", lists.len());
        Self { lists }
    }

    /// The list for a body.
    pub fn get(&self, body: Body) -> DrawListId {
        self.lists[body.index()]
    }

    /// Destroy all lists. Called at screen detach.
    pub fn destroy(&self, context: &mut dyn PaintContext) {
        for list in self.lists {
            context.destroy_draw_list(list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_host::RecordingContext;
    use terra_host::recording::Call;

    #[test]
    fn test_build_creates_four_distinct_lists() {
        let mut context = RecordingContext::new();
        let geometry = GeometryCache::build();
        let lists = BodyLists::build(&mut context, &geometry);

        let mut ids = Body::ALL.map(|body| lists.get(body));
        ids.sort_by_key(|id| id.0);
        ids.windows(2).for_each(|pair| assert_ne!(pair[0], pair[1]));
    }

    #[test]
    fn test_destroy_releases_every_list() {
        let mut context = RecordingContext::new();
        let geometry = GeometryCache::build();
        let lists = BodyLists::build(&mut context, &geometry);

        lists.destroy(&mut context);
        assert_eq!(
            context.count(|call| matches!(call, Call::DestroyDrawList(_))),
            4
        );
    }
}
