//! The backdrop pass: starfield dome and sun marker behind the cube.

use terra_astro::DEGREES_PER_HOUR;
use terra_geom::Body;
use terra_host::{
    BackdropView, Capability, ChainAction, MultiOutputMode, PaintContext, StateMask, with_matrix,
    with_saved_state,
};

use crate::textures::TextureSlot;
use crate::view::GlobeView;

/// Replace the host's default face clear with the sky dome and sun marker.
///
/// The dome tracks the cube rotation plus the globe's latitude/longitude, so
/// the sky appears fixed relative to the earth's surface; the sun marker then
/// reuses the hour-angle/declination rotation and is pushed outward along one
/// axis. The depth buffer is cleared afterwards so the dome's depth values
/// never occlude scene content.
pub fn clear_backdrop(
    context: &mut dyn PaintContext,
    view: &BackdropView,
    globe: &GlobeView<'_>,
    previous_output: usize,
) -> ChainAction {
    if view.viewer_inside {
        return ChainAction::Continue;
    }

    // The face being cleared belongs to the output after the one the inset
    // pass painted last.
    let output = globe.screen.output_after(previous_output);
    let ratio = match globe.mode {
        MultiOutputMode::OneBigCube => globe.screen.aspect(),
        _ => output.aspect(),
    };

    with_saved_state(
        context,
        StateMask::ENABLE | StateMask::LIGHTING | StateMask::TEXTURE,
        |context| {
            context.disable(Capability::Lighting);

            with_matrix(context, |context| {
                context.scale(ratio, 1.0, ratio);

                context.rotate(view.v_rotate - 90.0, 1.0, 0.0, 0.0);
                context.rotate(view.x_rotate, 0.0, 0.0, 1.0);
                context.rotate(globe.latitude, 1.0, 0.0, 0.0);
                context.rotate(globe.longitude + 180.0, 0.0, 0.0, 1.0);

                if let Some(sky) = globe.textures.get(TextureSlot::Sky) {
                    context.bind_texture(0, sky);
                    context.call_list(globe.lists.get(Body::Sky));
                    context.unbind_texture(0);
                }

                // Continue into the sun's frame and park the marker off-axis.
                context.rotate(
                    -globe.solar.hour_angle_hours * DEGREES_PER_HOUR,
                    0.0,
                    0.0,
                    1.0,
                );
                context.rotate(globe.solar.declination_deg, 1.0, 0.0, 0.0);
                context.translate(0.0, -5.0, 0.0);
                context.call_list(globe.lists.get(Body::Sun));
            });
        },
    );

    context.clear_depth();

    ChainAction::Replace
}
