//! The inset globe pass: lit earth plus cloud shell inside the cube.

use terra_astro::DEGREES_PER_HOUR;
use terra_geom::Body;
use terra_host::{
    BlendMode, Capability, ChainAction, FrameInput, MultiOutputMode, PaintContext, StateMask,
    with_matrix, with_saved_state,
};

use crate::textures::TextureSlot;
use crate::view::GlobeView;

/// Every state group the inset pass mutates.
pub const PASS_STATE: StateMask = StateMask(
    StateMask::COLOR.0
        | StateMask::TEXTURE.0
        | StateMask::DEPTH.0
        | StateMask::LIGHTING.0
        | StateMask::ENABLE.0,
);

/// Draw the globe inset for one cube face.
///
/// The sequence mirrors the fixed-function contract: save state, apply the
/// host transform and output placement, enable depth/lighting/blending,
/// orient the globe, position the sun light inside a matrix scope, draw the
/// earth (blended or day-only), draw the cloud shell, then unwind. All
/// mutated state is restored before returning, on every path.
pub fn paint_inside(
    context: &mut dyn PaintContext,
    frame: &FrameInput,
    view: &GlobeView<'_>,
) -> ChainAction {
    if frame.viewer_inside {
        return ChainAction::Continue;
    }

    // Aspect source depends on the host's multi-output mode.
    let ratio = match view.mode {
        MultiOutputMode::Automatic => view.screen.aspect(),
        _ => view.screen.output(frame.output).aspect(),
    };

    with_saved_state(context, PASS_STATE, |context| {
        with_matrix(context, |context| {
            context.load_matrix(frame.transform);
            context.translate(frame.output_offset.0, -frame.output_offset.1, 0.0);
            context.scale(frame.output_scale.0, frame.output_scale.1, 1.0);

            context.enable(Capability::DepthTest);

            with_matrix(context, |context| {
                context.enable(Capability::Lighting);
                context.enable(Capability::AuxLight);
                context.enable(Capability::Blend);
                context.disable(Capability::ColorMaterial);

                let size = view.earth_size;
                context.scale(ratio * size, size, ratio * size);

                // Globe orientation; south-on-top is a display mirroring,
                // not a physical effect.
                if view.south_on_top {
                    context.rotate(-view.latitude - 90.0, 1.0, 0.0, 0.0);
                    context.rotate(-view.longitude, 0.0, 0.0, 1.0);
                    context.rotate(180.0, 0.0, 1.0, 0.0);
                } else {
                    context.rotate(view.latitude - 90.0, 1.0, 0.0, 0.0);
                    context.rotate(view.longitude, 0.0, 0.0, 1.0);
                }

                // Sun placement: hour angle in hours, 15 degrees per hour.
                with_matrix(context, |context| {
                    context.rotate(
                        -view.solar.hour_angle_hours * DEGREES_PER_HOUR,
                        0.0,
                        0.0,
                        1.0,
                    );
                    context.rotate(-view.solar.declination_deg, 1.0, 0.0, 0.0);
                    context.set_light(&view.lights.sun);
                });

                draw_earth(context, view);
                draw_clouds(context, view);

                context.disable(Capability::AuxLight);
            });
        });
    });

    ChainAction::Continue
}

fn draw_earth(context: &mut dyn PaintContext, view: &GlobeView<'_>) {
    context.set_blend_mode(BlendMode::Replace);
    context.set_material(&view.lights.earth);

    let day = view.textures.get(TextureSlot::Day);
    let night = view.textures.get(TextureSlot::Night);
    let earth = view.lists.get(Body::Earth);

    // The program only runs when the user wants it; without it there is no
    // automatic day/night blend, by design.
    let program = if view.shaders_preferred {
        view.program.id()
    } else {
        None
    };

    match (program, day, night) {
        (Some(program), Some(day), Some(night)) => {
            context.bind_texture(0, day);
            context.bind_texture(1, night);
            context.use_program(Some(program));
            context.call_list(earth);
            context.use_program(None);
            context.unbind_texture(1);
            context.unbind_texture(0);
        }
        (_, Some(day), _) => {
            context.bind_texture(0, day);
            context.call_list(earth);
            context.unbind_texture(0);
        }
        _ => {
            // Day map missing: draw untextured rather than abort.
            context.call_list(earth);
        }
    }
}

fn draw_clouds(context: &mut dyn PaintContext, view: &GlobeView<'_>) {
    context.set_blend_mode(BlendMode::Alpha);
    context.set_material(&view.lights.clouds);

    // No clouds until the first successful refresh; the shell is skipped
    // entirely rather than drawn untextured.
    if let Some(clouds) = view.textures.get(TextureSlot::Clouds) {
        context.bind_texture(0, clouds);
        context.call_list(view.lists.get(Body::Clouds));
        context.unbind_texture(0);
    }
}
