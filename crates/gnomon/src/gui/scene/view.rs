use super::{
    HINT_FONT_SIZE, HINT_MARGIN, SHADOW_ALPHA, SHADOW_ALPHA_FLOOR, SHADOW_ALPHA_STEP, Status,
};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use palette::Srgba;
use std::f64::consts::PI;
use umbra::engine::Snapshot;
use umbra::geometry::Point;
use umbra::scene::{self, Shadow};

pub fn draw(
    cr: &Context,
    snapshot: &Snapshot,
    status: Status,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    for shadow in snapshot.shadows.iter().rev() {
        draw_shadow(cr, snapshot, shadow, colors)?;
    }

    let min = snapshot.viewport.min_dimension;
    draw_dot(
        cr,
        snapshot.viewport.center(),
        scene::OBJECT_RADIUS * min,
        colors.object,
    )?;
    if let Some(point) = snapshot.north_indicator {
        draw_dot(cr, point, scene::NORTH_DOT_RADIUS * min, colors.north)?;
    }
    if let Some(point) = snapshot.sun_indicator {
        draw_dot(cr, point, scene::SUN_DOT_RADIUS * min, colors.sun)?;
    }

    if let Some(text) = status.hint() {
        draw_hint(cr, snapshot, text, colors)?;
    }
    Ok(())
}

/// The later the hour, the fainter its ellipse.
fn shadow_alpha(shadow: &Shadow) -> f64 {
    (SHADOW_ALPHA - f64::from(shadow.hour_offset) * SHADOW_ALPHA_STEP).max(SHADOW_ALPHA_FLOOR)
}

fn draw_shadow(
    cr: &Context,
    snapshot: &Snapshot,
    shadow: &Shadow,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let (r, g, b, _) = colors.shadow.into_components();
    cr.set_source_rgba(r, g, b, shadow_alpha(shadow));

    // The ellipse is laid out with the sun due south and then rotated about
    // the viewport center onto its real bearing.
    let pivot = snapshot.viewport.center();
    cr.save()?;
    cr.translate(pivot.x, pivot.y);
    cr.rotate(shadow.rotation_degrees.to_radians());
    cr.translate(shadow.center.x - pivot.x, shadow.center.y - pivot.y);
    cr.scale(shadow.radius_x, shadow.radius_y);
    cr.arc(0.0, 0.0, 1.0, 0.0, 2.0 * PI);
    cr.restore()?;
    cr.fill()
}

fn draw_dot(
    cr: &Context,
    center: Point,
    radius: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
    cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
    cr.fill()
}

fn draw_hint(
    cr: &Context,
    snapshot: &Snapshot,
    text: &str,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let (r, g, b, a) = colors.hint.into_components();
    cr.set_source_rgba(r, g, b, a);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(HINT_FONT_SIZE);
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(
            snapshot.viewport.width / 2.0 - ext.width() / 2.0,
            snapshot.viewport.height - HINT_MARGIN,
        );
        cr.show_text(text)?;
    }
    Ok(())
}
