use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// Segmento de `width` píxeles de grosor: líneas de 1 px desplazadas a lo
/// largo de la normal, con un círculo en cada extremo para cerrar las juntas.
pub fn draw_thick_segment(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), width: u32, colour: Rgb<u8>) {
    let radius = (width / 2) as i32;
    let cap = |img: &mut RgbImage, p: (f32, f32)| {
        if radius > 0 {
            draw_filled_circle_mut(img, (p.0.round() as i32, p.1.round() as i32), radius, colour);
        }
    };

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f32::EPSILON {
        cap(img, from);
        return;
    }
    let (nx, ny) = (-dy / len, dx / len);

    let low = -((width.saturating_sub(1) / 2) as i32);
    let high = (width / 2) as i32;
    for k in low..=high {
        let k = k as f32;
        draw_line_segment_mut(
            img,
            (from.0 + nx * k, from.1 + ny * k),
            (to.0 + nx * k, to.1 + ny * k),
            colour,
        );
    }
    cap(img, from);
    cap(img, to);
}

/// Polilínea cerrada (el último punto se une con el primero).
pub fn draw_closed_polyline(img: &mut RgbImage, points: &[(f32, f32)], width: u32, colour: Rgb<u8>) {
    match points.len() {
        0 => {}
        1 => draw_thick_segment(img, points[0], points[0], width, colour),
        n => {
            for i in 0..n {
                draw_thick_segment(img, points[i], points[(i + 1) % n], width, colour);
            }
        }
    }
}
