use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rand::Rng;
use tracing::{info, warn};

use crate::domain::detection::{Detection, VertexSpace};
use crate::domain::errors::DomainResult;
use crate::domain::geometry::{
    bounding_box, caption_layout, contrast_text_colour, layout_text, mosaic_tiles, outline_points,
    resolve_overlay_anchor, Anchor, PixelRegion, Size, TextLayout,
};

use super::stroke::draw_closed_polyline;

/// Cómo se copia una imagen superpuesta sobre el lienzo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Se copian todos los píxeles.
    Paste,
    /// Solo se copian los píxeles oscuros (luminancia < 128): elimina el fondo
    /// blanco de un logotipo.
    KeyOutLight,
}

/// Qué texto acompaña a cada objeto enmarcado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caption {
    None,
    Label,
}

#[derive(Debug, Clone, Copy)]
pub struct HighlightStyle {
    pub colour: [u8; 3],
    pub caption: Caption,
    pub space: VertexSpace,
}

/// Dibujo sobre frames RGB: textos anclados, marcos de detecciones,
/// logotipos y mosaicos.
pub struct Overlay {
    font: Option<FontVec>,
    scale: PxScale,
    line_width: u32,
}

impl Overlay {
    pub fn new(font: Option<FontVec>, font_px: f32, line_width: u32) -> Self {
        Self {
            font,
            scale: PxScale::from(font_px),
            line_width,
        }
    }

    /// Carga la fuente TrueType indicada. Sin fuente se dibujan marcos pero no textos.
    pub fn load(font_path: &Path, font_px: f32, line_width: u32) -> Self {
        let font = match std::fs::read(font_path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    info!("🔤 Fuente cargada: {}", font_path.display());
                    Some(font)
                }
                Err(e) => {
                    warn!("Fuente inválida {}: {e}; los textos no se dibujarán", font_path.display());
                    None
                }
            },
            Err(e) => {
                warn!("No se pudo leer la fuente {}: {e}; los textos no se dibujarán", font_path.display());
                None
            }
        };
        Self::new(font, font_px, line_width)
    }

    pub fn text_size(&self, text: &str) -> Size {
        match &self.font {
            Some(font) => {
                let (w, h) = text_size(self.scale, font, text);
                Size::new(w, h)
            }
            None => Size::default(),
        }
    }

    /// Texto anclado; con `label` se dibuja sobre un rectángulo de `colour` y
    /// el texto toma el color de contraste.
    pub fn overlay_text(&self, img: &mut RgbImage, text: &str, anchor: Anchor, colour: [u8; 3], label: bool) {
        let Some(font) = &self.font else { return };
        let canvas = Size::new(img.width(), img.height());
        let layout = layout_text(anchor, canvas, self.text_size(text), label, self.line_width);
        let ink = if label { contrast_text_colour(colour) } else { colour };
        self.draw_layout(img, font, &layout, text, colour, ink);
    }

    /// Enmarca cada detección con una polilínea cerrada y, si procede, su rótulo.
    pub fn highlight(&self, img: &mut RgbImage, detections: &[Detection], style: &HighlightStyle) {
        let canvas = Size::new(img.width(), img.height());
        let ink = contrast_text_colour(style.colour);

        for det in detections {
            let points = outline_points(&det.bounding_poly, style.space, canvas);
            if points.is_empty() {
                continue;
            }
            draw_closed_polyline(img, &points, self.line_width, Rgb(style.colour));

            let caption = match style.caption {
                Caption::None => None,
                Caption::Label => det.label.as_deref(),
            };
            if let (Some(text), Some(font), Some(bbox)) = (caption, self.font.as_ref(), bounding_box(&points)) {
                let layout = caption_layout((bbox.left, bbox.top), self.text_size(text), self.line_width);
                self.draw_layout(img, font, &layout, text, style.colour, ink);
            }
        }
    }

    /// Superpone `overlay` en la posición del ancla.
    pub fn overlay_image(&self, img: &mut RgbImage, overlay: &RgbImage, anchor: Anchor, blend: Blend) -> DomainResult<()> {
        let (left, top) = resolve_overlay_anchor(
            anchor,
            Size::new(img.width(), img.height()),
            Size::new(overlay.width(), overlay.height()),
        )?;
        for (x, y, px) in overlay.enumerate_pixels() {
            if blend == Blend::KeyOutLight && luma(px) >= 128 {
                continue;
            }
            img.put_pixel(left + x, top + y, *px);
        }
        Ok(())
    }

    /// Cubre `region` con teselas de `block` píxeles en grises aleatorios.
    pub fn mosaic<R: Rng>(&self, img: &mut RgbImage, region: PixelRegion, block: u32, rng: &mut R) {
        for (x, y) in mosaic_tiles(region, block) {
            let grey = 127 + 16 * rng.gen_range(0..8u8);
            draw_filled_rect_mut(img, Rect::at(x, y).of_size(block, block), Rgb([grey, grey, grey]));
        }
    }

    fn draw_layout(&self, img: &mut RgbImage, font: &FontVec, layout: &TextLayout, text: &str, fill: [u8; 3], ink: [u8; 3]) {
        if let Some(backdrop) = layout.backdrop {
            fill_region(img, backdrop, Rgb(fill));
        }
        draw_text_mut(img, Rgb(ink), layout.origin.0, layout.origin.1, self.scale, font, text);
    }
}

fn fill_region(img: &mut RgbImage, region: PixelRegion, colour: Rgb<u8>) {
    let (w, h) = (region.width(), region.height());
    if w <= 0 || h <= 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(region.left, region.top).of_size(w as u32, h as u32), colour);
}

/// Luminancia entera ITU-R 601-2, la misma que usa la conversión a escala de grises.
fn luma(px: &Rgb<u8>) -> u32 {
    let [r, g, b] = px.0;
    (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000
}
