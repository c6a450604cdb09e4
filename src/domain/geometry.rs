//! Aritmética de superposición: anclas con origen en el borde opuesto para
//! valores negativos, cajas envolventes a partir de vértices absolutos o
//! normalizados y elección del color de texto legible.
//!
//! Todo son funciones puras sobre anchos, altos y cajas explícitas.

use serde::{Deserialize, Serialize};

use super::detection::{BoundingPoly, VertexSpace};
use super::errors::{Axis, DomainError, DomainResult};

/// Grosor por defecto de las líneas de enmarcado, en píxeles.
pub const LINE_WIDTH: u32 = 5;

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Posición de una superposición.
///
/// Los valores positivos cuentan desde arriba / izquierda empezando en 1; los
/// negativos cuentan desde el borde opuesto (`-1` es el último píxel). El 0 no
/// es una posición válida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectángulo de píxeles con ambas esquinas incluidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRegion {
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }
}

/// Caja envolvente en coordenadas de píxel (puede tener decimales).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn to_region(&self) -> PixelRegion {
        PixelRegion {
            left: self.left.floor() as i32,
            top: self.top.floor() as i32,
            right: self.right.floor() as i32,
            bottom: self.bottom.floor() as i32,
        }
    }
}

/// Dónde dibujar un texto y, si lleva etiqueta, el rectángulo de fondo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    /// Esquina superior izquierda de los glifos.
    pub origin: (i32, i32),
    pub backdrop: Option<PixelRegion>,
}

/// Negro sobre colores claros, blanco sobre oscuros (luminancia BT.601).
pub fn contrast_text_colour(colour: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = colour;
    let luma = (r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114) / 255.0;
    if luma > 0.5 {
        BLACK
    } else {
        WHITE
    }
}

fn resolve_axis(axis: Axis, anchor: i32, canvas: u32, overlay: u32) -> DomainResult<u32> {
    let (a, c, o) = (anchor as i64, canvas as i64, overlay as i64);
    if a == 0 || a - o + 1 < -c || a + o - 1 > c {
        return Err(DomainError::AnchorOutOfBounds { axis, value: anchor });
    }
    let start = if a > 0 { a - 1 } else { c + a - (o - 1) };
    Ok(start as u32)
}

/// Esquina superior izquierda (base 0) de una imagen superpuesta.
///
/// La superposición debe ser estrictamente menor que el lienzo en ambos ejes y
/// quedar completamente dentro de él.
pub fn resolve_overlay_anchor(anchor: Anchor, canvas: Size, overlay: Size) -> DomainResult<(u32, u32)> {
    if overlay.width >= canvas.width || overlay.height >= canvas.height {
        return Err(DomainError::OverlayTooLarge {
            overlay_w: overlay.width,
            overlay_h: overlay.height,
            canvas_w: canvas.width,
            canvas_h: canvas.height,
        });
    }
    let left = resolve_axis(Axis::X, anchor.x, canvas.width, overlay.width)?;
    let top = resolve_axis(Axis::Y, anchor.y, canvas.height, overlay.height)?;
    Ok((left, top))
}

/// Colocación de un texto anclado en el lienzo.
///
/// El punto de referencia es la esquina inferior izquierda del bloque de
/// texto. No se valida contra el lienzo: lo que sobresalga se recorta al
/// dibujar.
pub fn layout_text(anchor: Anchor, canvas: Size, text: Size, label: bool, line_width: u32) -> TextLayout {
    let (tw, th, lw) = (text.width as i32, text.height as i32, line_width as i32);
    let (cw, ch) = (canvas.width as i32, canvas.height as i32);

    let x = if anchor.x > 0 {
        anchor.x - 1
    } else if label {
        cw + anchor.x - (tw + lw - 1)
    } else {
        cw + anchor.x - (tw - 1)
    };

    let y = if anchor.y > 0 {
        if label {
            anchor.y - 1 + th + lw - 1
        } else {
            anchor.y - 1 + th - 1
        }
    } else {
        ch + anchor.y
    };

    let boundary = (x + tw + lw - 1, y - th - lw + 1);

    if label {
        TextLayout {
            origin: (x + lw / 2, boundary.1 + lw / 2),
            backdrop: Some(PixelRegion {
                left: x,
                top: boundary.1,
                right: boundary.0,
                bottom: y,
            }),
        }
    } else {
        TextLayout {
            origin: (x, boundary.1 + lw),
            backdrop: None,
        }
    }
}

/// Rótulo de un objeto enmarcado, colgado de la esquina superior izquierda
/// de su caja.
pub fn caption_layout(top_left: (f32, f32), text: Size, line_width: u32) -> TextLayout {
    let x = top_left.0.round() as i32;
    let y = top_left.1.round() as i32;
    let half = (line_width / 2) as i32;
    let right = x + half + text.width as i32 + line_width as i32;
    let bottom = y + text.height as i32 + half;
    TextLayout {
        origin: (x + half, y),
        backdrop: Some(PixelRegion {
            left: x,
            top: y,
            right,
            bottom,
        }),
    }
}

/// Puntos del polígono en píxeles; los normalizados se escalan por el lienzo.
pub fn outline_points(poly: &BoundingPoly, space: VertexSpace, canvas: Size) -> Vec<(f32, f32)> {
    match space {
        VertexSpace::Absolute => poly.vertices.iter().map(|v| (v.x as f32, v.y as f32)).collect(),
        VertexSpace::Normalized => poly
            .normalized_vertices
            .iter()
            .map(|v| (canvas.width as f32 * v.x, canvas.height as f32 * v.y))
            .collect(),
    }
}

pub fn bounding_box(points: &[(f32, f32)]) -> Option<BoundingBox> {
    let (first, rest) = points.split_first()?;
    let init = BoundingBox {
        left: first.0,
        top: first.1,
        right: first.0,
        bottom: first.1,
    };
    Some(rest.iter().fold(init, |b, &(x, y)| BoundingBox {
        left: b.left.min(x),
        top: b.top.min(y),
        right: b.right.max(x),
        bottom: b.bottom.max(y),
    }))
}

/// Orígenes de las teselas de un mosaico dentro de `region`.
///
/// Una tesela solo se emite si cabe entera antes del borde derecho / inferior.
pub fn mosaic_tiles(region: PixelRegion, block: u32) -> Vec<(i32, i32)> {
    if block == 0 {
        return Vec::new();
    }
    let step = block as usize;
    let b = block as i32;
    let mut tiles = Vec::new();
    for x in (region.left..region.right.saturating_sub(b)).step_by(step) {
        for y in (region.top..region.bottom.saturating_sub(b)).step_by(step) {
            tiles.push((x, y));
        }
    }
    tiles
}
