use thiserror::Error;

/// Eje de la imagen al que se refiere un ancla.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    #[error("La imagen superpuesta ({overlay_w}x{overlay_h}) no cabe en el lienzo ({canvas_w}x{canvas_h})")]
    OverlayTooLarge {
        overlay_w: u32,
        overlay_h: u32,
        canvas_w: u32,
        canvas_h: u32,
    },
    #[error("Ancla fuera de rango en el eje {axis}: {value}")]
    AnchorOutOfBounds { axis: Axis, value: i32 },
    #[error("Error de la API de visión: {0}")]
    Vision(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
