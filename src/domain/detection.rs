use serde::{Deserialize, Serialize};

/// Vértice en píxeles absolutos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

/// Vértice normalizado (0..1) respecto a las dimensiones de la imagen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVertex {
    pub x: f32,
    pub y: f32,
}

/// Polígono envolvente tal como lo devuelve el servicio: según la operación
/// se rellena una lista u otra.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    pub vertices: Vec<Vertex>,
    pub normalized_vertices: Vec<NormalizedVertex>,
}

impl BoundingPoly {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.normalized_vertices.is_empty()
    }
}

/// Qué lista de vértices se usa para dibujar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexSpace {
    Absolute,
    Normalized,
}

/// Operaciones de detección ofrecidas por la API de visión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Text,
    Label,
    Face,
    Object,
}

impl Feature {
    pub fn wire_name(self) -> &'static str {
        match self {
            Feature::Text => "TEXT_DETECTION",
            Feature::Label => "LABEL_DETECTION",
            Feature::Face => "FACE_DETECTION",
            Feature::Object => "OBJECT_LOCALIZATION",
        }
    }

    /// Espacio en el que el servicio entrega los vértices de esta operación.
    pub fn vertex_space(self) -> VertexSpace {
        match self {
            Feature::Object => VertexSpace::Normalized,
            _ => VertexSpace::Absolute,
        }
    }

    /// La detección de texto ignora `maxResults`.
    pub fn honours_max_results(self) -> bool {
        !matches!(self, Feature::Text)
    }
}

impl std::str::FromStr for Feature {
    type Err = crate::domain::errors::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Feature::Text),
            "label" => Ok(Feature::Label),
            "face" => Ok(Feature::Face),
            "object" => Ok(Feature::Object),
            other => Err(crate::domain::errors::DomainError::InvalidInput(format!(
                "tipo de detección desconocido: {other}"
            ))),
        }
    }
}

/// Escala ordinal de probabilidad de la API (1..5, con 0 como desconocido).
///
/// Se (de)serializa con los nombres del servicio (`VERY_LIKELY`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryUnlikely = 1,
    Unlikely = 2,
    Possible = 3,
    Likely = 4,
    VeryLikely = 5,
    // El orden compara discriminantes: Unknown sigue siendo el menor
    #[default]
    #[serde(other)]
    Unknown = 0,
}

/// Emociones que la detección de caras puntúa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sorrow,
    Anger,
    Surprise,
}

/// Puntos faciales. Los discriminantes y nombres siguen los del servicio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkKind {
    LeftEye = 1,
    RightEye = 2,
    LeftOfLeftEyebrow = 3,
    RightOfLeftEyebrow = 4,
    LeftOfRightEyebrow = 5,
    RightOfRightEyebrow = 6,
    MidpointBetweenEyes = 7,
    NoseTip = 8,
    UpperLip = 9,
    LowerLip = 10,
    MouthLeft = 11,
    MouthRight = 12,
    MouthCenter = 13,
    NoseBottomRight = 14,
    NoseBottomLeft = 15,
    NoseBottomCenter = 16,
    LeftEyeTopBoundary = 17,
    LeftEyeRightCorner = 18,
    LeftEyeBottomBoundary = 19,
    LeftEyeLeftCorner = 20,
    RightEyeTopBoundary = 21,
    RightEyeRightCorner = 22,
    RightEyeBottomBoundary = 23,
    RightEyeLeftCorner = 24,
    LeftEyebrowUpperMidpoint = 25,
    RightEyebrowUpperMidpoint = 26,
    LeftEarTragion = 27,
    RightEarTragion = 28,
    LeftEyePupil = 29,
    RightEyePupil = 30,
    ForeheadGlabella = 31,
    ChinGnathion = 32,
    ChinLeftGonion = 33,
    ChinRightGonion = 34,
    #[serde(other)]
    Unknown = 0,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub kind: LandmarkKind,
    pub position: Position,
}

/// Datos exclusivos de la detección de caras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetails {
    pub fd_bounding_poly: BoundingPoly,
    pub landmarks: Vec<Landmark>,
    pub roll_angle: f32,
    pub pan_angle: f32,
    pub tilt_angle: f32,
    pub detection_confidence: f32,
    pub landmarking_confidence: f32,
    pub joy: Likelihood,
    pub sorrow: Likelihood,
    pub anger: Likelihood,
    pub surprise: Likelihood,
    pub under_exposed: Likelihood,
    pub blurred: Likelihood,
    pub headwear: Likelihood,
}

impl FaceDetails {
    pub fn likelihood(&self, emotion: Emotion) -> Likelihood {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Sorrow => self.sorrow,
            Emotion::Anger => self.anger,
            Emotion::Surprise => self.surprise,
        }
    }
}

/// Un resultado de la API de visión, sea cual sea la operación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub feature: Feature,
    /// Nombre del objeto o descripción del texto / etiqueta.
    pub label: Option<String>,
    pub score: f32,
    pub bounding_poly: BoundingPoly,
    pub face: Option<FaceDetails>,
    pub locale: Option<String>,
    pub topicality: Option<f32>,
}

impl Detection {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            label: None,
            score: 0.0,
            bounding_poly: BoundingPoly::default(),
            face: None,
            locale: None,
            topicality: None,
        }
    }

    pub fn label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.label.as_deref().unwrap_or(fallback)
    }
}
