use super::detection::{Detection, Emotion, LandmarkKind, Likelihood};
use super::geometry::PixelRegion;

/// Filtra caras por emoción.
///
/// `Likely` o más se conserva salvo que se niegue el predicado, `Possible` se
/// conserva siempre y por debajo (incluido `Unknown`) solo al negar.
pub fn filter_by_emotion(faces: &[Detection], emotion: Emotion, negate: bool) -> Vec<Detection> {
    faces
        .iter()
        .filter(|face| {
            let level = face
                .face
                .as_ref()
                .map(|details| details.likelihood(emotion))
                .unwrap_or(Likelihood::Unknown);
            match level.cmp(&Likelihood::Possible) {
                std::cmp::Ordering::Greater => !negate,
                std::cmp::Ordering::Equal => true,
                std::cmp::Ordering::Less => negate,
            }
        })
        .cloned()
        .collect()
}

/// Subconjuntos de caras por emoción de un muestreo.
#[derive(Debug, Clone, Default)]
pub struct EmotionGroups {
    pub all: Vec<Detection>,
    pub joyful: Vec<Detection>,
    pub not_joyful: Vec<Detection>,
    pub surprised: Vec<Detection>,
    pub sorrowful: Vec<Detection>,
    pub angry: Vec<Detection>,
}

impl EmotionGroups {
    pub fn from_faces(faces: Vec<Detection>) -> Self {
        Self {
            joyful: filter_by_emotion(&faces, Emotion::Joy, false),
            not_joyful: filter_by_emotion(&faces, Emotion::Joy, true),
            surprised: filter_by_emotion(&faces, Emotion::Surprise, false),
            sorrowful: filter_by_emotion(&faces, Emotion::Sorrow, false),
            angry: filter_by_emotion(&faces, Emotion::Anger, false),
            all: faces,
        }
    }

    /// Hay caras y todas sonríen.
    pub fn all_smiling(&self) -> bool {
        !self.all.is_empty() && self.all.len() == self.joyful.len()
    }
}

/// Franja de las cejas de una cara, delimitada por sus puntos faciales.
///
/// Parte de la franja vertical completa `(0, 0)..(0, alto)`: los extremos de
/// las cejas fijan los lados, los puntos medios superiores bajan el borde
/// superior y los tragos de las orejas suben el inferior.
pub fn eyebrow_band(face: &Detection, canvas_height: u32) -> PixelRegion {
    let mut left = 0.0_f32;
    let mut top = 0.0_f32;
    let mut right = 0.0_f32;
    let mut bottom = canvas_height as f32;

    let landmarks = face.face.as_ref().map(|d| d.landmarks.as_slice()).unwrap_or(&[]);
    for landmark in landmarks {
        let p = landmark.position;
        match landmark.kind {
            LandmarkKind::LeftOfLeftEyebrow => left = p.x,
            LandmarkKind::RightOfRightEyebrow => right = p.x,
            LandmarkKind::LeftEyebrowUpperMidpoint | LandmarkKind::RightEyebrowUpperMidpoint => {
                if p.y > top {
                    top = p.y;
                }
            }
            LandmarkKind::LeftEarTragion | LandmarkKind::RightEarTragion => {
                if p.y < bottom {
                    bottom = p.y;
                }
            }
            _ => {}
        }
    }

    PixelRegion {
        left: left as i32,
        top: top as i32,
        right: right as i32,
        bottom: bottom as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{FaceDetails, Feature, Landmark, Position};

    fn face(joy: Likelihood, surprise: Likelihood) -> Detection {
        let mut d = Detection::new(Feature::Face);
        d.face = Some(FaceDetails {
            joy,
            surprise,
            ..FaceDetails::default()
        });
        d
    }

    #[test]
    fn possible_is_kept_both_ways() {
        let faces = vec![face(Likelihood::Possible, Likelihood::Unknown)];
        assert_eq!(filter_by_emotion(&faces, Emotion::Joy, false).len(), 1);
        assert_eq!(filter_by_emotion(&faces, Emotion::Joy, true).len(), 1);
    }

    #[test]
    fn likely_and_unlikely_split_on_negate() {
        let faces = vec![
            face(Likelihood::VeryLikely, Likelihood::Unknown),
            face(Likelihood::Likely, Likelihood::Unknown),
            face(Likelihood::Unlikely, Likelihood::Unknown),
            face(Likelihood::Unknown, Likelihood::Unknown),
        ];
        assert_eq!(filter_by_emotion(&faces, Emotion::Joy, false).len(), 2);
        assert_eq!(filter_by_emotion(&faces, Emotion::Joy, true).len(), 2);
    }

    #[test]
    fn detection_without_face_details_counts_as_unknown() {
        let faces = vec![Detection::new(Feature::Object)];
        assert!(filter_by_emotion(&faces, Emotion::Anger, false).is_empty());
        assert_eq!(filter_by_emotion(&faces, Emotion::Anger, true).len(), 1);
    }

    #[test]
    fn groups_detect_all_smiling() {
        let groups = EmotionGroups::from_faces(vec![
            face(Likelihood::Likely, Likelihood::VeryLikely),
            face(Likelihood::VeryLikely, Likelihood::Likely),
        ]);
        assert!(groups.all_smiling());
        assert_eq!(groups.surprised.len(), 2);
        assert!(groups.not_joyful.is_empty());

        assert!(!EmotionGroups::from_faces(vec![]).all_smiling());
    }

    #[test]
    fn eyebrow_band_from_landmarks() {
        let lm = |kind, x, y| Landmark {
            kind,
            position: Position { x, y, z: 0.0 },
        };
        let mut d = Detection::new(Feature::Face);
        d.face = Some(FaceDetails {
            landmarks: vec![
                lm(LandmarkKind::LeftOfLeftEyebrow, 100.0, 80.0),
                lm(LandmarkKind::RightOfRightEyebrow, 180.0, 82.0),
                lm(LandmarkKind::LeftEyebrowUpperMidpoint, 120.0, 70.0),
                lm(LandmarkKind::RightEyebrowUpperMidpoint, 160.0, 72.5),
                lm(LandmarkKind::LeftEarTragion, 90.0, 110.0),
                lm(LandmarkKind::RightEarTragion, 190.0, 105.0),
                lm(LandmarkKind::NoseTip, 140.0, 120.0),
            ],
            ..FaceDetails::default()
        });
        let band = eyebrow_band(&d, 270);
        assert_eq!(
            band,
            PixelRegion {
                left: 100,
                top: 72,
                right: 180,
                bottom: 105
            }
        );
    }

    #[test]
    fn eyebrow_band_defaults_to_full_height_strip() {
        let band = eyebrow_band(&Detection::new(Feature::Face), 270);
        assert_eq!(
            band,
            PixelRegion {
                left: 0,
                top: 0,
                right: 0,
                bottom: 270
            }
        );
    }
}
