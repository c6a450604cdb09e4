//! Tipos JSON de `images:annotate`.
//!
//! El servicio omite los campos a cero (p. ej. `"x": 0`), por eso casi todo
//! lleva `#[serde(default)]`.

use serde::{Deserialize, Serialize};

use crate::domain::{
    detection::{
        BoundingPoly, Detection, FaceDetails, Feature, Landmark, LandmarkKind, Likelihood,
        NormalizedVertex, Position, Vertex,
    },
    errors::{DomainError, DomainResult},
};

#[derive(Debug, Serialize)]
pub struct BatchAnnotateRequest {
    pub requests: Vec<AnnotateRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub image: WireImage,
    pub features: Vec<WireFeature>,
}

#[derive(Debug, Serialize)]
pub struct WireImage {
    /// JPEG en base64.
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl BatchAnnotateRequest {
    pub fn single(content: String, feature: Feature, max_results: u32) -> Self {
        let max_results = feature.honours_max_results().then_some(max_results);
        Self {
            requests: vec![AnnotateRequest {
                image: WireImage { content },
                features: vec![WireFeature { kind: feature.wire_name(), max_results }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchAnnotateResponse {
    pub responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotateResponse {
    pub face_annotations: Vec<FaceAnnotation>,
    pub label_annotations: Vec<EntityAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    pub error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireVertex {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireNormalizedVertex {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireBoundingPoly {
    pub vertices: Vec<WireVertex>,
    pub normalized_vertices: Vec<WireNormalizedVertex>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityAnnotation {
    pub mid: String,
    pub locale: Option<String>,
    pub description: String,
    pub score: f32,
    pub topicality: Option<f32>,
    pub bounding_poly: WireBoundingPoly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    pub mid: String,
    pub name: String,
    pub score: f32,
    pub bounding_poly: WireBoundingPoly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Deserialize)]
pub struct WireLandmark {
    #[serde(rename = "type", default = "unknown_landmark")]
    pub kind: LandmarkKind,
    #[serde(default)]
    pub position: WirePosition,
}

fn unknown_landmark() -> LandmarkKind {
    LandmarkKind::Unknown
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaceAnnotation {
    pub bounding_poly: WireBoundingPoly,
    pub fd_bounding_poly: WireBoundingPoly,
    pub landmarks: Vec<WireLandmark>,
    pub roll_angle: f32,
    pub pan_angle: f32,
    pub tilt_angle: f32,
    pub detection_confidence: f32,
    pub landmarking_confidence: f32,
    pub joy_likelihood: Likelihood,
    pub sorrow_likelihood: Likelihood,
    pub anger_likelihood: Likelihood,
    pub surprise_likelihood: Likelihood,
    pub under_exposed_likelihood: Likelihood,
    pub blurred_likelihood: Likelihood,
    pub headwear_likelihood: Likelihood,
}

impl From<WireBoundingPoly> for BoundingPoly {
    fn from(p: WireBoundingPoly) -> Self {
        BoundingPoly {
            vertices: p.vertices.into_iter().map(|v| Vertex { x: v.x, y: v.y }).collect(),
            normalized_vertices: p
                .normalized_vertices
                .into_iter()
                .map(|v| NormalizedVertex { x: v.x, y: v.y })
                .collect(),
        }
    }
}

impl FaceAnnotation {
    fn into_detection(self) -> Detection {
        let details = FaceDetails {
            fd_bounding_poly: self.fd_bounding_poly.into(),
            landmarks: self
                .landmarks
                .into_iter()
                .map(|l| Landmark {
                    kind: l.kind,
                    position: Position { x: l.position.x, y: l.position.y, z: l.position.z },
                })
                .collect(),
            roll_angle: self.roll_angle,
            pan_angle: self.pan_angle,
            tilt_angle: self.tilt_angle,
            detection_confidence: self.detection_confidence,
            landmarking_confidence: self.landmarking_confidence,
            joy: self.joy_likelihood,
            sorrow: self.sorrow_likelihood,
            anger: self.anger_likelihood,
            surprise: self.surprise_likelihood,
            under_exposed: self.under_exposed_likelihood,
            blurred: self.blurred_likelihood,
            headwear: self.headwear_likelihood,
        };
        Detection {
            score: self.detection_confidence,
            bounding_poly: self.bounding_poly.into(),
            face: Some(details),
            ..Detection::new(Feature::Face)
        }
    }
}

impl EntityAnnotation {
    fn into_detection(self, feature: Feature) -> Detection {
        Detection {
            label: Some(self.description),
            score: self.score,
            bounding_poly: self.bounding_poly.into(),
            locale: self.locale,
            topicality: self.topicality,
            ..Detection::new(feature)
        }
    }
}

impl LocalizedObjectAnnotation {
    fn into_detection(self) -> Detection {
        Detection {
            label: Some(self.name),
            score: self.score,
            bounding_poly: self.bounding_poly.into(),
            ..Detection::new(Feature::Object)
        }
    }
}

impl BatchAnnotateResponse {
    /// Detecciones de la primera (y única) respuesta para la operación pedida.
    pub fn into_detections(self, feature: Feature) -> DomainResult<Vec<Detection>> {
        let Some(resp) = self.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(err) = resp.error {
            return Err(DomainError::Vision(format!("{} (código {})", err.message, err.code)));
        }
        let out = match feature {
            Feature::Face => resp.face_annotations.into_iter().map(FaceAnnotation::into_detection).collect(),
            Feature::Object => resp
                .localized_object_annotations
                .into_iter()
                .map(LocalizedObjectAnnotation::into_detection)
                .collect(),
            Feature::Text => resp.text_annotations.into_iter().map(|a| a.into_detection(Feature::Text)).collect(),
            Feature::Label => resp.label_annotations.into_iter().map(|a| a.into_detection(Feature::Label)).collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> BatchAnnotateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_omits_max_results_for_text() {
        let req = BatchAnnotateRequest::single("AAAA".into(), Feature::Text, 10);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
        assert!(json["requests"][0]["features"][0].get("maxResults").is_none());

        let req = BatchAnnotateRequest::single("AAAA".into(), Feature::Object, 10);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["requests"][0]["features"][0]["maxResults"], 10);
        assert_eq!(json["requests"][0]["image"]["content"], "AAAA");
    }

    #[test]
    fn objects_keep_normalized_vertices_with_omitted_zeros() {
        let resp = parse(
            r#"{"responses":[{"localizedObjectAnnotations":[{
                "mid":"/m/04ctx","name":"Knife","score":0.87,
                "boundingPoly":{"normalizedVertices":[
                    {"x":0.1},{"x":0.5,"y":0.0},{"x":0.5,"y":0.9},{"y":0.9}]}}]}]}"#,
        );
        let dets = resp.into_detections(Feature::Object).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label.as_deref(), Some("Knife"));
        let nv = &dets[0].bounding_poly.normalized_vertices;
        assert_eq!(nv[0], NormalizedVertex { x: 0.1, y: 0.0 });
        assert_eq!(nv[3], NormalizedVertex { x: 0.0, y: 0.9 });
    }

    #[test]
    fn faces_map_likelihoods_and_landmarks() {
        let resp = parse(
            r#"{"responses":[{"faceAnnotations":[{
                "boundingPoly":{"vertices":[{"x":10,"y":20},{"x":110,"y":20},{"x":110,"y":140},{"x":10,"y":140}]},
                "landmarks":[
                    {"type":"LEFT_EYEBROW_UPPER_MIDPOINT","position":{"x":40.5,"y":60.2,"z":-3.0}},
                    {"type":"SOMETHING_NEW","position":{"x":1.0}}],
                "detectionConfidence":0.98,
                "joyLikelihood":"VERY_LIKELY",
                "sorrowLikelihood":"VERY_UNLIKELY",
                "angerLikelihood":"POSSIBLE",
                "surpriseLikelihood":"UNRECOGNIZED_VALUE"}]}]}"#,
        );
        let dets = resp.into_detections(Feature::Face).unwrap();
        let face = dets[0].face.as_ref().unwrap();
        assert_eq!(face.joy, Likelihood::VeryLikely);
        assert_eq!(face.anger, Likelihood::Possible);
        assert_eq!(face.surprise, Likelihood::Unknown);
        assert_eq!(face.headwear, Likelihood::Unknown);
        assert_eq!(face.landmarks[0].kind, LandmarkKind::LeftEyebrowUpperMidpoint);
        assert_eq!(face.landmarks[1].kind, LandmarkKind::Unknown);
        assert_eq!(dets[0].bounding_poly.vertices[2], Vertex { x: 110, y: 140 });
        assert!((dets[0].score - 0.98).abs() < 1e-6);
    }

    #[test]
    fn text_and_labels_carry_descriptions() {
        let resp = parse(
            r#"{"responses":[{
                "textAnnotations":[{"locale":"en","description":"EXIT\n","boundingPoly":{"vertices":[{"x":3},{"x":40}]}}],
                "labelAnnotations":[{"mid":"/m/01g317","description":"Person","score":0.95,"topicality":0.95}]}]}"#,
        );
        let dets = resp.into_detections(Feature::Text).unwrap();
        assert_eq!(dets[0].locale.as_deref(), Some("en"));
        assert_eq!(dets[0].bounding_poly.vertices[0], Vertex { x: 3, y: 0 });

        let labels = parse(
            r#"{"responses":[{"labelAnnotations":[{"description":"Person","score":0.95,"topicality":0.9}]}]}"#,
        )
        .into_detections(Feature::Label)
        .unwrap();
        assert_eq!(labels[0].label.as_deref(), Some("Person"));
        assert_eq!(labels[0].topicality, Some(0.9));
    }

    #[test]
    fn service_errors_become_domain_errors() {
        let resp = parse(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#);
        match resp.into_detections(Feature::Object) {
            Err(DomainError::Vision(msg)) => assert!(msg.contains("Bad image data.")),
            other => panic!("esperaba error de visión, obtuve {other:?}"),
        }
    }

    #[test]
    fn empty_response_has_no_detections() {
        assert!(parse("{}").into_detections(Feature::Face).unwrap().is_empty());
        assert!(parse(r#"{"responses":[{}]}"#).into_detections(Feature::Label).unwrap().is_empty());
    }
}
