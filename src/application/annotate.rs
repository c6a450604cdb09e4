use std::time::{Duration, Instant};

use image::RgbImage;

use crate::{
    application::ports::VisionPort,
    domain::{
        detection::{Detection, Feature, VertexSpace},
        errors::DomainResult,
    },
    render::{encode_jpeg, Caption, HighlightStyle, Overlay},
};

/// Resultado de anotar una imagen suelta.
#[derive(Debug, Clone)]
pub struct AnnotateReport {
    pub feature: Feature,
    pub latency: Duration,
    pub detections: Vec<Detection>,
}

pub async fn annotate_image(
    vision: &dyn VisionPort,
    image: &RgbImage,
    feature: Feature,
    max_results: u32,
    jpeg_quality: u8,
) -> DomainResult<AnnotateReport> {
    let jpeg = encode_jpeg(image, jpeg_quality)?;
    let started = Instant::now();
    let detections = vision.annotate(&jpeg, feature, max_results).await?;
    Ok(AnnotateReport { feature, latency: started.elapsed(), detections })
}

/// Una línea legible por detección.
pub fn describe(det: &Detection) -> String {
    match det.feature {
        Feature::Text => det.label_or("").to_string(),
        Feature::Label => format!("{} ({:.2})", det.label_or("?"), det.score),
        Feature::Object => format!("{} ({:.2})", det.label_or("?"), det.score),
        Feature::Face => match &det.face {
            Some(f) => format!(
                "face ({:.2}): joy={:?} sorrow={:?} anger={:?} surprise={:?}",
                f.detection_confidence, f.joy, f.sorrow, f.anger, f.surprise
            ),
            None => "face".to_string(),
        },
    }
}

/// Copia enmarcada de la imagen; las etiquetas no tienen geometría.
pub fn render_report(overlay: &Overlay, image: &RgbImage, report: &AnnotateReport) -> Option<RgbImage> {
    let style = match report.feature {
        Feature::Label => return None,
        Feature::Face => HighlightStyle { colour: [255, 0, 0], caption: Caption::None, space: VertexSpace::Absolute },
        Feature::Text => HighlightStyle { colour: [255, 0, 0], caption: Caption::Label, space: VertexSpace::Absolute },
        Feature::Object => HighlightStyle { colour: [255, 0, 0], caption: Caption::Label, space: VertexSpace::Normalized },
    };
    let mut out = image.clone();
    overlay.highlight(&mut out, &report.detections, &style);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{FaceDetails, Likelihood};

    #[test]
    fn describes_each_feature() {
        let mut obj = Detection::new(Feature::Object);
        obj.label = Some("Knife".into());
        obj.score = 0.9;
        assert_eq!(describe(&obj), "Knife (0.90)");

        let mut text = Detection::new(Feature::Text);
        text.label = Some("EXIT".into());
        assert_eq!(describe(&text), "EXIT");

        let mut face = Detection::new(Feature::Face);
        face.face = Some(FaceDetails { joy: Likelihood::VeryLikely, ..FaceDetails::default() });
        assert!(describe(&face).contains("joy=VeryLikely"));
    }

    #[test]
    fn labels_have_no_rendering() {
        let report = AnnotateReport { feature: Feature::Label, latency: Duration::ZERO, detections: vec![] };
        let overlay = Overlay::new(None, 24.0, 5);
        assert!(render_report(&overlay, &RgbImage::new(4, 4), &report).is_none());
    }
}
