//! Contador de emociones: fotos con cerrojo y modo mosaico.

mod common;

use std::sync::Arc;

use common::*;
use lifeline::application::emotion_watch::{EmotionWatch, EmotionWatchSettings};
use lifeline::application::services::Watch;
use lifeline::domain::detection::{Detection, Feature, Likelihood::*};
use lifeline::domain::errors::DomainResult;

struct Rig {
    watch: EmotionWatch,
    vision: Arc<ScriptedVision>,
    display: Arc<RecordingDisplay>,
    snapshots: Arc<MemorySnapshots>,
    _rt: tokio::runtime::Runtime,
}

fn rig(replies: Vec<DomainResult<Vec<Detection>>>, sample_every: u32) -> Rig {
    let rt = runtime();
    let vision = Arc::new(ScriptedVision::new(replies));
    let display = Arc::new(RecordingDisplay::default());
    let snapshots = Arc::new(MemorySnapshots::default());
    let watch = EmotionWatch::new(
        stage(GreySource::new(320, 240), display.clone(), snapshots.clone()),
        session(vision.clone(), &rt),
        EmotionWatchSettings { sample_every },
    );
    Rig { watch, vision, display, snapshots, _rt: rt }
}

fn happy(x: i32) -> Detection {
    face(x, 50, VeryLikely, VeryUnlikely, VeryUnlikely, VeryUnlikely)
}

fn sad(x: i32) -> Detection {
    face(x, 50, VeryUnlikely, VeryLikely, VeryUnlikely, VeryUnlikely)
}

fn amazed(x: i32) -> Detection {
    face(x, 50, VeryUnlikely, VeryUnlikely, VeryUnlikely, Likely)
}

#[test]
fn smile_snapshot_is_edge_triggered() {
    let mut r = rig(
        vec![
            Ok(vec![happy(10), happy(100)]),
            Ok(vec![happy(10), happy(100)]),
            Ok(vec![happy(10), sad(100)]),
            Ok(vec![happy(10)]),
        ],
        1,
    );
    for _ in 0..4 {
        r.watch.step().unwrap();
    }

    let stems = r.snapshots.stems();
    assert_eq!(stems.len(), 2);
    assert!(stems.iter().all(|s| s.starts_with("IMG-")));
    // IMG-AAAA-MM-DD-HHMMSS
    assert_eq!(stems[0].len(), "IMG-2024-01-31-235959".len());
    assert_eq!(r.display.still_captions(), vec!["IMG", "IMG"]);
    assert_eq!(r.vision.calls(), vec![Feature::Face; 4]);
}

#[test]
fn no_faces_means_no_smile_snapshot() {
    let mut r = rig(vec![Ok(vec![])], 1);
    r.watch.step().unwrap();
    assert!(r.snapshots.stems().is_empty());
    assert!(r.watch.groups().all.is_empty());
}

#[test]
fn groups_persist_between_samples() {
    let mut r = rig(vec![Ok(vec![happy(10), sad(100)])], 20);
    r.watch.step().unwrap();
    r.watch.step().unwrap();
    assert_eq!(r.vision.calls().len(), 1);
    let frames = r.display.frames();
    assert_eq!(frames[1].detections.len(), 2);
    assert!(!frames[1].sampled);
    assert_eq!(r.watch.groups().joyful.len(), 1);
    assert_eq!(r.watch.groups().sorrowful.len(), 1);
}

#[test]
fn gotcha_enters_mosaic_mode_for_good() {
    let mut r = rig(
        vec![
            Ok(vec![amazed(10), amazed(100)]),
            Ok(vec![sad(100)]),
            Ok(vec![happy(10), happy(100)]),
            Ok(vec![amazed(10), amazed(100)]),
        ],
        1,
    );
    r.watch.step().unwrap();
    assert!(r.watch.mosaic_mode());
    assert_eq!(r.snapshots.stems().len(), 1);
    assert!(r.snapshots.stems()[0].starts_with("Gotcha-"));

    // Cara triste pixelada: teselas grises impares en lugar del gris 128
    r.watch.step().unwrap();
    let frame = r.display.last_frame().unwrap();
    let px = frame.get_pixel(120, 70).0;
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert_eq!(px[0] % 2, 1);

    // En modo mosaico no hay más fotos, ni de sonrisas ni Gotcha
    r.watch.step().unwrap();
    r.watch.step().unwrap();
    assert!(r.watch.mosaic_mode());
    assert_eq!(r.snapshots.stems().len(), 1);
}

#[test]
fn single_surprised_face_is_not_a_gotcha() {
    let mut r = rig(vec![Ok(vec![amazed(10), sad(100)])], 1);
    r.watch.step().unwrap();
    assert!(!r.watch.mosaic_mode());
    assert!(r.snapshots.stems().is_empty());
}

#[test]
fn joyful_faces_are_framed_green_and_others_red() {
    let mut r = rig(vec![Ok(vec![happy(10), sad(100)])], 1);
    r.watch.step().unwrap();
    let frame = r.display.last_frame().unwrap();
    assert_eq!(frame.get_pixel(10, 70).0, [0, 255, 0]);
    assert_eq!(frame.get_pixel(100, 70).0, [255, 0, 0]);
}
