use cv_features::persist::features_to_string;
use cv_features::{
    distance, CornerDetector, CornerDetectorParams, Detector, FeatureDetector, FeatureKind, ImageContainer,
    LineDetector, LineDetectorParams,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Dark background with two bright rectangles: eight corners, several long straight edges.
fn scene() -> ImageContainer {
    let mut img = RgbImage::from_pixel(160, 140, Rgb([20, 20, 20]));
    draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(50, 40), Rgb([230, 230, 230]));
    draw_filled_rect_mut(&mut img, Rect::at(90, 70).of_size(45, 50), Rgb([180, 180, 180]));
    ImageContainer::new("scene", img)
}

#[test]
fn corner_groups_have_one_point() {
    let mut detector = CornerDetector::new(scene(), CornerDetectorParams::default());
    let corners = detector.detect();
    assert!(!corners.is_empty());
    assert_eq!(corners.kind(), FeatureKind::Corner);
    assert!(corners.iter().all(|g| g.len() == 1));
}

#[test]
fn corner_threshold_below_floor_matches_floor() {
    let mut low = CornerDetector::new(scene(), CornerDetectorParams { threshold: 50 });
    let mut floor = CornerDetector::new(scene(), CornerDetectorParams { threshold: 95 });
    assert_eq!(low.detect(), floor.detect());
    assert_eq!(low.threshold(), 95);
}

#[test]
fn higher_corner_threshold_keeps_a_subset() {
    let mut detector = CornerDetector::new(scene(), CornerDetectorParams { threshold: 150 });
    let loose = detector.detect().clone();
    detector.set_threshold(230);
    let strict = detector.detect().clone();
    assert!(strict.len() <= loose.len());
    assert!(strict.iter().all(|g| loose.groups().contains(g)));
}

#[test]
fn line_groups_have_two_points() {
    let mut detector = LineDetector::new(scene(), LineDetectorParams::default());
    let lines = detector.detect();
    assert!(!lines.is_empty());
    assert_eq!(lines.kind(), FeatureKind::Line);
    assert!(lines.iter().all(|g| g.len() == 2));
}

#[test]
fn vertical_edge_is_found_with_its_length() {
    // bright block whose left edge runs from (10, 10) to (10, 100)
    let mut img = RgbImage::new(160, 160);
    draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(51, 91), Rgb([255, 255, 255]));
    let mut detector = LineDetector::new(ImageContainer::new("edge", img), LineDetectorParams::default());
    let lines = detector.detect();

    let found = lines.iter().any(|g| {
        let (a, b) = (g.points()[0], g.points()[1]);
        let near_left_edge = (a.x - 10).abs() <= 3 && (b.x - 10).abs() <= 3;
        near_left_edge && (distance(&a, &b) - 90.0).abs() <= 10.0
    });
    assert!(found, "{:?}", lines);
}

#[test]
fn detection_is_repeatable() {
    let mut a = LineDetector::new(scene(), LineDetectorParams::default());
    let mut b = LineDetector::new(scene(), LineDetectorParams::default());
    assert_eq!(a.detect(), b.detect());
}

#[test]
fn empty_image_yields_empty_sets() {
    for kind in [FeatureKind::Corner, FeatureKind::Line].iter() {
        let mut detector = Detector::with_defaults(*kind, ImageContainer::new("void", RgbImage::new(0, 0)));
        let features = detector.detect();
        assert!(features.is_empty());
        assert_eq!(features_to_string(features, "void"), "Features of imagevoid\n");
    }
}

#[test]
fn missing_image_fails_to_load() {
    assert!(CornerDetector::from_path("x", "no/such/image.png", CornerDetectorParams::default()).is_err());
    assert!(LineDetector::from_path("x", "no/such/image.png", LineDetectorParams::default()).is_err());
}
