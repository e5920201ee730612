use cv_features::{
    CornerDetector, CornerDetectorParams, FeatureDetector, FeatureRenderer, ImageContainer, LineDetector,
    LineDetectorParams,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::env;

#[macro_use]
extern crate timeit;

/// Image from the first argument, or a synthetic scene with a few corners and edges.
fn load_image() -> ImageContainer {
    if let Some(path) = env::args().nth(1) {
        return ImageContainer::load("demo", &path)
            .unwrap_or_else(|err| panic!("Couldn't open image {} / {}", path, err));
    }
    let mut img = RgbImage::from_pixel(320, 240, Rgb([30, 30, 30]));
    draw_filled_rect_mut(&mut img, Rect::at(40, 40).of_size(100, 80), Rgb([220, 220, 220]));
    draw_filled_rect_mut(&mut img, Rect::at(180, 120).of_size(90, 90), Rgb([160, 160, 160]));
    draw_line_segment_mut(&mut img, (20.0, 220.0), (300.0, 160.0), Rgb([255, 255, 255]));
    ImageContainer::new("demo", img)
}

pub fn main() {
    let image = load_image();
    println!("{}", image);
    let renderer = FeatureRenderer::default();

    let mut corners = CornerDetector::new(image.clone(), CornerDetectorParams::default());
    let mut lines = LineDetector::new(image, LineDetectorParams::default());

    timeit!({
        corners.detect();
    });
    timeit!({
        lines.detect();
    });
    println!("{} corners, {} segments", corners.features().len(), lines.features().len());

    let corner_overlay = renderer.render_annotated(corners.features(), corners.image().image());
    let line_overlay = renderer.render_annotated(lines.features(), lines.image().image());

    let current = env::current_dir().unwrap();
    for (name, overlay) in [("corners.png", corner_overlay), ("lines.png", line_overlay)].iter() {
        overlay
            .save(current.join(name))
            .unwrap_or_else(|err| panic!("Couldn't save image {} / {}", name, err));
        println!("saved {}", name);
    }
}
