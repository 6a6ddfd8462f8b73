//! Integration test: draw synthetic figures, run them through the whole
//! pass and check what comes out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use figcolor_pipeline::{
    BorderKind, ColoringMode, ColorizeConfig, ContourRetrieval, PipelineError, Rgb, RgbImage,
    ShapeLabel, color_image, decode, gen_colors, process_staged,
};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

fn by_shape() -> ColorizeConfig {
    ColorizeConfig {
        coloring: ColoringMode::ByShape,
        ..ColorizeConfig::default()
    }
}

fn triangle_vertices() -> [Point<i32>; 3] {
    [Point::new(150, 50), Point::new(50, 250), Point::new(250, 250)]
}

/// 300x300 black canvas with a bright filled triangle.
fn triangle_scene() -> RgbImage {
    let mut image = RgbImage::from_pixel(300, 300, BLACK);
    draw_polygon_mut(&mut image, &triangle_vertices(), WHITE);
    image
}

/// 300x300 black canvas with a bright disc of radius 80.
fn circle_scene() -> RgbImage {
    let mut image = RgbImage::from_pixel(300, 300, BLACK);
    draw_filled_circle_mut(&mut image, (150, 150), 80, WHITE);
    image
}

#[test]
fn blank_image_passes_through_unchanged() {
    let image = RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]));
    let staged = process_staged(&image, &ColorizeConfig::default()).unwrap();
    assert!(staged.contours.is_empty());
    assert!(staged.figures.is_empty());
    assert_eq!(staged.output, image);
}

#[test]
fn triangle_is_detected_and_filled_red() {
    let staged = process_staged(&triangle_scene(), &by_shape()).unwrap();

    assert_eq!(staged.contours.len(), 1);
    assert_eq!(staged.polygons[0].vertex_count(), 3);
    assert_eq!(staged.figures[0].label, ShapeLabel::Triangle);
    assert_eq!(staged.figures[0].color, Rgb([200, 0, 0]));
    assert_eq!(*staged.output.get_pixel(150, 230), Rgb([200, 0, 0]));
    // Background stays untouched away from the figure.
    assert_eq!(*staged.output.get_pixel(5, 5), BLACK);
}

#[test]
fn triangle_label_sits_left_of_center() {
    let staged = process_staged(&triangle_scene(), &by_shape()).unwrap();
    let anchor = staged.figures[0].anchor;
    assert!((80..=86).contains(&anchor.x), "{anchor:?}");
    assert!((180..=186).contains(&anchor.y), "{anchor:?}");
}

#[test]
fn circle_is_detected_and_filled_blue() {
    let staged = process_staged(&circle_scene(), &by_shape()).unwrap();

    assert_eq!(staged.contours.len(), 1);
    assert!(staged.polygons[0].vertex_count() >= 10);
    assert_eq!(staged.figures[0].label, ShapeLabel::Circle);
    assert_eq!(*staged.output.get_pixel(150, 190), Rgb([0, 0, 200]));
}

#[test]
fn square_is_detected_and_filled_green() {
    let mut image = RgbImage::from_pixel(200, 200, BLACK);
    draw_filled_rect_mut(&mut image, Rect::at(40, 40).of_size(120, 120), WHITE);
    let staged = process_staged(&image, &by_shape()).unwrap();
    assert_eq!(staged.figures.len(), 1);
    assert_eq!(staged.figures[0].label, ShapeLabel::Square);
    assert_eq!(*staged.output.get_pixel(150, 150), Rgb([0, 200, 0]));
}

#[test]
fn negative_threshold_is_rejected_before_processing() {
    let config = ColorizeConfig {
        threshold: -5,
        ..ColorizeConfig::default()
    };
    let err = color_image(&triangle_scene(), &config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidParameter { value: -5, .. }
    ));
}

#[test]
fn accuracy_one_collapses_figures() {
    let config = ColorizeConfig {
        approximation_accuracy: 1,
        ..by_shape()
    };
    for scene in [triangle_scene(), circle_scene()] {
        let staged = process_staged(&scene, &config).unwrap();
        assert_eq!(staged.polygons.len(), 1);
        assert!(staged.polygons[0].vertex_count() <= 4);
    }
}

#[test]
fn huge_accuracy_keeps_raster_steps() {
    let config = ColorizeConfig {
        approximation_accuracy: 10_000,
        ..by_shape()
    };
    let staged = process_staged(&triangle_scene(), &config).unwrap();
    let figure = staged.figures[0];
    assert_ne!(figure.label, ShapeLabel::Triangle);
    assert!(figure.vertex_count >= 10, "{}", figure.vertex_count);
    // Dense polygons read as round.
    assert_eq!(figure.label, ShapeLabel::Circle);
}

#[test]
fn unique_mode_assigns_palette_in_discovery_order() {
    let mut image = RgbImage::from_pixel(600, 300, BLACK);
    draw_filled_rect_mut(&mut image, Rect::at(30, 30).of_size(150, 150), WHITE);
    draw_polygon_mut(
        &mut image,
        &[Point::new(500, 40), Point::new(420, 240), Point::new(580, 240)],
        WHITE,
    );
    draw_filled_circle_mut(&mut image, (300, 150), 80, WHITE);

    let staged = process_staged(&image, &ColorizeConfig::default()).unwrap();
    let palette = gen_colors(3);

    let labels: Vec<ShapeLabel> = staged.figures.iter().map(|f| f.label).collect();
    assert_eq!(
        labels,
        vec![ShapeLabel::Square, ShapeLabel::Triangle, ShapeLabel::Circle]
    );
    let colors: Vec<Rgb<u8>> = staged.figures.iter().map(|f| f.color).collect();
    assert_eq!(colors, palette);

    assert_eq!(*staged.output.get_pixel(100, 150), palette[0]);
    assert_eq!(*staged.output.get_pixel(500, 220), palette[1]);
    assert_eq!(*staged.output.get_pixel(300, 200), palette[2]);
}

#[test]
fn outlined_figure_has_outer_and_hole_borders() {
    let mut image = triangle_scene();
    draw_polygon_mut(
        &mut image,
        &[Point::new(150, 110), Point::new(90, 225), Point::new(210, 225)],
        BLACK,
    );

    let tree = process_staged(&image, &by_shape()).unwrap();
    assert_eq!(tree.contours.len(), 2);
    assert_eq!(tree.contours[0].kind, BorderKind::Outer);
    assert_eq!(tree.contours[1].kind, BorderKind::Hole);
    assert_eq!(tree.contours[1].parent, Some(0));

    let config = ColorizeConfig {
        retrieval: ContourRetrieval::External,
        ..by_shape()
    };
    let external = process_staged(&image, &config).unwrap();
    assert_eq!(external.contours.len(), 1);
    assert_eq!(external.figures[0].label, ShapeLabel::Triangle);
}

#[test]
fn decoded_png_gives_the_same_result() {
    let scene = triangle_scene();
    let mut png = Vec::new();
    scene
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode::decode_rgb(&png).unwrap();
    assert_eq!(decoded, scene);
    assert_eq!(
        color_image(&decoded, &by_shape()).unwrap(),
        color_image(&scene, &by_shape()).unwrap()
    );
}

#[test]
fn raw_buffer_of_wrong_length_is_rejected() {
    let err = decode::rgb_from_raw(300, 300, vec![0; 300 * 300]).unwrap_err();
    assert!(matches!(err, PipelineError::DimensionMismatch { .. }));
}

#[test]
fn output_has_input_dimensions() {
    let scene = circle_scene();
    let output = color_image(&scene, &ColorizeConfig::default()).unwrap();
    assert_eq!(output.dimensions(), scene.dimensions());
}

#[test]
fn recoloring_the_output_finds_the_same_figures() {
    let mut image = RgbImage::from_pixel(600, 300, BLACK);
    draw_filled_rect_mut(&mut image, Rect::at(30, 30).of_size(150, 150), WHITE);
    draw_filled_circle_mut(&mut image, (300, 150), 80, WHITE);
    let config = ColorizeConfig {
        threshold: 10,
        retrieval: ContourRetrieval::External,
        ..ColorizeConfig::default()
    };

    let first = process_staged(&image, &config).unwrap();
    let second = process_staged(&first.output, &config).unwrap();

    assert_eq!(first.contours.len(), 2);
    assert_eq!(second.contours.len(), first.contours.len());
    let labels = |staged: &figcolor_pipeline::StagedResult| {
        staged.figures.iter().map(|f| f.label).collect::<Vec<_>>()
    };
    assert_eq!(labels(&second), labels(&first));
}

#[test]
fn dark_outline_on_white_background_yields_two_triangle_borders() {
    // Thick black triangle outline on white: the white outside wraps the
    // outline as a hole border and the white inside is its own region.
    let mut image = RgbImage::from_pixel(300, 300, WHITE);
    draw_polygon_mut(&mut image, &triangle_vertices(), BLACK);
    draw_polygon_mut(
        &mut image,
        &[Point::new(150, 70), Point::new(62, 240), Point::new(238, 240)],
        WHITE,
    );

    let staged = process_staged(&image, &by_shape()).unwrap();
    assert_eq!(staged.contours.len(), 2);
    assert_eq!(staged.contours[0].kind, BorderKind::Hole);
    assert_eq!(staged.contours[0].parent, None);
    assert_eq!(staged.contours[1].kind, BorderKind::Outer);
    assert_eq!(staged.contours[1].parent, Some(0));
    assert!(
        staged
            .figures
            .iter()
            .all(|f| f.label == ShapeLabel::Triangle)
    );
}
