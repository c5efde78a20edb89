//! End-to-end pipeline tests on synthetic photographs.

mod common;

use common::{photograph, png_bytes, render_board, CodeClassifier};
use fenlens::core::Quad;
use fenlens::fen::{expand_board_field, PieceLabel};
use fenlens::{FenPipeline, FenPipelineError, PipelineParams};
use nalgebra::Point2;

const START_FIELD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
const START_FIELD_FLIPPED: &str = "RNBQKBNR/PPPPPPPP/8/8/8/8/pppppppp/rnbqkbnr";

fn pipeline() -> FenPipeline {
    let _ = env_logger::builder().is_test(true).try_init();
    FenPipeline::new(PipelineParams::default())
}

/// Mildly tilted but well-framed placement in a 640px photo.
fn gentle_quad() -> Quad {
    Quad::from_ordered([
        Point2::new(82.0, 74.0),
        Point2::new(534.0, 82.0),
        Point2::new(540.0, 524.0),
        Point2::new(74.0, 514.0),
    ])
}

#[test]
fn starting_position_round_trips_through_a_photo() {
    let labels = expand_board_field(START_FIELD).expect("valid start position");
    let board = render_board(&labels);
    let photo = photograph(&board, 640, 640, &gentle_quad());

    let recognition = pipeline()
        .recognize(&photo, &CodeClassifier)
        .expect("recognized");

    // Orientation is a standing assumption, not auto-detected, so the
    // board field is either the start position or its top/bottom mirror.
    assert!(
        recognition.board_field == START_FIELD || recognition.board_field == START_FIELD_FLIPPED,
        "unexpected field {}",
        recognition.board_field
    );
    assert!(recognition.fen.ends_with(" w - - 0 1"));
    assert!(!recognition.low_confidence);
    assert_eq!(recognition.squares.len(), 64);
}

#[test]
fn rectified_board_is_the_canonical_square() {
    let labels = [PieceLabel::Empty; 64];
    let board = render_board(&labels);
    let photo = photograph(&board, 640, 640, &gentle_quad());

    let extraction = pipeline().extract_board(&photo).expect("extracted");
    let s = extraction.geometry.output_size as usize;
    assert_eq!(extraction.rectified.image.width, s);
    assert_eq!(extraction.rectified.image.height, s);
    assert!(s >= 64);

    // The crop must cover the quad inside the source bounds.
    let crop = extraction.rectified.source_crop;
    assert!(crop.x + crop.width <= 640);
    assert!(crop.y + crop.height <= 640);
}

#[test]
fn marked_corner_square_stays_top_left() {
    // One black king on a8 (row 0, col 0). If any stage rotated the board,
    // the king would surface on another corner square.
    let mut labels = [PieceLabel::Empty; 64];
    labels[0] = PieceLabel::BlackKing;
    let board = render_board(&labels);
    let photo = photograph(&board, 640, 640, &gentle_quad());

    let recognition = pipeline()
        .recognize(&photo, &CodeClassifier)
        .expect("recognized");

    let a8 = recognition
        .squares
        .iter()
        .find(|s| s.row == 0 && s.col == 0)
        .expect("square a8 present");
    assert_eq!(a8.label, PieceLabel::BlackKing);
    assert!(recognition.board_field.starts_with("k7/"));
}

#[test]
fn blank_photo_is_not_enough_corners() {
    let photo = image::GrayImage::from_pixel(400, 400, image::Luma([255u8]));
    let err = pipeline()
        .recognize(&photo, &CodeClassifier)
        .expect_err("no board to find");
    assert!(
        matches!(err, FenPipelineError::NotEnoughCorners),
        "unexpected error {err:?}"
    );
}

#[test]
fn encoded_bytes_round_trip_through_decode() {
    let labels = expand_board_field(START_FIELD).expect("valid start position");
    let board = render_board(&labels);
    let photo = photograph(&board, 640, 640, &gentle_quad());
    let bytes = png_bytes(&photo);

    let recognition = pipeline()
        .recognize_bytes(&bytes, &CodeClassifier)
        .expect("recognized from bytes");
    assert!(
        recognition.board_field == START_FIELD || recognition.board_field == START_FIELD_FLIPPED
    );
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let err = pipeline()
        .recognize_bytes(b"definitely not an image", &CodeClassifier)
        .expect_err("must not decode");
    assert!(matches!(err, FenPipelineError::ImageDecodeFailed(_)));
}

#[test]
fn oversized_photo_is_downscaled_and_still_recognized() {
    // Longest side above the 1200px working bound exercises the
    // downscale-then-map-back path.
    let labels = expand_board_field(START_FIELD).expect("valid start position");
    let board = render_board(&labels);
    let quad = Quad::from_ordered([
        Point2::new(200.0, 180.0),
        Point2::new(1320.0, 200.0),
        Point2::new(1340.0, 1300.0),
        Point2::new(180.0, 1280.0),
    ]);
    let photo = photograph(&board, 1600, 1600, &quad);

    let recognition = pipeline()
        .recognize(&photo, &CodeClassifier)
        .expect("recognized");
    assert!(
        recognition.board_field == START_FIELD || recognition.board_field == START_FIELD_FLIPPED
    );
    // The quad is reported in source coordinates, not working coordinates.
    assert!(recognition.extraction.quad.bottom_right().x > 1200.0);
}
