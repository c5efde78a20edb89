//! CLI smoke tests.

mod common;

use assert_cmd::Command;
use common::{photograph, render_board};
use fenlens::core::Quad;
use fenlens::fen::PieceLabel;
use nalgebra::Point2;
use predicates::prelude::*;

fn board_photo_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let labels = [PieceLabel::Empty; 64];
    let board = render_board(&labels);
    let quad = Quad::from_ordered([
        Point2::new(82.0, 74.0),
        Point2::new(534.0, 82.0),
        Point2::new(540.0, 524.0),
        Point2::new(74.0, 514.0),
    ]);
    let photo = photograph(&board, 640, 640, &quad);

    let path = dir.path().join("board.png");
    photo.save(&path).expect("save photo");
    path
}

#[test]
fn detect_reports_json_and_writes_rectified() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = board_photo_file(&dir);
    let rectified = dir.path().join("rectified.png");

    let output = Command::cargo_bin("fenlens")
        .expect("binary")
        .args(["detect", "--json", "--rectified"])
        .arg(&rectified)
        .arg(&photo)
        .assert()
        .success()
        .get_output()
        .clone();

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON report");
    assert!(report.get("quad").is_some());
    assert!(report.get("geometry").is_some());
    assert!(report["geometry"]["output_size"].as_u64().unwrap_or(0) >= 64);

    let rectified_img = image::open(&rectified).expect("rectified PNG written");
    assert_eq!(rectified_img.width(), rectified_img.height());
}

#[test]
fn detect_prints_human_summary_by_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = board_photo_file(&dir);

    Command::cargo_bin("fenlens")
        .expect("binary")
        .arg("detect")
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("quality:"))
        .stdout(predicate::str::contains("strategy:"));
}

#[test]
fn detect_fails_cleanly_on_a_blank_photo() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blank = image::GrayImage::from_pixel(400, 400, image::Luma([255u8]));
    let path = dir.path().join("blank.png");
    blank.save(&path).expect("save blank");

    Command::cargo_bin("fenlens")
        .expect("binary")
        .arg("detect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no board-like quadrilateral"));
}
