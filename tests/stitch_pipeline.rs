//! End-to-end stitches against real files: the pure-Rust backend decodes
//! images from a temp directory and the directory catalog publishes into a
//! temp gallery.
//!
//! Run with: cargo test --test stitch_pipeline

use image::{ImageFormat, Rgba, RgbaImage};
use pic_stitch::config;
use pic_stitch::gallery::DirectoryCatalog;
use pic_stitch::imaging::RustBackend;
use pic_stitch::selection::{DirectoryPicker, FsPermission, PathPicker};
use pic_stitch::stitch::{StitchOptions, Stitcher};
use pic_stitch::types::{Axis, Outcome};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn write_solid_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

fn stitcher(gallery: &Path) -> Stitcher<RustBackend, DirectoryCatalog> {
    Stitcher::new(RustBackend::new(), DirectoryCatalog::new(gallery))
}

fn saved_path(outcome: &Outcome) -> PathBuf {
    match outcome {
        Outcome::Saved { path, .. } => path.clone(),
        other => panic!("expected Saved, got {other:?}"),
    }
}

#[test]
fn vertical_stitch_of_explicit_paths() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first.png");
    let second = tmp.path().join("second.png");
    write_solid_png(&first, 100, 50, RED);
    write_solid_png(&second, 80, 60, BLUE);
    let gallery = tmp.path().join("Pictures");

    let paths = vec![first, second];
    let outcome = stitcher(&gallery).run(
        &FsPermission::for_paths(&paths),
        &mut PathPicker::new(paths.clone()),
        &StitchOptions::default(),
        None,
    );

    let saved = saved_path(&outcome);
    assert_eq!(saved.parent(), Some(gallery.as_path()));
    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("IMG_") && name.ends_with(".png"), "{name}");

    let result = image::open(&saved).unwrap().into_rgba8();
    assert_eq!(result.dimensions(), (100, 110));
    assert_eq!(result.get_pixel(50, 25).0, RED);
    assert_eq!(result.get_pixel(40, 80).0, BLUE);
    // Right of the narrower second image stays transparent
    assert_eq!(result.get_pixel(90, 80).0, CLEAR);

    let catalog = DirectoryCatalog::new(&gallery);
    assert_eq!(catalog.entries().unwrap(), vec![saved]);
    assert!(catalog.pending_entries().unwrap().is_empty());
}

#[test]
fn horizontal_stitch_of_a_directory_in_prefix_order() {
    let tmp = TempDir::new().unwrap();
    let shots = tmp.path().join("shots");
    fs::create_dir(&shots).unwrap();
    write_solid_png(&shots.join("020-right.png"), 30, 10, BLUE);
    write_solid_png(&shots.join("010-left.png"), 20, 40, RED);
    fs::write(shots.join("notes.txt"), "not an image").unwrap();
    let gallery = tmp.path().join("out");

    let options = StitchOptions {
        axis: Axis::Horizontal,
        ..StitchOptions::default()
    };
    let outcome = stitcher(&gallery).run(
        &FsPermission::for_dir(&shots),
        &mut DirectoryPicker::new(&shots),
        &options,
        None,
    );

    assert!(matches!(
        outcome,
        Outcome::Saved {
            width: 50,
            height: 40,
            images: 2,
            ..
        }
    ));
    let result = image::open(saved_path(&outcome)).unwrap().into_rgba8();
    assert_eq!(result.get_pixel(0, 39).0, RED);
    assert_eq!(result.get_pixel(20, 0).0, BLUE);
    assert_eq!(result.get_pixel(20, 10).0, CLEAR);
}

#[test]
fn empty_directory_selects_nothing_and_creates_no_gallery() {
    let tmp = TempDir::new().unwrap();
    let gallery = tmp.path().join("Pictures");

    let outcome = stitcher(&gallery).run(
        &FsPermission::for_dir(tmp.path()),
        &mut DirectoryPicker::new(tmp.path()),
        &StitchOptions::default(),
        None,
    );

    assert_eq!(outcome, Outcome::NoSelection);
    assert!(!outcome.is_failure());
    assert!(!gallery.exists());
}

#[test]
fn corrupt_input_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("good.png");
    let bad = tmp.path().join("bad.jpg");
    write_solid_png(&good, 10, 10, RED);
    fs::write(&bad, b"\xFF\xD8\xFF\xE0 truncated").unwrap();
    let gallery = tmp.path().join("Pictures");

    let paths = vec![good, bad];
    let outcome = stitcher(&gallery).run(
        &FsPermission::for_paths(&paths),
        &mut PathPicker::new(paths.clone()),
        &StitchOptions::default(),
        None,
    );

    let Outcome::Failed { detail } = &outcome else {
        panic!("expected Failed, got {outcome:?}");
    };
    assert!(detail.contains("bad.jpg"), "{detail}");
    assert!(outcome.is_failure());
    assert!(!gallery.exists());
}

#[test]
fn unreadable_source_directory_is_permission_denied() {
    let tmp = TempDir::new().unwrap();
    let paths = vec![tmp.path().join("vanished/photo.png")];

    let outcome = stitcher(&tmp.path().join("Pictures")).run(
        &FsPermission::for_paths(&paths),
        &mut PathPicker::new(paths.clone()),
        &StitchOptions::default(),
        None,
    );
    assert_eq!(outcome, Outcome::PermissionDenied);
}

#[test]
fn config_file_drives_prefix_and_axis() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(config::DEFAULT_CONFIG_FILE),
        "[layout]\naxis = \"horizontal\"\n[gallery]\nprefix = \"strip-\"\ncompression = \"fast\"\n",
    )
    .unwrap();
    let config = config::load_config(None, tmp.path()).unwrap();

    let a = tmp.path().join("a.png");
    let b = tmp.path().join("b.png");
    write_solid_png(&a, 5, 5, RED);
    write_solid_png(&b, 5, 5, BLUE);
    let gallery = tmp.path().join("Pictures");

    let options = StitchOptions {
        axis: config.layout.axis,
        save: config.save_options(),
        max_canvas_pixels: config.limits.canvas_limit(),
    };
    let paths = vec![a, b];
    let outcome = stitcher(&gallery).run(
        &FsPermission::for_paths(&paths),
        &mut PathPicker::new(paths.clone()),
        &options,
        None,
    );

    assert!(matches!(
        outcome,
        Outcome::Saved {
            width: 10,
            height: 5,
            ..
        }
    ));
    let name = saved_path(&outcome)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(name.starts_with("strip-"), "{name}");
}

#[test]
fn consecutive_stitches_never_overwrite() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("one.png");
    write_solid_png(&src, 4, 4, RED);
    let gallery = tmp.path().join("Pictures");
    let stitcher = stitcher(&gallery);
    let paths = vec![src];

    let mut saved = Vec::new();
    for _ in 0..3 {
        let outcome = stitcher.run(
            &FsPermission::for_paths(&paths),
            &mut PathPicker::new(paths.clone()),
            &StitchOptions::default(),
            None,
        );
        match outcome {
            Outcome::Saved { path, .. } => saved.push(path),
            // Same-millisecond collision is refused, never overwritten
            Outcome::SaveFailed => {}
            other => panic!("unexpected outcome {other:?}"),
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    let entries = DirectoryCatalog::new(&gallery).entries().unwrap();
    assert_eq!(entries.len(), saved.len());
    assert!(!saved.is_empty());
}
