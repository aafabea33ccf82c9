//! Integration tests for the collect pipeline.
//!
//! These tests verify end-to-end behavior including:
//! - Renaming on collisions with files already in the target
//! - Mixed file and directory sources
//! - Manifest-driven batches

use assert_fs::prelude::*;
use dataset_prep::core::collect::{load_manifest, run_jobs, CollectPipeline};
use dataset_prep::events::{null_sender, CollectEvent, Event, EventChannel};
use dataset_prep::PrepError;
use predicates::prelude::*;
use std::fs;

#[test]
fn same_names_from_two_sources_are_numbered_after_existing_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("train");
    target.child("photo.jpg").write_binary(b"existing").unwrap();
    temp.child("a/photo.jpg").write_binary(b"from a").unwrap();
    temp.child("b/photo.jpg").write_binary(b"from b").unwrap();

    let result = CollectPipeline::builder()
        .target(target.path())
        .sources(vec![temp.child("a").path().to_path_buf(), temp.child("b").path().to_path_buf()])
        .build()
        .run()
        .unwrap();

    assert_eq!(result.copied(), 2);
    assert_eq!(result.failed(), 0);
    target.child("photo.jpg").assert("existing");
    target.child("photo_1.jpg").assert(predicate::path::is_file());
    target.child("photo_2.jpg").assert(predicate::path::is_file());
    target.child("photo_3.jpg").assert(predicate::path::missing());

    let mut copied = vec![
        fs::read(target.child("photo_1.jpg").path()).unwrap(),
        fs::read(target.child("photo_2.jpg").path()).unwrap(),
    ];
    copied.sort();
    assert_eq!(copied, vec![b"from a".to_vec(), b"from b".to_vec()]);
}

#[test]
fn files_and_directories_mix_and_non_images_are_ignored() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("single.PNG").write_binary(b"png").unwrap();
    temp.child("frames/deep/nested/f1.webp").write_binary(b"webp").unwrap();
    temp.child("frames/f2.tiff").write_binary(b"tiff").unwrap();
    temp.child("frames/notes.txt").write_str("ignore me").unwrap();
    temp.child("frames/.hidden.jpg").write_binary(b"dot").unwrap();

    let target = temp.child("out");
    let result = CollectPipeline::builder()
        .target(target.path())
        .sources(vec![
            temp.child("single.PNG").path().to_path_buf(),
            temp.child("frames").path().to_path_buf(),
        ])
        .build()
        .run()
        .unwrap();

    assert_eq!(result.copied(), 4);
    target.child("single.PNG").assert("png");
    target.child("f1.webp").assert("webp");
    target.child("f2.tiff").assert("tiff");
    target.child(".hidden.jpg").assert("dot");
    target.child("notes.txt").assert(predicate::path::missing());
}

#[test]
fn many_identical_names_never_overwrite() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut sources = Vec::new();
    for i in 0..40 {
        let dir = temp.child(format!("cam{i}"));
        dir.child("IMG_0001.jpg")
            .write_binary(format!("shot {i}").as_bytes())
            .unwrap();
        sources.push(dir.path().to_path_buf());
    }

    let target = temp.child("merged");
    let result = CollectPipeline::builder()
        .target(target.path())
        .sources(sources)
        .max_workers(8)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.copied(), 40);
    let mut contents: Vec<Vec<u8>> = fs::read_dir(target.path())
        .unwrap()
        .map(|entry| fs::read(entry.unwrap().path()).unwrap())
        .collect();
    contents.sort();
    contents.dedup();
    assert_eq!(contents.len(), 40);
    target.child("IMG_0001_39.jpg").assert(predicate::path::is_file());
    target.child("IMG_0001_40.jpg").assert(predicate::path::missing());
}

#[test]
fn missing_source_does_not_stop_the_run() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ok/a.gif").write_binary(b"gif").unwrap();

    let result = CollectPipeline::builder()
        .target(temp.child("out").path())
        .sources(vec![
            temp.child("does-not-exist").path().to_path_buf(),
            temp.child("ok").path().to_path_buf(),
        ])
        .build()
        .run()
        .unwrap();

    assert_eq!(result.copied(), 1);
    assert_eq!(result.scan_errors.len(), 1);
    temp.child("out/a.gif").assert("gif");
}

#[test]
fn events_report_every_copy() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/a.jpg").write_binary(b"a").unwrap();
    temp.child("src/b.jpg").write_binary(b"b").unwrap();

    let (sender, receiver) = EventChannel::new();
    CollectPipeline::builder()
        .target(temp.child("out").path())
        .sources(vec![temp.child("src").path().to_path_buf()])
        .build()
        .run_with_events(&sender)
        .unwrap();
    drop(sender);

    let events: Vec<Event> = receiver.iter().collect();
    let copied = events
        .iter()
        .filter(|e| matches!(e, Event::Collect(CollectEvent::Copied { .. })))
        .count();
    assert_eq!(copied, 2);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Collect(CollectEvent::Completed { copied: 2, failed: 0 }))));
}

#[test]
fn manifest_jobs_run_in_order() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("real/r.jpg").write_binary(b"real").unwrap();
    temp.child("fake/f.jpg").write_binary(b"fake").unwrap();
    let manifest = temp.child("jobs.json");
    manifest
        .write_str(
            &serde_json::json!([
                { "target": temp.child("train/0_real").path(), "sources": [temp.child("real").path()] },
                { "target": temp.child("train/1_fake").path(), "sources": [temp.child("fake").path()] }
            ])
            .to_string(),
        )
        .unwrap();

    let jobs = load_manifest(manifest.path()).unwrap();
    let results = run_jobs(&jobs, 4, &null_sender()).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].target, temp.child("train/0_real").path().to_path_buf());
    temp.child("train/0_real/r.jpg").assert("real");
    temp.child("train/1_fake/f.jpg").assert("fake");
}

#[test]
fn malformed_manifest_is_fatal() {
    let temp = assert_fs::TempDir::new().unwrap();
    let manifest = temp.child("jobs.json");
    manifest.write_str("{ not json").unwrap();

    assert!(matches!(
        load_manifest(manifest.path()),
        Err(PrepError::Manifest { .. })
    ));
}

#[cfg(unix)]
#[test]
fn symlinked_image_in_source_dir_is_copied() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("store/real.jpg").write_binary(b"linked bytes").unwrap();
    temp.child("src").create_dir_all().unwrap();
    std::os::unix::fs::symlink(
        temp.child("store/real.jpg").path(),
        temp.child("src/link.jpg").path(),
    )
    .unwrap();

    let result = CollectPipeline::builder()
        .target(temp.child("out").path())
        .sources(vec![temp.child("src").path().to_path_buf()])
        .build()
        .run()
        .unwrap();

    assert_eq!(result.copied(), 1);
    temp.child("out/link.jpg").assert("linked bytes");
    assert!(!fs::symlink_metadata(temp.child("out/link.jpg").path())
        .unwrap()
        .file_type()
        .is_symlink());
}
