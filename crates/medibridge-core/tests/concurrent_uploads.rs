//! Integration test: concurrent uploads to the same final name never produce
//! a mix of both payloads at the final path.

use medibridge_core::staging::{temp_path, FileStager, ShareMount};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn same_name_uploads_are_all_or_nothing() {
    let root = tempfile::tempdir().unwrap();
    let stager = Arc::new(FileStager::new("\\\\nas\\pdf", ShareMount::mounted_at(root.path())));

    let payloads: Vec<Vec<u8>> = vec![vec![b'a'; 3 * 1024 * 1024], vec![b'b'; 1024 * 1024 + 17]];
    let barrier = Arc::new(Barrier::new(payloads.len()));

    let handles: Vec<_> = payloads
        .iter()
        .cloned()
        .map(|body| {
            let stager = Arc::clone(&stager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                stager.stage(&mut body.as_slice(), "same.pdf", None)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|r| r.is_ok()));

    let final_path = root.path().join("nas").join("pdf").join("same.pdf");
    let content = std::fs::read(&final_path).unwrap();
    assert!(payloads.iter().any(|p| p.len() == content.len()));
    assert!(payloads.iter().any(|p| *p == content));
    assert!(!temp_path(&root.path().join("nas").join("pdf"), "same.pdf").exists());
}

#[test]
fn different_names_stage_in_parallel() {
    let root = tempfile::tempdir().unwrap();
    let stager = Arc::new(FileStager::new("\\\\nas\\pdf", ShareMount::mounted_at(root.path())));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let stager = Arc::clone(&stager);
            thread::spawn(move || {
                let body = vec![i as u8; 1000 + i];
                stager.stage(&mut body.as_slice(), &format!("doc-{}.pdf", i), None)
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        let staged = h.join().unwrap().unwrap();
        assert_eq!(staged.byte_size, 1000 + i as u64);
    }
    assert_eq!(std::fs::read_dir(root.path().join("nas/pdf")).unwrap().count(), 8);
}
