//! Common test utilities for integration tests
#![allow(dead_code)]

pub mod tcp_harness;

use camino::Utf8PathBuf;
use std::path::Path;

/// Write a fixture file into `dir` and return its path.
pub fn write_fixture(dir: &Path, name: &str, text: &str) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.join(name)).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}
