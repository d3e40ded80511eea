// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn file_appender_creates_the_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("logs");
    file_appender(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn file_appender_rejects_a_file_path() {
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("taken");
    std::fs::write(&file, "").unwrap();
    assert!(file_appender(&file).is_err());
}
