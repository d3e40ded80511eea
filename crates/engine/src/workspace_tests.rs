// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ag_core::FakeClock;

fn manager() -> (tempfile::TempDir, WorkspaceManager<FakeClock>) {
    let root = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::with_clock(root.path(), FakeClock::at_epoch_ms(1_700_000_000_000));
    (root, manager)
}

#[tokio::test]
async fn allocate_creates_directory_under_root() {
    let (root, workspaces) = manager();
    let path = workspaces.allocate(Some(&"exec-1".into())).await.unwrap();
    assert_eq!(path, root.path().join("exec-1"));
    assert!(path.is_dir());
}

#[tokio::test]
async fn allocate_is_idempotent() {
    let (_root, workspaces) = manager();
    let id = ExecutionId::new("exec-2");
    let first = workspaces.allocate(Some(&id)).await.unwrap();
    std::fs::write(first.join("artifact.txt"), "keep me").unwrap();

    let second = workspaces.allocate(Some(&id)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(second.join("artifact.txt")).unwrap(), "keep me");
}

#[tokio::test]
async fn allocate_creates_missing_root() {
    let root = tempfile::tempdir().unwrap();
    let workspaces = WorkspaceManager::new(root.path().join("nested").join("root"));
    let path = workspaces.allocate(Some(&"e".into())).await.unwrap();
    assert!(path.is_dir());
}

#[tokio::test]
async fn allocate_without_id_uses_timestamp() {
    let (root, workspaces) = manager();
    let path = workspaces.allocate(None).await.unwrap();
    assert_eq!(path, root.path().join("1700000000000"));
}

#[tokio::test]
async fn allocate_rejects_a_file_in_the_way() {
    let (root, workspaces) = manager();
    std::fs::write(root.path().join("taken"), "").unwrap();
    let err = workspaces.allocate(Some(&"taken".into())).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NotADirectory(_)), "{err:?}");
}

#[yare::parameterized(
    traversal = { "../escape" },
    nested    = { "a/b" },
    dotdot    = { ".." },
    empty     = { "" },
)]
fn unsafe_ids_are_rejected(raw: &str) {
    let (_root, workspaces) = manager();
    let err = workspaces.path_for(&ExecutionId::new(raw)).unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidKey(_)), "{err:?}");
}

#[tokio::test]
async fn release_deletes_recursively() {
    let (_root, workspaces) = manager();
    let id = ExecutionId::new("exec-3");
    let path = workspaces.allocate(Some(&id)).await.unwrap();
    std::fs::create_dir_all(path.join("target/debug")).unwrap();
    std::fs::write(path.join("target/debug/bin"), "x").unwrap();

    assert_eq!(workspaces.release(&id).await.unwrap(), Released::Deleted(path.clone()));
    assert!(!path.exists());
}

#[tokio::test]
async fn release_missing_workspace_is_noop() {
    let (root, workspaces) = manager();
    let released = workspaces.release(&"never-created".into()).await.unwrap();
    assert_eq!(released, Released::Absent(root.path().join("never-created")));
}

#[tokio::test]
async fn release_twice_is_noop() {
    let (_root, workspaces) = manager();
    let id = ExecutionId::new("exec-4");
    workspaces.allocate(Some(&id)).await.unwrap();
    assert!(matches!(workspaces.release(&id).await.unwrap(), Released::Deleted(_)));
    assert!(matches!(workspaces.release(&id).await.unwrap(), Released::Absent(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn allocate_failure_is_surfaced() {
    use std::os::unix::fs::PermissionsExt;

    let (root, _) = manager();
    let locked = root.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();
    // Root ignores permission bits; nothing to assert there.
    if std::fs::write(locked.join("probe"), "").is_ok() {
        return;
    }

    let workspaces = WorkspaceManager::new(&locked);
    let err = workspaces.allocate(Some(&"e".into())).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Create { .. }), "{err:?}");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();
}
