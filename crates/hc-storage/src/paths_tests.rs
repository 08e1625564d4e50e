use super::*;

#[test]
fn paths_are_rooted_under_dot_harmonycode() {
    let ws = Workspace::new("/srv/project");
    assert_eq!(ws.config_path(), Path::new("/srv/project/.harmonycode/config.json"));
    assert_eq!(ws.identities_path(), Path::new("/srv/project/.harmonycode/identities.json"));
    assert_eq!(ws.task_locks_path(), Path::new("/srv/project/.harmonycode/task-locks.json"));
    assert_eq!(ws.task_claims_path(), Path::new("/srv/project/.harmonycode/task-claims.json"));
}

#[test]
fn memory_entry_sanitizes_unsafe_characters() {
    let ws = Workspace::new("/srv/project");
    let path = ws.memory_entry_path("team/notes:v1");
    assert_eq!(
        path,
        Path::new("/srv/project/.harmonycode/memory/team_notes_v1.json")
    );
}

#[test]
fn memory_entry_preserves_safe_characters() {
    let ws = Workspace::new("/srv/project");
    let path = ws.memory_entry_path("release-notes_2026");
    assert_eq!(
        path,
        Path::new("/srv/project/.harmonycode/memory/release-notes_2026.json")
    );
}

#[test]
fn is_initialized_reflects_state_dir_presence() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    assert!(!ws.is_initialized());

    std::fs::create_dir_all(dir.path().join(".harmonycode")).unwrap();
    assert!(ws.is_initialized());
}
