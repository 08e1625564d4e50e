use super::*;

fn edit(file: &str, session: &str, version_ms: u64) -> Edit {
    Edit {
        file: file.into(),
        op: serde_json::json!({"insert": "x"}),
        version_clock: version_ms,
        session_ref: SessionId::new(session),
    }
}

#[test]
fn conflict_is_symmetric_regardless_of_order() {
    let e1 = edit("f.rs", "s1", 0);
    let e2 = edit("f.rs", "s2", 3_000);
    assert!(e1.conflicts_with(&e2));
    assert!(e2.conflicts_with(&e1));
}

#[test]
fn same_session_never_conflicts() {
    let e1 = edit("f.rs", "s1", 0);
    let e2 = edit("f.rs", "s1", 100);
    assert!(!e1.conflicts_with(&e2));
}

#[test]
fn outside_window_does_not_conflict() {
    let e1 = edit("f.rs", "s1", 0);
    let e2 = edit("f.rs", "s2", 6_000);
    assert!(!e1.conflicts_with(&e2));
}

#[test]
fn different_files_never_conflict() {
    let e1 = edit("a.rs", "s1", 0);
    let e2 = edit("b.rs", "s2", 0);
    assert!(!e1.conflicts_with(&e2));
}
