use super::*;

#[test]
fn codes_are_stable_wire_identifiers() {
    assert_eq!(HubError::Locked.code(), "LOCKED");
    assert_eq!(HubError::ClaimConflict.code(), "CLAIM_CONFLICT");
    assert_eq!(HubError::AuthFailed("x".into()).code(), "AUTH_FAILED");
}

#[test]
fn only_locked_is_retryable() {
    assert!(HubError::Locked.retryable());
    assert!(!HubError::ClaimConflict.retryable());
    assert!(!HubError::Internal.retryable());
}
