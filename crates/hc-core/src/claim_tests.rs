use super::*;

#[test]
fn new_claim_starts_pending() {
    let claim = Claim::new(TaskId::new("t-1"), AgentId::new("a-1"), 1_000);
    assert_eq!(claim.status, ClaimStatus::Pending);
    assert!(!claim.status.is_completed());
}
