use super::*;

#[test]
fn task_timeout_event_serializes_with_kebab_case_tag() {
    let event = Event::TaskTimeout {
        task_id: TaskId::new("t-1"),
        agent_id: AgentId::new("a-1"),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "task-timeout");
    assert_eq!(json["task_id"], "t-1");
}

#[test]
fn events_round_trip_through_json() {
    let event = Event::VoteResolved {
        proposal_id: ProposalId::new("p-1"),
        choice: serde_json::json!("yes"),
        diversity_score: 0.22,
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    match back {
        Event::VoteResolved { proposal_id, .. } => assert_eq!(proposal_id, ProposalId::new("p-1")),
        _ => panic!("wrong variant"),
    }
}
