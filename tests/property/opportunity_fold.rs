// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Opportunity Aggregate
//!
//! Arbitrary join sequences (with repeats) are run through the pure handlers
//! and folded; the result must satisfy every domain invariant.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use group_buy_engine::aggregate::{
    apply_events, handle_create_opportunity, handle_join, replay, CreateOpportunityCommand,
    JoinDecision, JoinOpportunityCommand,
};
use group_buy_engine::domain::invariants::validate_opportunity;
use group_buy_engine::domain::{OpportunityId, OpportunityStatus, Product, UserId};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn prop_join_sequences_preserve_invariants(
        threshold in 2u32..12,
        joiners in proptest::collection::vec(0u8..16, 0..40),
    ) {
        let events = handle_create_opportunity(CreateOpportunityCommand {
            opportunity_id: OpportunityId::new(),
            product: Product::with_group_buying("p-prop", "Prop Product").threshold(threshold),
            initiator_id: UserId::new("u-init"),
            timestamp: t0(),
            correlation_id: Uuid::now_v7(),
        })
        .unwrap();
        let mut opp = replay(&events).unwrap();
        let mut completions = 0;

        for (step, joiner) in joiners.iter().enumerate() {
            let before = opp.participant_count();
            let cmd = JoinOpportunityCommand {
                user_id: UserId::new(format!("u-{joiner}")),
                timestamp: t0() + Duration::minutes(step as i64),
                correlation_id: Uuid::now_v7(),
            };
            match handle_join(&opp, cmd) {
                Ok(JoinDecision::Join { events, output }) => {
                    opp = apply_events(opp, &events);
                    prop_assert_eq!(opp.participant_count(), before + 1);
                    if output.notify_participants {
                        completions += 1;
                        prop_assert_eq!(opp.participant_count(), threshold);
                    }
                }
                Ok(JoinDecision::AlreadyJoined) => {
                    prop_assert_eq!(opp.participant_count(), before);
                }
                Ok(JoinDecision::ExpireInstead(_)) => prop_assert!(false, "window never passes"),
                Err(_) => prop_assert_eq!(opp.status, OpportunityStatus::Completed),
            }
            prop_assert!(validate_opportunity(&opp).is_ok());
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(completions == 1, opp.status == OpportunityStatus::Completed);
        prop_assert_eq!(opp.completed_at.is_some(), opp.status == OpportunityStatus::Completed);
        prop_assert!(opp.participant_count() <= threshold);
    }
}
