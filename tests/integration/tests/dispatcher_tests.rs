//! End-to-end dispatcher scenarios over the in-memory store
//!
//! Run with: cargo test -p integration-tests --test dispatcher_tests

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use integration_tests::{assert_error_code, expect_no_error, fixtures::*, HarnessConfig, TestHarness};
use rating_core::ledger::{LedgerOp, LedgerRequest};
use rating_core::{ActionPayload, ActorId, HistoryKind, RatingCurve, Stars};
use rating_service::dto::{AdminReply, InboundPayload, Reply};
use rating_service::services::{LedgerService, RetentionPolicy, RetentionService};

fn without_cooldown() -> TestHarness {
    TestHarness::memory_with(HarnessConfig {
        cooldown: Duration::ZERO,
        ..HarnessConfig::default()
    })
}

// ============================================================================
// Ledger arithmetic
// ============================================================================

#[tokio::test]
async fn test_aggregate_matches_last_reviews_and_likes() {
    let harness = without_cooldown();
    let project = harness.add_project(admin(), &unique_name("ripgrep")).await.unwrap();
    let actors = [user(), user(), user()];

    let script: &[(usize, Option<&str>)] = &[
        (0, Some("4")),
        (1, None),
        (0, Some("1")),
        (2, Some("5")),
        (1, Some("2")),
        (0, None),
        (2, Some("5")),
        (1, None),
        (2, Some("3")),
    ];

    let mut last_stars: HashMap<usize, u8> = HashMap::new();
    let mut liked: HashMap<usize, bool> = HashMap::new();

    for &(who, action) in script {
        let actor = actors[who];
        match action {
            Some(value) => {
                harness.review(actor, project, "still good", value).await.unwrap();
                last_stars.insert(who, value.parse().unwrap());
            }
            None => {
                let reply = harness.send(actor, like(project)).await;
                if liked.insert(who, true).is_some() {
                    assert_error_code(&reply, "DUPLICATE_CONTRIBUTION");
                } else {
                    expect_no_error(&reply).unwrap();
                }
            }
        }
    }

    let expected: i64 = last_stars
        .values()
        .map(|&s| RatingCurve::delta(Stars::new(s).unwrap()))
        .sum::<i64>()
        + liked.len() as i64;

    assert_eq!(harness.score(project).await.unwrap(), expected);
    assert_eq!(harness.derived_score(project).await.unwrap(), expected);

    let report = LedgerService::new(harness.context()).reconcile(project).await.unwrap();
    assert!(report.is_consistent());
}

#[tokio::test]
async fn test_identical_review_is_a_no_op() {
    let harness = without_cooldown();
    let project = harness.add_project(admin(), &unique_name("fd")).await.unwrap();
    let actor = user();

    harness.review(actor, project, "fast", "4").await.unwrap();
    let again = harness.review(actor, project, "fast", "4").await.unwrap();

    assert_eq!(again.delta, 0);
    assert_eq!(again.outcome, HistoryKind::UpdateReview);
    assert_eq!(harness.score(project).await.unwrap(), 2);
}

#[tokio::test]
async fn test_review_edit_from_two_to_five() {
    let harness = without_cooldown();
    let admin = admin();
    let name = unique_name("bat");
    let project = harness.add_project(admin, &name).await.unwrap();
    harness.send(admin, adjust_score(&name, 10, "seed")).await;

    let actor = user();
    let first = harness.review(actor, project, "meh", "2").await.unwrap();
    assert_eq!(first.new_score, 8);

    let edit = harness.review(actor, project, "grew on me", "5").await.unwrap();
    assert_eq!(edit.delta, 7);
    assert_eq!(edit.new_score, 15);
}

#[tokio::test]
async fn test_removing_one_star_review_adds_five() {
    let harness = without_cooldown();
    let admin = admin();
    let project = harness.add_project(admin, &unique_name("exa")).await.unwrap();
    harness.send(user(), like(project)).await;

    let review = harness.review(user(), project, "broken", "1").await.unwrap();
    assert_eq!(review.new_score, -4);
    let history_before = harness
        .context()
        .history_repo()
        .find_by_project(project, 100)
        .await
        .unwrap()
        .len();

    let reply = harness.send(admin, remove_review(review.contribution_id)).await;
    let Reply::Admin {
        reply: AdminReply::ContributionRemoved { receipt },
    } = reply
    else {
        panic!("expected removal, got {reply:?}");
    };
    assert_eq!(receipt.delta, 5);
    assert_eq!(receipt.new_score, 1);

    let history = harness
        .context()
        .history_repo()
        .find_by_project(project, 100)
        .await
        .unwrap();
    assert_eq!(history.len(), history_before + 1);
    assert_eq!(history[0].kind, HistoryKind::RemoveReview);
    assert_eq!(history[0].delta, 5);
}

#[tokio::test]
async fn test_second_like_is_rejected() {
    let harness = without_cooldown();
    let project = harness.add_project(admin(), &unique_name("jq")).await.unwrap();
    let actor = user();

    assert!(matches!(harness.send(actor, like(project)).await, Reply::Liked { .. }));
    let reply = harness.send(actor, like(project)).await;
    assert_error_code(&reply, "DUPLICATE_CONTRIBUTION");
    assert_eq!(harness.score(project).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_first_reviews_both_count() {
    let harness = TestHarness::memory();
    let project = harness.add_project(admin(), &unique_name("tokio")).await.unwrap();
    let (a, b) = (user(), user());

    for actor in [a, b] {
        harness.send(actor, start_review(project)).await;
        harness.send(actor, text("excellent")).await;
    }

    let (ra, rb) = futures::join!(harness.send(a, stars("5")), harness.send(b, stars("5")));
    assert!(matches!(ra, Reply::ReviewCommitted { .. }));
    assert!(matches!(rb, Reply::ReviewCommitted { .. }));
    assert_eq!(harness.score(project).await.unwrap(), 10);
}

// ============================================================================
// Access gate
// ============================================================================

#[tokio::test]
async fn test_second_mutation_within_cooldown_is_rejected() {
    let harness = TestHarness::memory();
    let first = harness.add_project(admin(), &unique_name("serde")).await.unwrap();
    let second = harness.add_project(admin(), &unique_name("rayon")).await.unwrap();
    let actor = user();

    harness.review(actor, first, "great", "5").await.unwrap();
    let reply = harness.send(actor, like(second)).await;
    assert!(matches!(reply, Reply::Throttled { retry_after_secs } if retry_after_secs > 0));

    assert_eq!(harness.score(first).await.unwrap(), 5);
    assert_eq!(harness.score(second).await.unwrap(), 0);
    assert_eq!(harness.cooldown.tracked(), 1);
}

#[tokio::test]
async fn test_privileged_actor_skips_cooldown() {
    let harness = TestHarness::memory();
    let moderator = admin();
    let first = harness.add_project(moderator, &unique_name("clap")).await.unwrap();
    let second = harness.add_project(moderator, &unique_name("anyhow")).await.unwrap();

    assert!(matches!(harness.send(moderator, like(first)).await, Reply::Liked { .. }));
    assert!(matches!(harness.send(moderator, like(second)).await, Reply::Liked { .. }));
}

#[tokio::test]
async fn test_banned_actor_leaves_no_trace() {
    let harness = without_cooldown();
    let moderator = admin();
    let project = harness.add_project(moderator, &unique_name("hyper")).await.unwrap();
    let actor = user();

    let reply = harness.send(moderator, ban(actor.id)).await;
    assert!(matches!(reply, Reply::Admin { reply: AdminReply::Banned { .. } }));

    for payload in [
        like(project),
        start_review(project),
        text("let me in"),
        stars("5"),
        InboundPayload::Cancel,
        InboundPayload::Greeting,
        add_project("rogue", "x"),
    ] {
        assert!(harness.send(actor, payload).await.is_silent());
    }

    assert_eq!(harness.score(project).await.unwrap(), 0);
    let history = harness
        .context()
        .history_repo()
        .find_by_project(project, 100)
        .await
        .unwrap();
    assert!(history.is_empty());
    assert!(harness.context().conversations().is_empty());

    harness.send(moderator, unban(actor.id)).await;
    assert!(matches!(harness.send(actor, like(project)).await, Reply::Liked { .. }));
}

#[tokio::test]
async fn test_non_privileged_admin_command_is_rejected() {
    let harness = TestHarness::memory();
    let name = unique_name("tracing");
    harness.add_project(admin(), &name).await.unwrap();
    let actor = user();

    assert_error_code(&harness.send(actor, add_project("rogue", "x")).await, "PERMISSION_DENIED");
    assert_error_code(&harness.send(actor, adjust_score(&name, 50, "me")).await, "PERMISSION_DENIED");
    assert_error_code(&harness.send(actor, ban(ActorId::new(1))).await, "PERMISSION_DENIED");
}

// ============================================================================
// Conversations
// ============================================================================

#[tokio::test]
async fn test_stars_while_idle_are_unexpected() {
    let harness = TestHarness::memory();
    assert_error_code(&harness.send(user(), stars("5")).await, "INVALID_INPUT");
    assert_error_code(&harness.send(user(), text("orphan")).await, "INVALID_INPUT");
}

#[tokio::test]
async fn test_admin_command_preempts_review() {
    let harness = TestHarness::memory();
    let moderator = admin();
    let project = harness.add_project(moderator, &unique_name("nom")).await.unwrap();

    harness.send(moderator, start_review(project)).await;
    harness.send(moderator, text("parser combinators")).await;
    let reply = harness.send(moderator, add_project(&unique_name("pest"), "parsing")).await;
    expect_no_error(&reply).unwrap();

    // The pending review was dropped, so the stars are unexpected now
    assert_error_code(&harness.send(moderator, stars("5")).await, "INVALID_INPUT");
    assert_eq!(harness.score(project).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_conversation_expires() {
    let harness = TestHarness::memory_with(HarnessConfig {
        conversation_ttl: Duration::from_secs(30),
        ..HarnessConfig::default()
    });
    let project = harness.add_project(admin(), &unique_name("sqlx")).await.unwrap();
    let actor = user();

    harness.send(actor, start_review(project)).await;
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert_error_code(&harness.send(actor, text("too late")).await, "INVALID_INPUT");
    assert_eq!(harness.dispatcher.sweep_conversations(), 0);
}

#[tokio::test]
async fn test_json_event_roundtrip() {
    let harness = TestHarness::memory();
    let project = harness.add_project(admin(), &unique_name("redis")).await.unwrap();
    let raw = format!(
        r#"{{"actor":{{"id":{}}},"conversation_id":7,"payload":{{"type":"like","project_id":"{project}"}}}}"#,
        unique_suffix()
    );

    let reply = harness.send_json(&raw).await.unwrap();
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["type"], "liked");
    assert_eq!(json["receipt"]["new_score"], 1);
}

// ============================================================================
// Retention
// ============================================================================

#[tokio::test]
async fn test_retention_archives_without_touching_scores() {
    let harness = without_cooldown();
    let project = harness.add_project(admin(), &unique_name("regex")).await.unwrap();
    let ctx = harness.context();

    ctx.ledger()
        .commit(&LedgerRequest {
            action_id: ctx.generate_id(),
            history_id: ctx.generate_id(),
            at: Utc::now() - chrono::Duration::days(120),
            op: LedgerOp::Contribute {
                actor_id: user().id,
                project_id: project,
                payload: ActionPayload::Like,
            },
        })
        .await
        .unwrap();
    harness.send(user(), like(project)).await;

    let moved = RetentionService::new(ctx, RetentionPolicy::ArchiveAfter(90))
        .run_once()
        .await
        .unwrap();
    assert_eq!(moved, 1);
    assert_eq!(harness.score(project).await.unwrap(), 2);
    assert_eq!(harness.derived_score(project).await.unwrap(), 2);
}
