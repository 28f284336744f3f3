//! Dispatcher scenarios against PostgreSQL
//!
//! These tests require a running PostgreSQL instance and are skipped otherwise.
//! Set DATABASE_URL before running:
//!
//! Run with: cargo test -p integration-tests --test postgres_tests

use integration_tests::{fixtures::*, TestHarness};
use rating_service::dto::{AdminReply, Reply};
use rating_service::services::LedgerService;

#[tokio::test]
async fn test_concurrent_first_reviews_reach_ten() {
    let Some(harness) = TestHarness::postgres().await else {
        return;
    };
    let project = harness.add_project(admin(), &unique_name("pg-tokio")).await.unwrap();
    let (a, b) = (user(), user());

    for actor in [a, b] {
        harness.send(actor, start_review(project)).await;
        harness.send(actor, text("excellent")).await;
    }

    let (ra, rb) = futures::join!(harness.send(a, stars("5")), harness.send(b, stars("5")));
    assert!(matches!(ra, Reply::ReviewCommitted { .. }), "{ra:?}");
    assert!(matches!(rb, Reply::ReviewCommitted { .. }), "{rb:?}");

    assert_eq!(harness.score(project).await.unwrap(), 10);
    let report = LedgerService::new(harness.context()).reconcile(project).await.unwrap();
    assert!(report.is_consistent());
}

#[tokio::test]
async fn test_like_review_and_removal() {
    let Some(harness) = TestHarness::postgres().await else {
        return;
    };
    let moderator = admin();
    let project = harness.add_project(moderator, &unique_name("pg-serde")).await.unwrap();
    let (liker, reviewer) = (user(), user());

    assert!(matches!(harness.send(liker, like(project)).await, Reply::Liked { .. }));
    let review = harness.review(reviewer, project, "flaky", "1").await.unwrap();
    assert_eq!(review.new_score, -4);

    let reply = harness.send(moderator, remove_review(review.contribution_id)).await;
    assert!(matches!(
        reply,
        Reply::Admin {
            reply: AdminReply::ContributionRemoved { .. }
        }
    ));
    assert_eq!(harness.score(project).await.unwrap(), 1);
    assert_eq!(harness.derived_score(project).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cooldown_and_ban() {
    let Some(harness) = TestHarness::postgres().await else {
        return;
    };
    let moderator = admin();
    let first = harness.add_project(moderator, &unique_name("pg-first")).await.unwrap();
    let second = harness.add_project(moderator, &unique_name("pg-second")).await.unwrap();
    let actor = user();

    assert!(matches!(harness.send(actor, like(first)).await, Reply::Liked { .. }));
    assert!(matches!(harness.send(actor, like(second)).await, Reply::Throttled { .. }));

    harness.send(moderator, ban(actor.id)).await;
    assert!(harness.send(actor, like(second)).await.is_silent());
    assert_eq!(harness.score(second).await.unwrap(), 0);

    // Unbanned, but still inside the window opened by the first like
    harness.send(moderator, unban(actor.id)).await;
    assert!(matches!(harness.send(actor, like(first)).await, Reply::Throttled { .. }));
}
