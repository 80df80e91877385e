//! Unit tests for the rule engine, driven through the in-memory adapters.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::RuleEngine;
use crate::domain::attempt::{Attempt, AttemptStatus};
use crate::domain::badge::{AwardedBadge, BadgeCondition, BadgeDefinition};
use crate::domain::ids::{AttemptId, AwardId, BadgeId, ChallengeId, UserId};
use crate::domain::ports::{AttemptRepository, AwardLog, ScoreLedger};
use crate::outbound::persistence::{
    MemoryAttemptRepository, MemoryAwardLog, MemoryBadgeDirectory, MemoryScoreLedger,
};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 20, 10, 0, 0)
        .single()
        .expect("valid time")
}

struct Harness {
    engine: RuleEngine,
    badges: Arc<MemoryBadgeDirectory>,
    awards: Arc<MemoryAwardLog>,
    attempts: Arc<MemoryAttemptRepository>,
    ledger: Arc<MemoryScoreLedger>,
}

fn harness() -> Harness {
    let badges = Arc::new(MemoryBadgeDirectory::new());
    let awards = Arc::new(MemoryAwardLog::new());
    let attempts = Arc::new(MemoryAttemptRepository::new());
    let ledger = Arc::new(MemoryScoreLedger::new());
    let engine = RuleEngine::new(
        Arc::clone(&badges) as Arc<dyn crate::domain::ports::BadgeDirectory>,
        Arc::clone(&awards) as Arc<dyn AwardLog>,
        Arc::clone(&attempts) as Arc<dyn AttemptRepository>,
        Arc::clone(&ledger) as Arc<dyn ScoreLedger>,
        Arc::new(FixedClock(now())),
    );
    Harness {
        engine,
        badges,
        awards,
        attempts,
        ledger,
    }
}

fn badge(condition: BadgeCondition) -> BadgeDefinition {
    BadgeDefinition {
        id: BadgeId::random(),
        name: "Test badge".to_owned(),
        description: "A badge under test".to_owned(),
        condition,
        icon_url: None,
    }
}

async fn credit(ledger: &MemoryScoreLedger, user_id: &UserId, xp: u32) {
    ledger
        .atomic_award(user_id, &AttemptId::random(), xp)
        .await
        .expect("ledger award");
}

async fn terminal_attempt(
    attempts: &MemoryAttemptRepository,
    user_id: &UserId,
    status: AttemptStatus,
    submitted_at: DateTime<Utc>,
) {
    let mut attempt = Attempt::started(
        AttemptId::random(),
        user_id.clone(),
        ChallengeId::random(),
        submitted_at,
    );
    attempt.status = status;
    attempt.score = Some(80);
    attempt.xp_awarded = Some(40);
    attempt.submitted_at = Some(submitted_at);
    attempts.insert(&attempt).await.expect("insert attempt");
}

#[tokio::test]
async fn xp_badge_is_awarded_once_the_threshold_is_reached() {
    let harness = harness();
    let user_id = UserId::random();
    let definition = badge(BadgeCondition::Xp { threshold: 1000 });
    harness.badges.publish(definition.clone()).expect("publish");

    credit(&harness.ledger, &user_id, 950).await;
    assert_eq!(
        harness.engine.evaluate(&user_id).await.expect("evaluate"),
        Vec::new()
    );

    credit(&harness.ledger, &user_id, 50).await;
    let earned = harness.engine.evaluate(&user_id).await.expect("evaluate");
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].badge_id, definition.id);
    assert_eq!(earned[0].awarded_at, now());

    // A repeated evaluation finds the award already recorded.
    assert_eq!(
        harness.engine.evaluate(&user_id).await.expect("evaluate"),
        Vec::new()
    );
}

#[tokio::test]
async fn attempt_count_badge_counts_only_the_requested_status() {
    let harness = harness();
    let user_id = UserId::random();
    let definition = badge(BadgeCondition::AttemptCount {
        count: 3,
        status: AttemptStatus::Passed,
    });
    harness.badges.publish(definition.clone()).expect("publish");

    for _ in 0..2 {
        terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Passed, now()).await;
    }
    terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Failed, now()).await;
    assert_eq!(
        harness.engine.evaluate(&user_id).await.expect("evaluate"),
        Vec::new()
    );

    terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Passed, now()).await;
    let earned = harness.engine.evaluate(&user_id).await.expect("evaluate");
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].badge_id, definition.id);
}

#[tokio::test]
async fn consecutive_days_badge_needs_an_unbroken_calendar_streak() {
    let harness = harness();
    let user_id = UserId::random();
    let definition = badge(BadgeCondition::ConsecutiveDays { days: 3 });
    harness.badges.publish(definition.clone()).expect("publish");

    // Days 10 and 12: a gap, no streak of three.
    for day in [10, 12] {
        let at = Utc
            .with_ymd_and_hms(2026, 5, day, 20, 0, 0)
            .single()
            .expect("valid time");
        terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Passed, at).await;
    }
    assert_eq!(
        harness.engine.evaluate(&user_id).await.expect("evaluate"),
        Vec::new()
    );

    // Day 11 closes the gap; failed attempts count too, the streak is over
    // terminal attempts.
    let at = Utc
        .with_ymd_and_hms(2026, 5, 11, 6, 0, 0)
        .single()
        .expect("valid time");
    terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Failed, at).await;
    let earned = harness.engine.evaluate(&user_id).await.expect("evaluate");
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].badge_id, definition.id);
}

#[tokio::test]
async fn several_badges_can_land_in_one_evaluation() {
    let harness = harness();
    let user_id = UserId::random();
    let xp_badge = badge(BadgeCondition::Xp { threshold: 100 });
    let count_badge = badge(BadgeCondition::AttemptCount {
        count: 1,
        status: AttemptStatus::Passed,
    });
    harness.badges.publish(xp_badge.clone()).expect("publish");
    harness.badges.publish(count_badge.clone()).expect("publish");

    credit(&harness.ledger, &user_id, 150).await;
    terminal_attempt(&harness.attempts, &user_id, AttemptStatus::Passed, now()).await;

    let earned = harness.engine.evaluate(&user_id).await.expect("evaluate");
    let mut earned_ids: Vec<BadgeId> = earned.into_iter().map(|award| award.badge_id).collect();
    earned_ids.sort();
    let mut expected = vec![xp_badge.id, count_badge.id];
    expected.sort();
    assert_eq!(earned_ids, expected);
}

#[tokio::test]
async fn a_pre_existing_award_suppresses_re_awarding() {
    let harness = harness();
    let user_id = UserId::random();
    let definition = badge(BadgeCondition::Xp { threshold: 10 });
    harness.badges.publish(definition.clone()).expect("publish");
    credit(&harness.ledger, &user_id, 50).await;

    // Simulate a prior partially-failed evaluation that already persisted the
    // award before crashing.
    harness
        .awards
        .insert_if_absent(&AwardedBadge {
            id: AwardId::random(),
            user_id: user_id.clone(),
            badge_id: definition.id.clone(),
            awarded_at: now(),
            metadata: None,
        })
        .await
        .expect("seed award");

    assert_eq!(
        harness.engine.evaluate(&user_id).await.expect("evaluate"),
        Vec::new()
    );
    let listed = harness.awards.list_for_user(&user_id).await.expect("list");
    assert_eq!(listed.len(), 1);
}
