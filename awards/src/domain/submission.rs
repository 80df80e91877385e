//! Synchronous submission boundary.
//!
//! `start` and `submit` are the only writes the request path performs. Submit
//! commits the attempt state first and enqueues second (write-ahead
//! ordering): a crash between the two leaves a `submitted` attempt with no
//! job, which the external reconciliation sweep re-enqueues after a timeout.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;

use crate::domain::DomainResult;
use crate::domain::attempt::{Attempt, AttemptStatus};
use crate::domain::error::Error;
use crate::domain::ids::{AttemptId, ChallengeId, UserId};
use crate::domain::ports::{
    AttemptChange, AttemptRepository, AttemptRepositoryError, AwardJob, AwardQueue,
    ChallengeDirectory,
};

/// Driving service for the attempt lifecycle's synchronous half.
pub struct SubmissionService {
    attempts: Arc<dyn AttemptRepository>,
    challenges: Arc<dyn ChallengeDirectory>,
    queue: Arc<dyn AwardQueue>,
    clock: Arc<dyn Clock>,
}

impl SubmissionService {
    /// Build a service over the given ports.
    pub fn new(
        attempts: Arc<dyn AttemptRepository>,
        challenges: Arc<dyn ChallengeDirectory>,
        queue: Arc<dyn AwardQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attempts,
            challenges,
            queue,
            clock,
        }
    }

    /// Begin an attempt at a published challenge.
    pub async fn start(
        &self,
        user_id: &UserId,
        challenge_id: &ChallengeId,
    ) -> DomainResult<Attempt> {
        let challenge = self
            .challenges
            .get(challenge_id)
            .await
            .map_err(|error| Error::unavailable(error.to_string()))?
            .ok_or_else(|| Error::not_found(format!("challenge {challenge_id} was not found")))?;
        if !challenge.published {
            return Err(Error::not_found(format!(
                "challenge {challenge_id} is not published"
            )));
        }

        let attempt = Attempt::started(
            AttemptId::random(),
            user_id.clone(),
            challenge_id.clone(),
            self.clock.utc(),
        );
        self.attempts
            .insert(&attempt)
            .await
            .map_err(map_attempt_error)?;
        tracing::debug!(attempt = %attempt.id, user = %user_id, challenge = %challenge_id, "attempt started");
        Ok(attempt)
    }

    /// Record a solution and hand the attempt to the award pipeline.
    ///
    /// Valid from `started` and from `submitted` (a re-submission before
    /// scoring overwrites the pending score and solution). Terminal attempts
    /// are rejected with `InvalidState`.
    pub async fn submit(
        &self,
        attempt_id: &AttemptId,
        score: u8,
        solution: Option<Value>,
    ) -> DomainResult<Attempt> {
        if score > 100 {
            return Err(Error::invalid_request(format!(
                "score {score} is outside the accepted range 0..=100"
            )));
        }

        let attempt = self
            .attempts
            .conditional_transition(
                attempt_id,
                &[AttemptStatus::Started, AttemptStatus::Submitted],
                AttemptChange::Submit {
                    score,
                    solution,
                    submitted_at: self.clock.utc(),
                },
            )
            .await
            .map_err(map_attempt_error)?;

        // The state write above is durable before the enqueue happens. If the
        // enqueue fails, the attempt stays `submitted` and the reconciliation
        // sweep recovers it, so the caller sees a retryable error, not a lost
        // submission.
        self.queue
            .enqueue(AwardJob {
                attempt_id: attempt_id.clone(),
            })
            .await
            .map_err(|error| {
                tracing::warn!(attempt = %attempt_id, error = %error, "award job enqueue failed after commit");
                Error::unavailable(error.to_string())
            })?;

        tracing::debug!(attempt = %attempt_id, score, "attempt submitted");
        Ok(attempt)
    }
}

fn map_attempt_error(error: AttemptRepositoryError) -> Error {
    match error {
        AttemptRepositoryError::NotFound { attempt_id } => {
            Error::not_found(format!("attempt {attempt_id} was not found"))
        }
        AttemptRepositoryError::StateConflict { actual } => {
            Error::invalid_state(format!("attempt is already {actual}"))
        }
        AttemptRepositoryError::Unavailable { message } => {
            Error::unavailable(format!("attempt store unavailable: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockall::Sequence;
    use serde_json::json;

    use super::*;
    use crate::domain::challenge::{ChallengeDifficulty, ChallengeSummary};
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        AwardQueueError, MockAttemptRepository, MockAwardQueue, MockChallengeDirectory,
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
        Utc.with_ymd_and_hms(2026, 4, 2, 18, 30, 0)
            .single()
            .expect("valid time")
    }

    fn published_challenge(id: &ChallengeId) -> ChallengeSummary {
        ChallengeSummary {
            id: id.clone(),
            title: "Bitwise warmup".to_owned(),
            xp: 100,
            difficulty: ChallengeDifficulty::Easy,
            tags: vec!["binary".to_owned()],
            published: true,
        }
    }

    fn service(
        attempts: MockAttemptRepository,
        challenges: MockChallengeDirectory,
        queue: MockAwardQueue,
    ) -> SubmissionService {
        SubmissionService::new(
            Arc::new(attempts),
            Arc::new(challenges),
            Arc::new(queue),
            Arc::new(FixedClock(now())),
        )
    }

    #[tokio::test]
    async fn start_rejects_a_missing_challenge() {
        let mut challenges = MockChallengeDirectory::new();
        challenges.expect_get().times(1).return_once(|_| Ok(None));

        let service = service(
            MockAttemptRepository::new(),
            challenges,
            MockAwardQueue::new(),
        );
        let error = service
            .start(&UserId::random(), &ChallengeId::random())
            .await
            .expect_err("missing challenge");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn start_rejects_an_unpublished_challenge() {
        let challenge_id = ChallengeId::random();
        let mut summary = published_challenge(&challenge_id);
        summary.published = false;
        let mut challenges = MockChallengeDirectory::new();
        challenges
            .expect_get()
            .times(1)
            .return_once(move |_| Ok(Some(summary)));

        let service = service(
            MockAttemptRepository::new(),
            challenges,
            MockAwardQueue::new(),
        );
        let error = service
            .start(&UserId::random(), &challenge_id)
            .await
            .expect_err("unpublished challenge");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn start_persists_a_started_attempt() {
        let challenge_id = ChallengeId::random();
        let user_id = UserId::random();
        let summary = published_challenge(&challenge_id);
        let mut challenges = MockChallengeDirectory::new();
        challenges
            .expect_get()
            .times(1)
            .return_once(move |_| Ok(Some(summary)));
        let mut attempts = MockAttemptRepository::new();
        attempts.expect_insert().times(1).return_once(|_| Ok(()));

        let service = service(attempts, challenges, MockAwardQueue::new());
        let attempt = service
            .start(&user_id, &challenge_id)
            .await
            .expect("start ok");
        assert_eq!(attempt.status, AttemptStatus::Started);
        assert_eq!(attempt.user_id, user_id);
        assert_eq!(attempt.challenge_id, challenge_id);
        assert_eq!(attempt.started_at, now());
    }

    #[tokio::test]
    async fn submit_rejects_out_of_range_scores() {
        let service = service(
            MockAttemptRepository::new(),
            MockChallengeDirectory::new(),
            MockAwardQueue::new(),
        );
        let error = service
            .submit(&AttemptId::random(), 101, None)
            .await
            .expect_err("score too large");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn submit_commits_the_state_before_enqueueing() {
        let attempt_id = AttemptId::random();
        let user_id = UserId::random();
        let challenge_id = ChallengeId::random();

        let mut sequence = Sequence::new();
        let mut attempts = MockAttemptRepository::new();
        {
            let attempt_id = attempt_id.clone();
            let user_id = user_id.clone();
            let challenge_id = challenge_id.clone();
            attempts
                .expect_conditional_transition()
                .times(1)
                .in_sequence(&mut sequence)
                .return_once(move |_, _, change| {
                    let AttemptChange::Submit {
                        score,
                        solution,
                        submitted_at,
                    } = change
                    else {
                        panic!("expected a submit change");
                    };
                    let mut attempt =
                        Attempt::started(attempt_id, user_id, challenge_id, now());
                    attempt.status = AttemptStatus::Submitted;
                    attempt.score = Some(score);
                    attempt.solution = solution;
                    attempt.submitted_at = Some(submitted_at);
                    Ok(attempt)
                });
        }
        let mut queue = MockAwardQueue::new();
        {
            let attempt_id = attempt_id.clone();
            queue
                .expect_enqueue()
                .times(1)
                .in_sequence(&mut sequence)
                .withf(move |job| job.attempt_id == attempt_id)
                .return_once(|_| Ok(()));
        }

        let service = service(attempts, MockChallengeDirectory::new(), queue);
        let attempt = service
            .submit(&attempt_id, 85, Some(json!({ "answer": 42 })))
            .await
            .expect("submit ok");
        assert_eq!(attempt.status, AttemptStatus::Submitted);
        assert_eq!(attempt.score, Some(85));
        assert_eq!(attempt.submitted_at, Some(now()));
    }

    #[tokio::test]
    async fn submit_surfaces_invalid_state_for_terminal_attempts() {
        let mut attempts = MockAttemptRepository::new();
        attempts
            .expect_conditional_transition()
            .times(1)
            .return_once(|_, _, _| {
                Err(AttemptRepositoryError::state_conflict(AttemptStatus::Passed))
            });

        let service = service(attempts, MockChallengeDirectory::new(), MockAwardQueue::new());
        let error = service
            .submit(&AttemptId::random(), 90, None)
            .await
            .expect_err("already terminal");
        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn submit_surfaces_enqueue_failure_as_retryable() {
        let attempt_id = AttemptId::random();
        let mut attempts = MockAttemptRepository::new();
        {
            let attempt_id = attempt_id.clone();
            attempts
                .expect_conditional_transition()
                .times(1)
                .return_once(move |_, _, _| {
                    let mut attempt = Attempt::started(
                        attempt_id,
                        UserId::random(),
                        ChallengeId::random(),
                        now(),
                    );
                    attempt.status = AttemptStatus::Submitted;
                    attempt.score = Some(70);
                    attempt.submitted_at = Some(now());
                    Ok(attempt)
                });
        }
        let mut queue = MockAwardQueue::new();
        queue
            .expect_enqueue()
            .times(1)
            .return_once(|_| Err(AwardQueueError::unavailable("broker down")));

        let service = service(attempts, MockChallengeDirectory::new(), queue);
        let error = service
            .submit(&attempt_id, 70, None)
            .await
            .expect_err("enqueue failed");
        assert_eq!(error.code(), ErrorCode::Unavailable);
        assert!(error.is_retryable());
    }
}
