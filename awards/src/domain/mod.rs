//! Domain primitives, services, and ports for the award engine.
//!
//! Purpose: model attempts, XP progression, badges, and ranking as strongly
//! typed entities, and orchestrate the asynchronous award pipeline over
//! adapter-agnostic ports. Types are immutable where possible; invariants and
//! serialisation contracts (serde) are documented on each type.

pub mod attempt;
pub mod badge;
pub mod challenge;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod leaderboard;
pub mod pipeline;
pub mod ports;
pub mod progress;
pub mod progression;
pub mod rules;
pub mod submission;

pub use self::attempt::{Attempt, AttemptStatus};
pub use self::badge::{AwardedBadge, BadgeCondition, BadgeDefinition};
pub use self::challenge::{ChallengeDifficulty, ChallengeSummary};
pub use self::dispatcher::{
    AttemptJitter, AwardDispatcher, AwardDispatcherConfig, AwardDispatcherRuntime, BackoffJitter,
    DispatcherHandle, Sleeper, TokioSleeper,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{AttemptId, AwardId, BadgeId, ChallengeId, EntityIdError, UserId};
pub use self::leaderboard::{RankEntry, ScoreIndex};
pub use self::pipeline::{AwardPipeline, AwardPipelineConfig, AwardPipelinePorts, ProcessOutcome};
pub use self::progress::{LeaderboardRow, ProgressService, ProgressSnapshot};
pub use self::rules::RuleEngine;
pub use self::submission::SubmissionService;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
