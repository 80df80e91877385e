//! Domain ports for the hexagonal boundary.
//!
//! Every dependency the award pipeline has on the outside world is expressed
//! as a trait here: attempt persistence, the score ledger, challenge and
//! badge lookups, the award log, the rank cache, and the award job queue.
//! Adapters live under `crate::outbound`; tests use the generated mocks.

mod macros;
pub(crate) use macros::define_port_error;

mod attempt_repository;
mod award_log;
mod award_queue;
mod badge_directory;
mod challenge_directory;
mod rank_cache;
mod score_ledger;

#[cfg(test)]
pub use attempt_repository::MockAttemptRepository;
pub use attempt_repository::{AttemptChange, AttemptRepository, AttemptRepositoryError};
#[cfg(test)]
pub use award_log::MockAwardLog;
pub use award_log::{AwardLog, AwardLogError};
#[cfg(test)]
pub use award_queue::MockAwardQueue;
pub use award_queue::{AwardJob, AwardQueue, AwardQueueError, DeadLetter};
#[cfg(test)]
pub use badge_directory::MockBadgeDirectory;
pub use badge_directory::{BadgeDirectory, BadgeDirectoryError};
#[cfg(test)]
pub use challenge_directory::MockChallengeDirectory;
pub use challenge_directory::{ChallengeDirectory, ChallengeDirectoryError};
#[cfg(test)]
pub use rank_cache::MockRankCache;
pub use rank_cache::{RankCache, RankCacheError};
#[cfg(test)]
pub use score_ledger::MockScoreLedger;
pub use score_ledger::{LedgerAward, ScoreLedger, ScoreLedgerError};
