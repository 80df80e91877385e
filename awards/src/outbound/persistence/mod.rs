//! In-memory persistence adapters.
//!
//! These adapters keep whole-store state behind one mutex each, which makes
//! every port operation atomic by construction: the conditional transition,
//! the ledger's check-and-increment, and the award log's conditional insert
//! all hold the lock for the full check-and-mutate. A database-backed
//! adapter replaces the mutex with a conditional `UPDATE ... WHERE` or
//! `INSERT ... ON CONFLICT`, keeping the same port contract.

mod memory_attempt_repository;
mod memory_award_log;
mod memory_badge_directory;
mod memory_challenge_directory;
mod memory_score_ledger;

pub use memory_attempt_repository::MemoryAttemptRepository;
pub use memory_award_log::MemoryAwardLog;
pub use memory_badge_directory::MemoryBadgeDirectory;
pub use memory_challenge_directory::MemoryChallengeDirectory;
pub use memory_score_ledger::MemoryScoreLedger;
