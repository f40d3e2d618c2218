//! Storage abstraction for rota.
//!
//! `RotaStore` is the contract the engines consume: point lookups,
//! existence checks, an atomic create, an atomic bulk active-flag flip,
//! and the conditional reviewer-slot swap. Implementations provide the
//! actual backend — `MemoryStore` here, PostgreSQL in `rota-server`.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PullRequest, PullRequestSummary, Team, User, UserStats};

#[async_trait]
pub trait RotaStore: Send + Sync {
    /// Idempotent create-or-update keyed by user id.
    async fn upsert_user(&self, user: &User) -> Result<()>;

    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Flip one user's active flag. `UserNotFound` if absent.
    async fn set_active(&self, user_id: &str, active: bool) -> Result<()>;

    /// Atomically flip every listed user to inactive; all-or-nothing.
    /// Ids that match no user are skipped without error.
    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()>;

    /// Create a team and upsert its members in one transaction.
    /// `TeamExists` on a duplicate name, nothing written.
    async fn create_team(&self, team: &Team) -> Result<()>;

    async fn get_team(&self, name: &str) -> Result<Team>;

    /// Active members of the named team. `TeamNotFound` when the team
    /// itself is absent; an all-inactive roster is an empty list.
    async fn active_members(&self, team_name: &str) -> Result<Vec<User>>;

    /// Persist the pull request and all its reviewer links atomically:
    /// either everything is durably recorded or nothing is.
    /// `PullRequestExists` on a duplicate id.
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()>;

    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest>;

    /// Mark a pull request MERGED. Idempotent: repeating the call leaves
    /// the original `merged_at` in place.
    async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest>;

    /// Conditional slot swap: replace `departing` with `replacement` only
    /// while the pull request is still OPEN, `departing` still occupies a
    /// slot, and `replacement` does not. A failed condition surfaces as
    /// `ReviewerNotAssigned` — indistinguishable from the slot never having
    /// been assigned — except a missing or merged pull request, which
    /// surfaces as `PullRequestNotFound` / `AlreadyMerged`.
    async fn swap_reviewer(&self, pr_id: &str, departing: &str, replacement: &str) -> Result<()>;

    /// Pull requests on which the user holds a reviewer slot, any status.
    async fn reviews_by_user(&self, user_id: &str) -> Result<Vec<PullRequestSummary>>;

    /// OPEN pull requests on which the user holds a reviewer slot.
    async fn open_reviews(&self, user_id: &str) -> Result<Vec<PullRequestSummary>>;

    /// Per-user reviewer/authored counts, ordered by user id.
    async fn user_stats(&self) -> Result<Vec<UserStats>>;
}
