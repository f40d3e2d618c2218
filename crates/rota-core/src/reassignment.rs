//! Reviewer slot reassignment.
//!
//! The commit is a conditional swap at the store boundary: replace
//! occupant X with Y only while X still occupies the slot. Two racing
//! reassignments of the same slot therefore resolve to exactly one
//! winner; the loser sees `ReviewerNotAssigned` and can safely retry.

use rand::seq::SliceRandom;

use crate::candidates;
use crate::error::{Result, RotaError};
use crate::store::RotaStore;
use crate::types::{PrStatus, PullRequest};

/// Swap `departing` out of its reviewer slot on `pr_id` for a teammate
/// drawn uniformly at random.
///
/// Preconditions, first failure wins: the pull request exists, is OPEN,
/// and `departing` currently holds a slot. The replacement pool is the
/// active membership of the departing reviewer's team minus the author,
/// everyone already assigned, and the departing user itself. An empty
/// pool fails with `NoCandidate` and leaves the slot untouched.
pub async fn reassign_reviewer(
    store: &dyn RotaStore,
    pr_id: &str,
    departing: &str,
) -> Result<(PullRequest, String)> {
    let pr = store.get_pull_request(pr_id).await?;
    if pr.status == PrStatus::Merged {
        return Err(RotaError::AlreadyMerged(pr.id));
    }
    if !pr.reviewers.iter().any(|r| r == departing) {
        return Err(RotaError::ReviewerNotAssigned {
            pr: pr.id,
            user: departing.to_string(),
        });
    }

    let old = store.get_user(departing).await?;

    // The departing id is excluded explicitly even though it is about to
    // vacate the slot: a swap must never be a no-op.
    let mut exclude: Vec<&str> = vec![pr.author.as_str(), departing];
    exclude.extend(pr.reviewers.iter().map(String::as_str));
    let pool = candidates::eligible(store, &old.team, &exclude).await?;

    let Some(replacement) = pool.choose(&mut rand::thread_rng()) else {
        return Err(RotaError::NoCandidate {
            pr: pr.id,
            user: departing.to_string(),
        });
    };

    store
        .swap_reviewer(pr_id, departing, &replacement.id)
        .await?;

    let updated = store.get_pull_request(pr_id).await?;
    Ok((updated, replacement.id.clone()))
}
