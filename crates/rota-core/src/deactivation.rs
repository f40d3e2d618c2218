//! Bulk deactivation with a time-budgeted reassignment sweep.
//!
//! Deactivating a set of team members re-homes every open review they
//! hold. The sweep runs under a fixed wall-clock budget counted from the
//! start of the batch: once it expires, remaining pull requests are
//! recorded as failed instead of attempted, which bounds worst-case
//! request latency. Per-item failures never abort the batch; callers are
//! expected to retry the failed ids through the single-reassignment
//! operation.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::reassignment;
use crate::store::RotaStore;
use crate::types::DeactivationReport;

/// Wall-clock budget for one deactivation batch's reassignment sweep.
pub const REASSIGNMENT_BUDGET: Duration = Duration::from_millis(90);

/// Deactivate team members and re-home their open review load.
///
/// Ids that are not members of the team are dropped silently; an empty
/// filtered set yields a trivial empty report without touching the store.
/// The active-flag flip for the whole filtered set is a single atomic
/// store operation, after which each user's open reviews are reassigned
/// in turn under [`REASSIGNMENT_BUDGET`].
pub async fn deactivate_users(
    store: &dyn RotaStore,
    team_name: &str,
    user_ids: &[String],
) -> Result<DeactivationReport> {
    deactivate_users_within(store, team_name, user_ids, REASSIGNMENT_BUDGET).await
}

/// Budget-parameterized variant of [`deactivate_users`].
pub async fn deactivate_users_within(
    store: &dyn RotaStore,
    team_name: &str,
    user_ids: &[String],
    budget: Duration,
) -> Result<DeactivationReport> {
    let started = Instant::now();

    let roster = store.get_team(team_name).await?;
    let members: HashSet<&str> = roster.members.iter().map(|m| m.id.as_str()).collect();

    // Non-members are dropped silently; duplicates collapse to their
    // first occurrence.
    let mut seen = HashSet::new();
    let targets: Vec<String> = user_ids
        .iter()
        .filter(|id| members.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect();

    let mut report = DeactivationReport {
        team: team_name.to_string(),
        deactivated: targets.clone(),
        reassigned: Vec::new(),
        failed: Vec::new(),
        unscanned: Vec::new(),
    };
    if targets.is_empty() {
        return Ok(report);
    }

    store.bulk_deactivate(&targets).await?;

    for user_id in &targets {
        let open = match store.open_reviews(user_id).await {
            Ok(open) => open,
            Err(err) => {
                // The affected pull request ids are unknowable here, so
                // the report carries the user instead of guessed entries.
                tracing::warn!(user = %user_id, error = %err, "could not list open reviews");
                report.unscanned.push(user_id.clone());
                continue;
            }
        };

        for pr in open {
            if started.elapsed() > budget {
                report.failed.push(pr.id);
                continue;
            }
            match reassignment::reassign_reviewer(store, &pr.id, user_id).await {
                Ok((_, replacement)) => {
                    tracing::debug!(pr = %pr.id, from = %user_id, to = %replacement, "review re-homed");
                    report.reassigned.push(pr.id);
                }
                Err(err) => {
                    tracing::warn!(pr = %pr.id, user = %user_id, error = %err, "reassignment failed");
                    report.failed.push(pr.id);
                }
            }
        }
    }

    Ok(report)
}
