//! Candidate selection: who may take a reviewer slot.

use crate::error::Result;
use crate::store::RotaStore;
use crate::types::User;

/// Active members of `team_name` whose id is not in `exclude`.
///
/// Order is unspecified; callers that need randomness shuffle or draw from
/// the result themselves. `TeamNotFound` propagates from the store.
pub async fn eligible(
    store: &dyn RotaStore,
    team_name: &str,
    exclude: &[&str],
) -> Result<Vec<User>> {
    let members = store.active_members(team_name).await?;
    Ok(members
        .into_iter()
        .filter(|u| !exclude.contains(&u.id.as_str()))
        .collect())
}
