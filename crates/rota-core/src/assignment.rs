//! Reviewer assignment for newly created pull requests.

use chrono::Utc;
use rand::seq::SliceRandom;

use crate::candidates;
use crate::error::Result;
use crate::store::RotaStore;
use crate::types::{PrStatus, PullRequest};

/// Upper bound on reviewers drawn at creation time.
const MAX_REVIEWERS: usize = 2;

/// Create a pull request and draw its initial reviewer set.
///
/// Draws `min(2, |active teammates of the author|)` distinct reviewers,
/// uniformly at random and without replacement: the candidate pool is
/// shuffled (Fisher–Yates) with fresh entropy and truncated. An author
/// with no active teammates gets an empty reviewer set; that is not an
/// error. The record and its reviewer links are persisted atomically and
/// read back as confirmation.
pub async fn create_pull_request(
    store: &dyn RotaStore,
    pr_id: &str,
    title: &str,
    author_id: &str,
) -> Result<PullRequest> {
    let author = store.get_user(author_id).await?;

    let mut pool = candidates::eligible(store, &author.team, &[author_id]).await?;
    pool.shuffle(&mut rand::thread_rng());
    let reviewers = pool
        .into_iter()
        .take(MAX_REVIEWERS)
        .map(|u| u.id)
        .collect();

    let pr = PullRequest {
        id: pr_id.to_string(),
        title: title.to_string(),
        author: author.id,
        status: PrStatus::Open,
        reviewers,
        created_at: Utc::now(),
        merged_at: None,
    };
    store.create_pull_request(&pr).await?;
    store.get_pull_request(pr_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RotaStore};
    use crate::types::{Team, TeamMember};
    use crate::RotaError;
    use std::collections::HashSet;

    async fn store_with_team(ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        let team = Team {
            name: "core".to_string(),
            members: ids
                .iter()
                .map(|id| TeamMember {
                    id: id.to_string(),
                    username: id.to_uppercase(),
                    active: true,
                })
                .collect(),
        };
        store.create_team(&team).await.unwrap();
        store
    }

    #[tokio::test]
    async fn draws_two_distinct_reviewers_from_large_teams() {
        let store = store_with_team(&["a", "b", "c", "d"]).await;
        let pr = create_pull_request(&store, "pr-1", "feature", "a")
            .await
            .unwrap();
        assert_eq!(pr.reviewers.len(), 2);
        assert!(!pr.reviewers.contains(&"a".to_string()));
        let distinct: HashSet<&String> = pr.reviewers.iter().collect();
        assert_eq!(distinct.len(), 2);
        assert_eq!(pr.status, PrStatus::Open);
        assert!(pr.merged_at.is_none());
    }

    #[tokio::test]
    async fn draws_one_reviewer_from_a_pair() {
        let store = store_with_team(&["a", "b"]).await;
        let pr = create_pull_request(&store, "pr-1", "feature", "a")
            .await
            .unwrap();
        assert_eq!(pr.reviewers, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn lone_author_gets_zero_reviewers() {
        let store = store_with_team(&["a"]).await;
        let pr = create_pull_request(&store, "pr-1", "feature", "a")
            .await
            .unwrap();
        assert!(pr.reviewers.is_empty());
    }

    #[tokio::test]
    async fn inactive_teammates_are_not_drawn() {
        let store = store_with_team(&["a", "b", "c"]).await;
        store.set_active("b", false).await.unwrap();
        let pr = create_pull_request(&store, "pr-1", "feature", "a")
            .await
            .unwrap();
        assert_eq!(pr.reviewers, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn unknown_author_is_rejected() {
        let store = store_with_team(&["a"]).await;
        assert!(matches!(
            create_pull_request(&store, "pr-1", "feature", "ghost").await,
            Err(RotaError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = store_with_team(&["a", "b"]).await;
        create_pull_request(&store, "pr-1", "feature", "a")
            .await
            .unwrap();
        assert!(matches!(
            create_pull_request(&store, "pr-1", "again", "a").await,
            Err(RotaError::PullRequestExists(_))
        ));
    }

    #[tokio::test]
    async fn every_candidate_can_be_drawn() {
        // With 60 fresh draws of a 2-subset of {b, c, d}, each teammate is
        // absent from all of them with probability (1/3)^60.
        let store = store_with_team(&["a", "b", "c", "d"]).await;
        let mut drawn: HashSet<String> = HashSet::new();
        for i in 0..60 {
            let pr = create_pull_request(&store, &format!("pr-{i}"), "feature", "a")
                .await
                .unwrap();
            drawn.extend(pr.reviewers);
        }
        assert_eq!(drawn.len(), 3);
        assert!(!drawn.contains("a"));
    }
}
