//! In-memory implementation of `RotaStore`.
//!
//! Every operation holds a single lock guard for its whole duration, so
//! each store call is atomic relative to every other — the same guarantee
//! the SQL backend gets from transactions. All state is lost on drop.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{Result, RotaError};
use crate::types::{PrStatus, PullRequest, PullRequestSummary, Team, TeamMember, User, UserStats};

use super::RotaStore;

#[derive(Default)]
struct Inner {
    teams: HashSet<String>,
    users: HashMap<String, User>,
    pulls: HashMap<String, PullRequest>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn summaries<'a>(
        &'a self,
        user_id: &'a str,
        open_only: bool,
    ) -> impl Iterator<Item = &'a PullRequest> {
        self.pulls
            .values()
            .filter(move |pr| pr.reviewers.iter().any(|r| r == user_id))
            .filter(move |pr| !open_only || pr.status == PrStatus::Open)
    }
}

fn summarize(pr: &PullRequest) -> PullRequestSummary {
    PullRequestSummary {
        id: pr.id.clone(),
        title: pr.title.clone(),
        author: pr.author.clone(),
        status: pr.status,
    }
}

#[async_trait]
impl RotaStore for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| RotaError::UserNotFound(user_id.to_string()))
    }

    async fn set_active(&self, user_id: &str, active: bool) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| RotaError::UserNotFound(user_id.to_string()))?;
        user.active = active;
        Ok(())
    }

    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for id in user_ids {
            if let Some(user) = inner.users.get_mut(id) {
                user.active = false;
            }
        }
        Ok(())
    }

    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.teams.contains(&team.name) {
            return Err(RotaError::TeamExists(team.name.clone()));
        }
        inner.teams.insert(team.name.clone());
        for member in &team.members {
            inner.users.insert(
                member.id.clone(),
                User {
                    id: member.id.clone(),
                    username: member.username.clone(),
                    team: team.name.clone(),
                    active: member.active,
                },
            );
        }
        Ok(())
    }

    async fn get_team(&self, name: &str) -> Result<Team> {
        let inner = self.inner.read().await;
        if !inner.teams.contains(name) {
            return Err(RotaError::TeamNotFound(name.to_string()));
        }
        let mut members: Vec<TeamMember> = inner
            .users
            .values()
            .filter(|u| u.team == name)
            .map(|u| TeamMember {
                id: u.id.clone(),
                username: u.username.clone(),
                active: u.active,
            })
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Team {
            name: name.to_string(),
            members,
        })
    }

    async fn active_members(&self, team_name: &str) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        if !inner.teams.contains(team_name) {
            return Err(RotaError::TeamNotFound(team_name.to_string()));
        }
        Ok(inner
            .users
            .values()
            .filter(|u| u.team == team_name && u.active)
            .cloned()
            .collect())
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.pulls.contains_key(&pr.id) {
            return Err(RotaError::PullRequestExists(pr.id.clone()));
        }
        inner.pulls.insert(pr.id.clone(), pr.clone());
        Ok(())
    }

    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let inner = self.inner.read().await;
        inner
            .pulls
            .get(pr_id)
            .cloned()
            .ok_or_else(|| RotaError::PullRequestNotFound(pr_id.to_string()))
    }

    async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let mut inner = self.inner.write().await;
        let pr = inner
            .pulls
            .get_mut(pr_id)
            .ok_or_else(|| RotaError::PullRequestNotFound(pr_id.to_string()))?;
        if pr.status == PrStatus::Open {
            pr.status = PrStatus::Merged;
            pr.merged_at = Some(Utc::now());
        }
        Ok(pr.clone())
    }

    async fn swap_reviewer(&self, pr_id: &str, departing: &str, replacement: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let pr = inner
            .pulls
            .get_mut(pr_id)
            .ok_or_else(|| RotaError::PullRequestNotFound(pr_id.to_string()))?;
        if pr.status == PrStatus::Merged {
            return Err(RotaError::AlreadyMerged(pr_id.to_string()));
        }
        // Both conditions are validated under the same write guard as the
        // mutation, which is what makes a lost race surface here instead of
        // corrupting the slot.
        let not_assigned = || RotaError::ReviewerNotAssigned {
            pr: pr_id.to_string(),
            user: departing.to_string(),
        };
        let slot = pr
            .reviewers
            .iter()
            .position(|r| r == departing)
            .ok_or_else(not_assigned)?;
        if pr.reviewers.iter().any(|r| r == replacement) {
            return Err(not_assigned());
        }
        pr.reviewers[slot] = replacement.to_string();
        Ok(())
    }

    async fn reviews_by_user(&self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        let inner = self.inner.read().await;
        let mut pulls: Vec<&PullRequest> = inner.summaries(user_id, false).collect();
        pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pulls.into_iter().map(summarize).collect())
    }

    async fn open_reviews(&self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        let inner = self.inner.read().await;
        let mut pulls: Vec<&PullRequest> = inner.summaries(user_id, true).collect();
        pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pulls.into_iter().map(summarize).collect())
    }

    async fn user_stats(&self) -> Result<Vec<UserStats>> {
        let inner = self.inner.read().await;
        let mut stats: Vec<UserStats> = inner
            .users
            .values()
            .map(|u| UserStats {
                user_id: u.id.clone(),
                username: u.username.clone(),
                review_count: inner
                    .pulls
                    .values()
                    .filter(|pr| pr.reviewers.iter().any(|r| *r == u.id))
                    .count() as i64,
                authored_count: inner.pulls.values().filter(|pr| pr.author == u.id).count()
                    as i64,
            })
            .collect();
        stats.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(stats)
    }
}
