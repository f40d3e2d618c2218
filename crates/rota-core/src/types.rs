use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PrStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrStatus {
    type Err = crate::error::RotaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(crate::error::RotaError::Store(format!(
                "unknown pull request status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Users and teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "team_name")]
    pub team: String,
    #[serde(rename = "is_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "user_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "is_active")]
    pub active: bool,
}

/// A team and its full roster. Membership only grows or updates via roster
/// submission; nothing in the core removes a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "team_name")]
    pub name: String,
    pub members: Vec<TeamMember>,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// A pull request with its current reviewer slots.
///
/// The reviewer set never contains the author and never contains
/// duplicates; after creation it changes only by single-slot swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    #[serde(rename = "author_id")]
    pub author: String,
    pub status: PrStatus,
    #[serde(rename = "assigned_reviewers")]
    pub reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// The short shape returned by reviews-by-user reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestSummary {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    #[serde(rename = "author_id")]
    pub author: String,
    pub status: PrStatus,
}

// ---------------------------------------------------------------------------
// Read models and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub username: String,
    /// Pull requests on which the user currently holds a reviewer slot.
    #[serde(rename = "assigned_as_reviewer_count")]
    pub review_count: i64,
    #[serde(rename = "authored_pr_count")]
    pub authored_count: i64,
}

/// Outcome of one bulk deactivation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivationReport {
    #[serde(rename = "team_name")]
    pub team: String,
    #[serde(rename = "deactivated_users")]
    pub deactivated: Vec<String>,
    #[serde(rename = "reassigned_prs")]
    pub reassigned: Vec<String>,
    /// Pull requests whose slot could not be re-homed, including those the
    /// batch budget expired on.
    #[serde(
        rename = "failed_reassignments",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub failed: Vec<String>,
    /// Users whose open reviews could not be listed at all; the affected
    /// pull request ids are unknowable in that case.
    #[serde(
        rename = "unscanned_users",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub unscanned: Vec<String>,
}
