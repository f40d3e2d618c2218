use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotaError {
    #[error("team not found: {0}")]
    TeamNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("pull request not found: {0}")]
    PullRequestNotFound(String),

    #[error("team already exists: {0}")]
    TeamExists(String),

    #[error("pull request already exists: {0}")]
    PullRequestExists(String),

    #[error("pull request already merged: {0}")]
    AlreadyMerged(String),

    #[error("user '{user}' is not an assigned reviewer of '{pr}'")]
    ReviewerNotAssigned { pr: String, user: String },

    #[error("no eligible replacement candidate on '{pr}' for '{user}'")]
    NoCandidate { pr: String, user: String },

    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RotaError>;
