//! PostgreSQL implementation of `RotaStore`.
//!
//! Multi-statement operations run inside a transaction. The reviewer
//! swap is a single conditional UPDATE; its zero-row outcome is
//! classified inside the same transaction, so a lost race surfaces as a
//! precondition failure rather than a missing pull request.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use rota_core::error::{Result, RotaError};
use rota_core::store::RotaStore;
use rota_core::types::{
    PrStatus, PullRequest, PullRequestSummary, Team, TeamMember, User, UserStats,
};

/// Embedded schema migrations, applied at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and return a store over a fresh pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await.map_err(store_err)?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| RotaError::Store(e.to_string()))
    }
}

fn store_err(err: sqlx::Error) -> RotaError {
    RotaError::Store(err.to_string())
}

/// Map a unique-key violation to `exists`; two racing creates of the same
/// id can both pass the existence check, and the loser lands here.
fn insert_err(err: sqlx::Error, exists: RotaError) -> RotaError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => exists,
        _ => store_err(err),
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("user_id").map_err(store_err)?,
        username: row.try_get("username").map_err(store_err)?,
        team: row.try_get("team_name").map_err(store_err)?,
        active: row.try_get("is_active").map_err(store_err)?,
    })
}

fn summary_from_row(row: &PgRow) -> Result<PullRequestSummary> {
    let status: String = row.try_get("status").map_err(store_err)?;
    Ok(PullRequestSummary {
        id: row.try_get("pull_request_id").map_err(store_err)?,
        title: row.try_get("pull_request_name").map_err(store_err)?,
        author: row.try_get("author_id").map_err(store_err)?,
        status: PrStatus::from_str(&status)?,
    })
}

#[async_trait]
impl RotaStore for PgStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                username = EXCLUDED.username,
                team_name = EXCLUDED.team_name,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.team)
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let row = sqlx::query(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| RotaError::UserNotFound(user_id.to_string()))?;
        user_from_row(&row)
    }

    async fn set_active(&self, user_id: &str, active: bool) -> Result<()> {
        let updated = sqlx::query("UPDATE users SET is_active = $1 WHERE user_id = $2")
            .bind(active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if updated.rows_affected() == 0 {
            return Err(RotaError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE users SET is_active = FALSE WHERE user_id = ANY($1)")
            .bind(user_ids)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)")
            .bind(&team.name)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;
        if exists {
            return Err(RotaError::TeamExists(team.name.clone()));
        }

        sqlx::query("INSERT INTO teams (team_name) VALUES ($1)")
            .bind(&team.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_err(e, RotaError::TeamExists(team.name.clone())))?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id) DO UPDATE SET
                    username = EXCLUDED.username,
                    team_name = EXCLUDED.team_name,
                    is_active = EXCLUDED.is_active
                "#,
            )
            .bind(&member.id)
            .bind(&member.username)
            .bind(&team.name)
            .bind(member.active)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)
    }

    async fn get_team(&self, name: &str) -> Result<Team> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        if !exists {
            return Err(RotaError::TeamNotFound(name.to_string()));
        }

        let rows = sqlx::query(
            "SELECT user_id, username, is_active FROM users WHERE team_name = $1 ORDER BY user_id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let members = rows
            .iter()
            .map(|row| {
                Ok(TeamMember {
                    id: row.try_get("user_id").map_err(store_err)?,
                    username: row.try_get("username").map_err(store_err)?,
                    active: row.try_get("is_active").map_err(store_err)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Team {
            name: name.to_string(),
            members,
        })
    }

    async fn active_members(&self, team_name: &str) -> Result<Vec<User>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)")
            .bind(team_name)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        if !exists {
            return Err(RotaError::TeamNotFound(team_name.to_string()));
        }

        let rows = sqlx::query(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = $1 AND is_active = TRUE
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = $1)",
        )
        .bind(&pr.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;
        if exists {
            return Err(RotaError::PullRequestExists(pr.id.clone()));
        }

        sqlx::query(
            r#"
            INSERT INTO pull_requests
                (pull_request_id, pull_request_name, author_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.title)
        .bind(&pr.author)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_err(e, RotaError::PullRequestExists(pr.id.clone())))?;

        for reviewer in &pr.reviewers {
            sqlx::query("INSERT INTO pr_reviewers (pull_request_id, user_id) VALUES ($1, $2)")
                .bind(&pr.id)
                .bind(reviewer)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)
    }

    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| RotaError::PullRequestNotFound(pr_id.to_string()))?;

        let reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = $1 ORDER BY user_id",
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let status: String = row.try_get("status").map_err(store_err)?;
        Ok(PullRequest {
            id: row.try_get("pull_request_id").map_err(store_err)?,
            title: row.try_get("pull_request_name").map_err(store_err)?,
            author: row.try_get("author_id").map_err(store_err)?,
            status: PrStatus::from_str(&status)?,
            reviewers,
            created_at: row.try_get("created_at").map_err(store_err)?,
            merged_at: row.try_get("merged_at").map_err(store_err)?,
        })
    }

    async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let updated = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = 'MERGED', merged_at = COALESCE(merged_at, NOW())
            WHERE pull_request_id = $1
            "#,
        )
        .bind(pr_id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        if updated.rows_affected() == 0 {
            return Err(RotaError::PullRequestNotFound(pr_id.to_string()));
        }
        self.get_pull_request(pr_id).await
    }

    async fn swap_reviewer(&self, pr_id: &str, departing: &str, replacement: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let updated = sqlx::query(
            r#"
            UPDATE pr_reviewers r
            SET user_id = $3
            FROM pull_requests p
            WHERE r.pull_request_id = $1
              AND r.user_id = $2
              AND p.pull_request_id = r.pull_request_id
              AND p.status = 'OPEN'
              AND NOT EXISTS (
                  SELECT 1 FROM pr_reviewers x
                  WHERE x.pull_request_id = $1 AND x.user_id = $3
              )
            "#,
        )
        .bind(pr_id)
        .bind(departing)
        .bind(replacement)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        if updated.rows_affected() == 0 {
            // Classify the failed condition inside the same transaction.
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM pull_requests WHERE pull_request_id = $1")
                    .bind(pr_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_err)?;
            return match status.as_deref() {
                None => Err(RotaError::PullRequestNotFound(pr_id.to_string())),
                Some("MERGED") => Err(RotaError::AlreadyMerged(pr_id.to_string())),
                Some(_) => Err(RotaError::ReviewerNotAssigned {
                    pr: pr_id.to_string(),
                    user: departing.to_string(),
                }),
            };
        }

        tx.commit().await.map_err(store_err)
    }

    async fn reviews_by_user(&self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            INNER JOIN pr_reviewers r ON p.pull_request_id = r.pull_request_id
            WHERE r.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn open_reviews(&self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            INNER JOIN pr_reviewers r ON p.pull_request_id = r.pull_request_id
            WHERE r.user_id = $1 AND p.status = 'OPEN'
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn user_stats(&self) -> Result<Vec<UserStats>> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.user_id,
                u.username,
                (SELECT COUNT(*) FROM pr_reviewers r WHERE r.user_id = u.user_id) AS review_count,
                (SELECT COUNT(*) FROM pull_requests p WHERE p.author_id = u.user_id) AS authored_count
            FROM users u
            ORDER BY u.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                Ok(UserStats {
                    user_id: row.try_get("user_id").map_err(store_err)?,
                    username: row.try_get("username").map_err(store_err)?,
                    review_count: row.try_get("review_count").map_err(store_err)?,
                    authored_count: row.try_get("authored_count").map_err(store_err)?,
                })
            })
            .collect()
    }
}
