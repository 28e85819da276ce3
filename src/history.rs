//! Append-only log of quiz attempts backed by SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::HistoryError;

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS quiz_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT,
        subject TEXT,
        question TEXT,
        selected_option TEXT,
        correct_option TEXT,
        is_correct INTEGER,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )";

/// One answer about to be written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub user_id: String,
    pub subject: String,
    pub question: String,
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
}

/// One answer read back from the log.
#[derive(Debug, Clone, FromRow)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: String,
    pub subject: String,
    pub question: String,
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
    pub timestamp: NaiveDateTime,
}

#[async_trait]
pub trait AttemptLog: Send + Sync {
    async fn record(&self, attempt: &NewAttempt) -> Result<(), HistoryError>;

    /// Most recent attempts of `user_id`, newest first.
    async fn recent_for(&self, user_id: &str, limit: u32) -> Result<Vec<QuizAttempt>, HistoryError>;
}

pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Opens (creating if needed) the database at `url` and makes sure the
    /// `quiz_history` table exists.
    ///
    /// The pool keeps a single connection open for the lifetime of the
    /// process, which serializes writes from every chat and keeps
    /// `sqlite::memory:` databases alive.
    pub async fn open(url: &str) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(HistoryError::Open)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(HistoryError::Open)?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(HistoryError::Open)?;
        info!("Quiz history ready at {}", url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl AttemptLog for SqliteHistory {
    async fn record(&self, attempt: &NewAttempt) -> Result<(), HistoryError> {
        sqlx::query(
            "INSERT INTO quiz_history (user_id, subject, question, selected_option, correct_option, is_correct)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&attempt.user_id)
        .bind(&attempt.subject)
        .bind(&attempt.question)
        .bind(&attempt.selected_option)
        .bind(&attempt.correct_option)
        .bind(attempt.is_correct)
        .execute(&self.pool)
        .await
        .map_err(HistoryError::Record)?;

        Ok(())
    }

    async fn recent_for(&self, user_id: &str, limit: u32) -> Result<Vec<QuizAttempt>, HistoryError> {
        sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, subject, question, selected_option, correct_option, is_correct, timestamp
             FROM quiz_history
             WHERE user_id = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(HistoryError::Load)
    }
}
