//! In-memory fakes for the trait seams, shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use url::Url;

use crate::error::{HistoryError, IdentityError, RosterError};
use crate::history::{AttemptLog, NewAttempt, QuizAttempt};
use crate::identity::{IdentityProvider, OpaqueToken, Profile};
use crate::roster::RosterSource;

#[derive(Default)]
pub struct MemoryLog {
    attempts: Mutex<Vec<NewAttempt>>,
}

impl MemoryLog {
    pub fn attempts(&self) -> Vec<NewAttempt> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttemptLog for MemoryLog {
    async fn record(&self, attempt: &NewAttempt) -> Result<(), HistoryError> {
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn recent_for(&self, user_id: &str, limit: u32) -> Result<Vec<QuizAttempt>, HistoryError> {
        let attempts = self.attempts.lock().unwrap();
        let timestamp = Utc::now().naive_utc();
        Ok(attempts
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, a)| a.user_id == user_id)
            .take(limit as usize)
            .map(|(i, a)| QuizAttempt {
                id: i as i64 + 1,
                user_id: a.user_id.clone(),
                subject: a.subject.clone(),
                question: a.question.clone(),
                selected_option: a.selected_option.clone(),
                correct_option: a.correct_option.clone(),
                is_correct: a.is_correct,
                timestamp,
            })
            .collect())
    }
}

pub struct FailingLog;

#[async_trait]
impl AttemptLog for FailingLog {
    async fn record(&self, _attempt: &NewAttempt) -> Result<(), HistoryError> {
        Err(HistoryError::Record(sqlx::Error::PoolClosed))
    }

    async fn recent_for(&self, _user_id: &str, _limit: u32) -> Result<Vec<QuizAttempt>, HistoryError> {
        Err(HistoryError::Load(sqlx::Error::PoolClosed))
    }
}

/// Stores attempts but cannot read them back.
#[derive(Default)]
pub struct UnreadableLog {
    inner: MemoryLog,
}

impl UnreadableLog {
    pub fn attempts(&self) -> Vec<NewAttempt> {
        self.inner.attempts()
    }
}

#[async_trait]
impl AttemptLog for UnreadableLog {
    async fn record(&self, attempt: &NewAttempt) -> Result<(), HistoryError> {
        self.inner.record(attempt).await
    }

    async fn recent_for(&self, _user_id: &str, _limit: u32) -> Result<Vec<QuizAttempt>, HistoryError> {
        Err(HistoryError::Load(sqlx::Error::PoolClosed))
    }
}

pub struct FakeIdentity {
    profile: Option<Profile>,
    exchanges: AtomicUsize,
}

impl FakeIdentity {
    pub fn accepting(name: &str, email: &str) -> Self {
        Self {
            profile: Some(Profile {
                name: name.to_string(),
                email: email.to_string(),
            }),
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            profile: None,
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = Url::parse("https://accounts.example.com/auth").unwrap();
        url.query_pairs_mut().append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<OpaqueToken, IdentityError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.profile.is_none() {
            return Err(IdentityError::Rejected {
                status: StatusCode::BAD_REQUEST,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(OpaqueToken {
            access_token: format!("token-for-{}", code),
            refresh_token: None,
        })
    }

    async fn profile(&self, _token: &OpaqueToken) -> Result<Profile, IdentityError> {
        self.profile.clone().ok_or(IdentityError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        })
    }
}

pub struct FakeRoster {
    courses: Option<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeRoster {
    pub fn with_courses(courses: &[&str]) -> Self {
        Self {
            courses: Some(courses.iter().map(|c| c.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            courses: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSource for FakeRoster {
    async fn list_courses(&self, _token: &OpaqueToken) -> Result<Vec<String>, RosterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.courses
            .clone()
            .ok_or(RosterError::Status(StatusCode::INTERNAL_SERVER_ERROR))
    }
}
