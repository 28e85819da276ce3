//! Course roster of a linked Google account.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;

use crate::error::RosterError;
use crate::identity::OpaqueToken;

const COURSES_URL: &str = "https://classroom.googleapis.com/v1/courses";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    /// No external account is linked to the session.
    NotLinked,
    Courses(Vec<String>),
}

#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn list_courses(&self, token: &OpaqueToken) -> Result<Vec<String>, RosterError>;
}

/// Roster for the dashboard. Fetch failures read as "no courses".
pub async fn fetch_roster(source: &dyn RosterSource, credentials: Option<&OpaqueToken>) -> Roster {
    let Some(token) = credentials else {
        return Roster::NotLinked;
    };

    match source.list_courses(token).await {
        Ok(courses) => Roster::Courses(courses),
        Err(e) => {
            warn!("Could not fetch the course roster: {}", e);
            Roster::Courses(Vec::new())
        }
    }
}

#[derive(serde::Deserialize)]
struct CourseList {
    #[serde(default)]
    courses: Vec<Course>,
}

#[derive(serde::Deserialize)]
struct Course {
    name: String,
}

pub struct ClassroomRoster {
    client: Client,
}

impl ClassroomRoster {
    pub fn new() -> Result<Self, RosterError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RosterSource for ClassroomRoster {
    async fn list_courses(&self, token: &OpaqueToken) -> Result<Vec<String>, RosterError> {
        let response = self
            .client
            .get(COURSES_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status(status));
        }

        let list: CourseList = response.json().await?;
        Ok(list.courses.into_iter().map(|c| c.name).collect())
    }
}
