pub mod google;

use std::fmt;

use async_trait::async_trait;
use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

use crate::error::IdentityError;

pub const GUEST_USER_ID: &str = "guest";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider credential. Only the provider and roster adapters look inside.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpaqueToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueToken(..)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub display_name: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the user opens to grant access. `state` comes back in the redirect.
    fn authorization_url(&self, state: &str) -> Url;

    async fn exchange_code(&self, code: &str) -> Result<OpaqueToken, IdentityError>;

    async fn profile(&self, token: &OpaqueToken) -> Result<Profile, IdentityError>;
}

pub fn resolve_manual(role: Role, user_id: &str) -> Identity {
    let user_id = match user_id.trim() {
        "" => GUEST_USER_ID,
        id => id,
    };

    Identity {
        user_id: user_id.to_string(),
        role,
        display_name: String::new(),
        email: String::new(),
    }
}

/// Random value tying a redirect to the chat that started the login.
pub fn new_login_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Completes an external login. Accounts created this way are always
/// students identified by their email address.
pub async fn resolve_external(
    provider: &dyn IdentityProvider,
    code: &str,
    state: Option<&str>,
    expected_state: &str,
) -> Result<(Identity, OpaqueToken), IdentityError> {
    if state != Some(expected_state) {
        return Err(IdentityError::StateMismatch);
    }

    let token = provider.exchange_code(code).await?;
    let profile = provider.profile(&token).await?;
    info!("External login completed for {}", profile.email);

    let identity = Identity {
        user_id: profile.email.clone(),
        role: Role::Student,
        display_name: profile.name,
        email: profile.email,
    };
    Ok((identity, token))
}
