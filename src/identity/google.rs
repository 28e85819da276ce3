//! Google OAuth adapter: authorization-code exchange and userinfo lookup.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::IdentityError;
use crate::identity::{IdentityProvider, OpaqueToken, Profile};

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/classroom.courses.readonly",
    "openid",
    "email",
    "profile",
];

const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// OAuth client registration as found in a Google `client_secret.json`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(serde::Deserialize)]
struct ClientSecretFile {
    web: Option<ClientSecret>,
    installed: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_json(json: &str) -> Result<Self, IdentityError> {
        let file: ClientSecretFile =
            serde_json::from_str(json).map_err(IdentityError::ClientSecretFormat)?;
        file.web
            .or(file.installed)
            .ok_or(IdentityError::ClientSecretMissing)
    }

    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let json = std::fs::read_to_string(path).map_err(IdentityError::ClientSecretRead)?;
        Self::from_json(&json)
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

pub struct GoogleIdentity {
    client: Client,
    secret: ClientSecret,
    auth_uri: Url,
    redirect_uri: Url,
}

impl GoogleIdentity {
    pub fn new(secret: ClientSecret, redirect_uri: Url) -> Result<Self, IdentityError> {
        let auth_uri = Url::parse(&secret.auth_uri).map_err(IdentityError::AuthUri)?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            secret,
            auth_uri,
            redirect_uri,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.auth_uri.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<OpaqueToken, IdentityError> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(OpaqueToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    async fn profile(&self, token: &OpaqueToken) -> Result<Profile, IdentityError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}
